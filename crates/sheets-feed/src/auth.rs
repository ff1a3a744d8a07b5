//! OAuth2 credentials for the spreadsheet feeds.
//!
//! Two flavors are supported: a bearer token obtained elsewhere, or a service
//! account key that is exchanged for a token with a signed RS256 JWT
//! (the two-legged "jwt-bearer" grant).

use std::fmt;
use std::path::Path;

use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Request};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FeedError, Result};
use crate::transport::Transport;

/// Scope granting read/write access to the spreadsheet feeds.
pub const SPREADSHEETS_SCOPE: &str = "https://spreadsheets.google.com/feeds";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a JSON service account key this crate needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    client_email: String,
    private_key: String,
    #[serde(default)]
    private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl ServiceAccount {
    /// Parse a service account key from its JSON text.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input)
            .map_err(|e| FeedError::Auth(format!("invalid service account key: {e}")))
    }

    /// Read and parse a service account key file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            FeedError::Auth(format!(
                "failed to read service account key {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&text)
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// Build the signed JWT assertion, valid for one hour from `now`.
    pub fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let key_pair = self.key_pair()?;
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| FeedError::Auth("failed to sign JWT assertion".into()))?;

        Ok(format!(
            "{signing_input}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let item = rustls_pemfile::read_one(&mut reader)
            .map_err(|e| FeedError::Auth(format!("invalid PEM private key: {e}")))?;
        match item {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der()).map_err(|e| {
                    FeedError::Auth(format!("rejected pkcs8 private key: {e}"))
                })
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der()).map_err(|e| {
                    FeedError::Auth(format!("rejected pkcs1 private key: {e}"))
                })
            }
            _ => Err(FeedError::Auth("service account key has no RSA private key".into())),
        }
    }

    /// Exchange a freshly signed assertion for an access token.
    pub async fn fetch_access_token<T: Transport>(&self, transport: &T) -> Result<AccessToken> {
        let assertion = self.signed_assertion(Utc::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];
        let form = serde_urlencoded::to_string(params)
            .map_err(|e| FeedError::Auth(format!("failed to encode token request: {e}")))?;

        let url = Url::parse(&self.token_uri)?;
        let mut request = Request::new(Method::POST, url);
        *request.body_mut() = Some(form.into());
        request.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        tracing::debug!("Requesting access token for {}", self.client_email);
        let response = transport.send(request).await?;
        if !response.is_success() {
            return Err(FeedError::Auth(format!(
                "token endpoint returned {}: {}",
                response.status,
                String::from_utf8_lossy(&response.body)
            )));
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| FeedError::Auth(format!("invalid token response: {e}")))
    }
}

/// Credential material used to authorize feed requests.
#[derive(Clone)]
pub enum Credentials {
    /// A bearer token obtained out of band.
    AccessToken(String),
    ServiceAccount(ServiceAccount),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Credentials::ServiceAccount(sa) => f.debug_tuple("ServiceAccount").field(sa).finish(),
        }
    }
}

impl Credentials {
    /// Produce a bearer token, contacting the token endpoint if needed.
    pub async fn bearer_token<T: Transport>(&self, transport: &T) -> Result<String> {
        match self {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::ServiceAccount(sa) => {
                let token = sa.fetch_access_token(transport).await?;
                tracing::info!(
                    "Obtained access token for {} (expires in {}s)",
                    sa.client_email(),
                    token.expires_in
                );
                Ok(token.access_token)
            }
        }
    }
}
