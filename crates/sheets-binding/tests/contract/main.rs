//! Contract tests for sheets-binding.
//!
//! Every test runs the binding against `FakeService`, an in-memory transport
//! that serves canned feed documents by method and path and records each
//! request it receives. Assertions check both the shaped results and the
//! exact requests issued (count, method, path, headers, body).

mod common;
mod service;

pub use common::*;
