//! Questline — HTTP session transport.
//!
//! Implements [`questline_core::transport::SessionTransport`] against the
//! story server's form-in / JSON-out endpoints.

pub mod http;
pub mod wire;

pub use http::{HttpSessionTransport, PingResponse};
