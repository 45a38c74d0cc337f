//! HTTP API client
//!
//! Thin wrapper over `reqwest` that owns the base URL, encodes JSON
//! bodies and normalizes failures into [`crate::Error`].

mod api;

pub use api::{ApiClient, BackendResponse};
