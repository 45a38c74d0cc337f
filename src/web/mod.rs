//! Secure Chain API layer
//!
//! HTTP routes sitting between the browser and the backend services.
//! Session cookies are owned here; everything else is forwarded.

pub mod auth;
pub mod contact;
pub mod extract;
pub mod graph;
pub mod proxy;
pub mod server;

pub use server::{build_router, run, AppState};
