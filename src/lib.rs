//! Secure Chain - API layer and dependency graph engine
//!
//! Sits between the Secure Chain web application and its backend
//! services: owns the session cookies, refreshes expired tokens, forwards
//! Depex/VEXGen calls and keeps bounded, expandable dependency graph views.

pub mod auth;
pub mod cli;
pub mod client;
pub mod core;
pub mod graph;
pub mod i18n;
pub mod operations;
pub mod web;

pub use core::config::Config;
pub use core::error::{Error, Result};
