//! Backend connection flags shared by the request commands

use clap::Args;
use serde_json::Value;
use std::time::Duration;

use crate::client::ApiClient;
use crate::core::config::DEFAULT_TIMEOUT_SECS;
use crate::core::error::Result;

#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Backend base URL
    #[arg(long, env = "BACKEND_URL")]
    pub api_url: String,

    /// Access token
    #[arg(long, env = "SECURECHAIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

impl ConnectionArgs {
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.api_url, Duration::from_secs(self.timeout))
    }

    pub fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Print a reply body, unwrapping the `{ "data": ... }` envelope
pub fn print_json(body: &Value) -> Result<()> {
    let data = body.get("data").unwrap_or(body);
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}
