//! Backend operation builders
//!
//! Forms collect loosely typed parameters; the builders here validate them
//! and produce a [`BackendCall`] which knows its method, path and body.
//! Nothing invalid ever reaches the backend.

mod depex;
mod form;
mod package;
pub mod validate;
mod vexgen;

pub use depex::{
    Aggregator, ConfigByImpactRequest, ConfigRequest, FileRequest, FilterConfigsRequest,
    ImpactRequest, OperationKind, OperationParams, OperationRequest, DEFAULT_LIMIT,
    DEFAULT_MAX_LEVEL,
};
pub use form::{FormStatus, OperationForm};
pub use package::PackageRequest;
pub use vexgen::{DocumentKind, VexgenRequest};

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::client::{ApiClient, BackendResponse};
use crate::core::error::Result;

/// A fully validated request against one backend endpoint
pub trait BackendCall: Send + Sync {
    fn method(&self) -> Method;

    /// Path relative to the backend base URL, query string included
    fn path(&self) -> String;

    fn body(&self) -> Result<Option<Value>>;
}

/// Send `call` and return the whole 2xx reply, bytes and headers included
pub async fn send(
    client: &ApiClient,
    call: &dyn BackendCall,
    bearer: Option<&str>,
) -> Result<BackendResponse> {
    let method = call.method();
    let path = call.path();
    debug!(%method, path = %path, "Dispatching backend call");

    let mut builder = client.request(method, &path, bearer);
    if let Some(body) = call.body()? {
        builder = builder.json(&body);
    }
    client.execute(builder).await?.error_for_status()
}

/// Send `call` and return the reply body; non-2xx replies become errors
pub async fn dispatch(
    client: &ApiClient,
    call: &dyn BackendCall,
    bearer: Option<&str>,
) -> Result<Value> {
    Ok(send(client, call, bearer).await?.body)
}
