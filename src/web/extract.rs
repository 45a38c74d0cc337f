//! Request extractors whose rejections use the `{code, message}` body

use axum::extract::{FromRequest, FromRequestParts};

use crate::core::error::Error;

/// JSON request body; malformed input is `invalid_parameter`
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Path parameters; unparsable segments are `invalid_parameter`
#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);
