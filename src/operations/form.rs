//! Per-form operation state
//!
//! A form has exactly one selected operation and at most one call in
//! flight. `begin` is the guard: it refuses while executing and leaves the
//! status untouched when the parameters do not validate.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{dispatch, OperationKind, OperationParams, OperationRequest};
use crate::client::ApiClient;
use crate::core::error::{Error, ErrorBody, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormStatus {
    Idle,
    Executing,
    Succeeded { result: Value },
    Failed { error: ErrorBody },
}

#[derive(Debug, Clone)]
pub struct OperationForm {
    selected: OperationKind,
    params: OperationParams,
    status: FormStatus,
}

impl OperationForm {
    pub fn new(selected: OperationKind) -> Self {
        Self {
            selected,
            params: OperationParams::default(),
            status: FormStatus::Idle,
        }
    }

    pub fn selected(&self) -> OperationKind {
        self.selected
    }

    pub fn params(&self) -> &OperationParams {
        &self.params
    }

    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.status, FormStatus::Executing)
    }

    /// Switch operation; the previous result no longer applies
    pub fn select(&mut self, kind: OperationKind) -> Result<()> {
        if self.is_executing() {
            return Err(Error::OperationInProgress);
        }
        if kind != self.selected {
            self.selected = kind;
            self.status = FormStatus::Idle;
        }
        Ok(())
    }

    pub fn set_params(&mut self, params: OperationParams) -> Result<()> {
        if self.is_executing() {
            return Err(Error::OperationInProgress);
        }
        self.params = params;
        Ok(())
    }

    /// Validate and mark executing
    pub fn begin(&mut self) -> Result<OperationRequest> {
        if self.is_executing() {
            return Err(Error::OperationInProgress);
        }
        let request = OperationRequest::build(self.selected, &self.params)?;
        self.status = FormStatus::Executing;
        Ok(request)
    }

    /// Record the outcome of the call started by `begin`
    pub fn complete(&mut self, result: Result<Value>) {
        self.status = match result {
            Ok(result) => FormStatus::Succeeded { result },
            Err(e) => {
                debug!(code = e.code(), "Operation failed");
                FormStatus::Failed { error: e.body() }
            }
        };
    }

    /// Run the selected operation to completion
    pub async fn execute(&mut self, client: &ApiClient, token: Option<&str>) -> &FormStatus {
        let request = match self.begin() {
            Ok(request) => request,
            Err(e) => {
                if !self.is_executing() {
                    self.status = FormStatus::Failed { error: e.body() };
                }
                return &self.status;
            }
        };

        info!(operation = %self.selected, "Executing operation");
        let result = dispatch(client, &request, token).await;
        self.complete(result);
        &self.status
    }
}
