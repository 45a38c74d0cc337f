//! VEXGen document requests

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::validate;
use super::BackendCall;
use crate::core::error::Result;

pub const GENERATE_PATH: &str = "/vexgen/vex_tix/generate";

/// Document flavour produced by VEXGen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Vex,
    Tix,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Vex => "vex",
            DocumentKind::Tix => "tix",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vex" => Ok(DocumentKind::Vex),
            "tix" => Ok(DocumentKind::Tix),
            other => Err(format!("unknown document kind: {}", other)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VexgenRequest {
    /// Generate VEX and TIX documents for a GitHub repository
    Generate {
        owner: String,
        name: String,
        user_id: String,
    },
    ListByUser { kind: DocumentKind, user_id: String },
    Show { kind: DocumentKind, id: String },
    Download { kind: DocumentKind, id: String },
}

impl VexgenRequest {
    pub fn generate(owner: &str, name: &str, user_id: &str) -> Result<Self> {
        Ok(VexgenRequest::Generate {
            owner: validate::required("owner", Some(owner))?.to_string(),
            name: validate::required("name", Some(name))?.to_string(),
            user_id: validate::required("user_id", Some(user_id))?.to_string(),
        })
    }

    pub fn list_by_user(kind: DocumentKind, user_id: &str) -> Result<Self> {
        Ok(VexgenRequest::ListByUser {
            kind,
            user_id: validate::path_id("user_id", user_id)?.to_string(),
        })
    }

    pub fn show(kind: DocumentKind, id: &str) -> Result<Self> {
        Ok(VexgenRequest::Show {
            kind,
            id: validate::path_id("id", id)?.to_string(),
        })
    }

    pub fn download(kind: DocumentKind, id: &str) -> Result<Self> {
        Ok(VexgenRequest::Download {
            kind,
            id: validate::required("id", Some(id))?.to_string(),
        })
    }
}

impl BackendCall for VexgenRequest {
    fn method(&self) -> Method {
        match self {
            VexgenRequest::Generate { .. } | VexgenRequest::Download { .. } => Method::POST,
            VexgenRequest::ListByUser { .. } | VexgenRequest::Show { .. } => Method::GET,
        }
    }

    fn path(&self) -> String {
        match self {
            VexgenRequest::Generate { .. } => GENERATE_PATH.to_string(),
            VexgenRequest::ListByUser { kind, user_id } => {
                format!("/vexgen/{}/user/{}", kind, user_id)
            }
            VexgenRequest::Show { kind, id } => format!("/vexgen/{}/show/{}", kind, id),
            VexgenRequest::Download { kind, .. } => format!("/vexgen/{}/download", kind),
        }
    }

    fn body(&self) -> Result<Option<Value>> {
        Ok(match self {
            VexgenRequest::Generate {
                owner,
                name,
                user_id,
            } => Some(json!({"owner": owner, "name": name, "user_id": user_id})),
            VexgenRequest::Download { kind, id } => {
                let mut body = Map::new();
                body.insert(format!("{}_id", kind), Value::String(id.clone()));
                Some(Value::Object(body))
            }
            _ => None,
        })
    }
}
