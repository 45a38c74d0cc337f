//! Depex operation request builders
//!
//! Each operation takes the requirement file it runs on plus a handful of
//! numeric knobs. Parameters arrive loosely typed from a form (or the
//! CLI) in [`OperationParams`] and leave as one typed request body.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::validate;
use super::BackendCall;
use crate::core::error::{Error, Result};

pub const DEFAULT_MAX_LEVEL: i64 = -1;
pub const DEFAULT_LIMIT: u32 = 10;

/// Operations offered on a requirement file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    FileInfo,
    ValidGraph,
    MinimizeImpact,
    MaximizeImpact,
    FilterConfigs,
    ValidConfig,
    CompleteConfig,
    ConfigByImpact,
}

impl OperationKind {
    pub const ALL: &'static [OperationKind] = &[
        OperationKind::FileInfo,
        OperationKind::ValidGraph,
        OperationKind::MinimizeImpact,
        OperationKind::MaximizeImpact,
        OperationKind::FilterConfigs,
        OperationKind::ValidConfig,
        OperationKind::CompleteConfig,
        OperationKind::ConfigByImpact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::FileInfo => "file_info",
            OperationKind::ValidGraph => "valid_graph",
            OperationKind::MinimizeImpact => "minimize_impact",
            OperationKind::MaximizeImpact => "maximize_impact",
            OperationKind::FilterConfigs => "filter_configs",
            OperationKind::ValidConfig => "valid_config",
            OperationKind::CompleteConfig => "complete_config",
            OperationKind::ConfigByImpact => "config_by_impact",
        }
    }

    /// Backend path for this operation
    pub fn path(&self) -> String {
        match self {
            OperationKind::FileInfo => "/depex/operation/file/file_info".to_string(),
            other => format!("/depex/operation/smt/{}", other.as_str()),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("unknown operation: {}", s))
    }
}

/// How per-package impacts combine into one score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    #[default]
    Mean,
    WeightedMean,
}

impl FromStr for Aggregator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().replace('-', "_").to_ascii_lowercase().as_str() {
            "mean" => Ok(Aggregator::Mean),
            "weighted_mean" => Ok(Aggregator::WeightedMean),
            other => Err(format!("unknown aggregator: {}", other)),
        }
    }
}

/// Raw, user-entered parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationParams {
    pub requirement_file_id: Option<String>,
    pub max_level: Option<i64>,
    pub limit: Option<u32>,
    pub aggregator: Option<Aggregator>,
    pub max_threshold: Option<f64>,
    pub min_threshold: Option<f64>,
    pub impact: Option<f64>,
    /// package name -> version, for config checks
    pub config: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRequest {
    pub requirement_file_id: String,
    pub max_level: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactRequest {
    pub requirement_file_id: String,
    pub max_level: i64,
    pub limit: u32,
    pub aggregator: Aggregator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterConfigsRequest {
    pub requirement_file_id: String,
    pub max_level: i64,
    pub max_threshold: f64,
    pub min_threshold: f64,
    pub limit: u32,
    pub aggregator: Aggregator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigRequest {
    pub requirement_file_id: String,
    pub max_level: i64,
    pub aggregator: Aggregator,
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigByImpactRequest {
    pub requirement_file_id: String,
    pub max_level: i64,
    pub impact: f64,
    pub aggregator: Aggregator,
}

/// A validated operation, ready to send
#[derive(Debug, Clone, PartialEq)]
pub enum OperationRequest {
    FileInfo(FileRequest),
    ValidGraph(FileRequest),
    MinimizeImpact(ImpactRequest),
    MaximizeImpact(ImpactRequest),
    FilterConfigs(FilterConfigsRequest),
    ValidConfig(ConfigRequest),
    CompleteConfig(ConfigRequest),
    ConfigByImpact(ConfigByImpactRequest),
}

impl OperationRequest {
    /// Validate `params` for `kind` and build the request body
    pub fn build(kind: OperationKind, params: &OperationParams) -> Result<Self> {
        let requirement_file_id =
            validate::required("requirement_file_id", params.requirement_file_id.as_deref())?
                .to_string();
        let max_level = validate::max_level(params.max_level.unwrap_or(DEFAULT_MAX_LEVEL))?;
        let aggregator = params.aggregator.unwrap_or_default();
        let limit = || validate::limit(params.limit.unwrap_or(DEFAULT_LIMIT));

        let file = || FileRequest {
            requirement_file_id: requirement_file_id.clone(),
            max_level,
        };
        let impact = |limit: u32| ImpactRequest {
            requirement_file_id: requirement_file_id.clone(),
            max_level,
            limit,
            aggregator,
        };
        let config = || -> Result<ConfigRequest> {
            let config = params
                .config
                .clone()
                .filter(|c| !c.is_empty())
                .ok_or_else(|| Error::invalid("config", "at least one package is required"))?;
            Ok(ConfigRequest {
                requirement_file_id: requirement_file_id.clone(),
                max_level,
                aggregator,
                config,
            })
        };

        Ok(match kind {
            OperationKind::FileInfo => OperationRequest::FileInfo(file()),
            OperationKind::ValidGraph => OperationRequest::ValidGraph(file()),
            OperationKind::MinimizeImpact => OperationRequest::MinimizeImpact(impact(limit()?)),
            OperationKind::MaximizeImpact => OperationRequest::MaximizeImpact(impact(limit()?)),
            OperationKind::FilterConfigs => {
                let (min_threshold, max_threshold) = validate::thresholds(
                    params.min_threshold.unwrap_or(0.0),
                    params.max_threshold.unwrap_or(validate::MAX_SCORE),
                )?;
                OperationRequest::FilterConfigs(FilterConfigsRequest {
                    requirement_file_id: requirement_file_id.clone(),
                    max_level,
                    max_threshold,
                    min_threshold,
                    limit: limit()?,
                    aggregator,
                })
            }
            OperationKind::ValidConfig => OperationRequest::ValidConfig(config()?),
            OperationKind::CompleteConfig => OperationRequest::CompleteConfig(config()?),
            OperationKind::ConfigByImpact => {
                let value = params
                    .impact
                    .ok_or_else(|| Error::invalid("impact", "is required"))?;
                OperationRequest::ConfigByImpact(ConfigByImpactRequest {
                    requirement_file_id: requirement_file_id.clone(),
                    max_level,
                    impact: validate::score("impact", value)?,
                    aggregator,
                })
            }
        })
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            OperationRequest::FileInfo(_) => OperationKind::FileInfo,
            OperationRequest::ValidGraph(_) => OperationKind::ValidGraph,
            OperationRequest::MinimizeImpact(_) => OperationKind::MinimizeImpact,
            OperationRequest::MaximizeImpact(_) => OperationKind::MaximizeImpact,
            OperationRequest::FilterConfigs(_) => OperationKind::FilterConfigs,
            OperationRequest::ValidConfig(_) => OperationKind::ValidConfig,
            OperationRequest::CompleteConfig(_) => OperationKind::CompleteConfig,
            OperationRequest::ConfigByImpact(_) => OperationKind::ConfigByImpact,
        }
    }
}

impl BackendCall for OperationRequest {
    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self) -> String {
        self.kind().path()
    }

    fn body(&self) -> Result<Option<Value>> {
        let value = match self {
            OperationRequest::FileInfo(r) | OperationRequest::ValidGraph(r) => {
                serde_json::to_value(r)?
            }
            OperationRequest::MinimizeImpact(r) | OperationRequest::MaximizeImpact(r) => {
                serde_json::to_value(r)?
            }
            OperationRequest::FilterConfigs(r) => serde_json::to_value(r)?,
            OperationRequest::ValidConfig(r) | OperationRequest::CompleteConfig(r) => {
                serde_json::to_value(r)?
            }
            OperationRequest::ConfigByImpact(r) => serde_json::to_value(r)?,
        };
        Ok(Some(value))
    }
}
