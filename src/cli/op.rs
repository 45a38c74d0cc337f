//! `securechain op`

use clap::Args;
use std::collections::BTreeMap;

use super::connection::ConnectionArgs;
use crate::core::error::{Error, Result};
use crate::operations::{Aggregator, FormStatus, OperationForm, OperationKind, OperationParams};

#[derive(Args, Debug)]
#[command(after_help = "OPERATIONS:
    file_info, valid_graph, minimize_impact, maximize_impact,
    filter_configs, valid_config, complete_config, config_by_impact")]
pub struct OpArgs {
    /// Operation to run
    pub operation: OperationKind,

    /// Requirement file id
    #[arg(short, long = "file")]
    pub requirement_file_id: Option<String>,

    /// Dependency depth (-1 for unlimited)
    #[arg(long, allow_negative_numbers = true)]
    pub max_level: Option<i64>,

    /// Maximum number of configurations returned
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,

    /// mean or weighted_mean
    #[arg(long)]
    pub aggregator: Option<Aggregator>,

    #[arg(long)]
    pub min_threshold: Option<f64>,

    #[arg(long)]
    pub max_threshold: Option<f64>,

    /// Target impact, 0 to 10
    #[arg(long)]
    pub impact: Option<f64>,

    /// Package pinned in the configuration, as name=version (repeatable)
    #[arg(long = "config", value_parser = parse_pin)]
    pub config: Vec<(String, String)>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

fn parse_pin(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, version)) if !name.trim().is_empty() && !version.trim().is_empty() => {
            Ok((name.trim().to_string(), version.trim().to_string()))
        }
        _ => Err(format!("expected name=version, got '{}'", raw)),
    }
}

impl OpArgs {
    pub fn params(&self) -> OperationParams {
        OperationParams {
            requirement_file_id: self.requirement_file_id.clone(),
            max_level: self.max_level,
            limit: self.limit,
            aggregator: self.aggregator,
            max_threshold: self.max_threshold,
            min_threshold: self.min_threshold,
            impact: self.impact,
            config: (!self.config.is_empty())
                .then(|| self.config.iter().cloned().collect::<BTreeMap<_, _>>()),
        }
    }
}

pub async fn run(args: OpArgs) -> Result<()> {
    let client = args.connection.client()?;

    let mut form = OperationForm::new(args.operation);
    form.set_params(args.params())?;

    match form.execute(&client, args.connection.bearer()).await {
        FormStatus::Succeeded { result } => {
            println!("{}", serde_json::to_string_pretty(result)?);
            Ok(())
        }
        FormStatus::Failed { error } => Err(Error::Backend {
            status: 502,
            code: error.code.clone(),
            message: error.message.clone(),
        }),
        other => Err(Error::ConfigError {
            message: format!("operation ended in unexpected state {:?}", other),
        }),
    }
}
