//! CLI command definitions

pub mod connection;
pub mod op;
pub mod package;
pub mod serve;
pub mod vex;

use clap::{Parser, Subcommand};

use crate::i18n::Locale;

const LONG_ABOUT: &str = r#"
Secure Chain API layer: session cookies, token refresh and graph views
in front of the Depex and VEXGen services.

QUICK START:
    1. export BACKEND_URL=http://localhost:8000
    2. securechain serve            Start the API on localhost:3000

OPERATIONS:
    securechain op valid_graph --file <id> --token <jwt>
    securechain op minimize_impact --file <id> --limit 5 --aggregator weighted_mean
    securechain op config_by_impact --file <id> --impact 4.5
    securechain op valid_config --file <id> --config flask=2.3.2 --config jinja2=3.1.2

PACKAGES AND DOCUMENTS:
    securechain package status pypi flask
    securechain package init-repo --owner pallets --name flask --user-id <id>
    securechain vex generate --owner pallets --name flask --user-id <id>
    securechain vex list tix --user-id <id>
    securechain vex download vex <id> -o flask-vex.zip

CONFIGURATION:
    Defaults, then $SECURECHAIN_CONFIG (TOML), then environment variables
    (BACKEND_URL, NODE_ENV, HOST, PORT, WEB3FORMS_ACCESS_KEY, ...).
    Log level comes from SECURECHAIN_LOG (default: info).
"#;

/// Secure Chain API layer
#[derive(Parser, Debug)]
#[command(name = "securechain")]
#[command(author, version)]
#[command(about = "Secure Chain API layer")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Language for error messages (en, es)
    #[arg(long, global = true, env = "SECURECHAIN_LANG", default_value = "en")]
    pub lang: Locale,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the API routes
    #[command(visible_alias = "s")]
    Serve(serve::ServeArgs),

    /// Run one Depex operation against the backend
    Op(op::OpArgs),

    /// Query or initialise packages and repositories in Depex
    Package(package::PackageArgs),

    /// Generate, list and download VEX/TIX documents
    Vex(vex::VexArgs),
}
