//! `securechain vex`

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use super::connection::{print_json, ConnectionArgs};
use crate::core::error::Result;
use crate::operations::{self, DocumentKind, VexgenRequest};

#[derive(Args, Debug)]
pub struct VexArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: VexCommand,
}

#[derive(Subcommand, Debug)]
pub enum VexCommand {
    /// Generate VEX and TIX documents for a GitHub repository
    Generate {
        /// Repository owner
        #[arg(long)]
        owner: String,
        /// Repository name
        #[arg(long)]
        name: String,
        #[arg(long, env = "SECURECHAIN_USER_ID")]
        user_id: String,
    },

    /// List a user's documents
    List {
        /// vex or tix
        kind: DocumentKind,
        #[arg(long, env = "SECURECHAIN_USER_ID")]
        user_id: String,
    },

    /// Show one document
    Show { kind: DocumentKind, id: String },

    /// Download one document archive
    Download {
        kind: DocumentKind,
        id: String,
        /// Target file (default: name given by the backend)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl VexCommand {
    pub fn request(&self) -> Result<VexgenRequest> {
        match self {
            VexCommand::Generate {
                owner,
                name,
                user_id,
            } => VexgenRequest::generate(owner, name, user_id),
            VexCommand::List { kind, user_id } => VexgenRequest::list_by_user(*kind, user_id),
            VexCommand::Show { kind, id } => VexgenRequest::show(*kind, id),
            VexCommand::Download { kind, id, .. } => VexgenRequest::download(*kind, id),
        }
    }
}

/// File name from a `Content-Disposition` header, reduced to its last component
pub fn attachment_name(disposition: &str) -> Option<String> {
    let raw = disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?;
    let name = raw.trim_matches('"');
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .map(str::to_string)
}

pub async fn run(args: VexArgs) -> Result<()> {
    let client = args.connection.client()?;
    let request = args.command.request()?;
    let reply = operations::send(&client, &request, args.connection.bearer()).await?;

    let VexCommand::Download { kind, id, output } = args.command else {
        return print_json(&reply.body);
    };

    let path = output.unwrap_or_else(|| {
        reply
            .content_disposition
            .as_deref()
            .and_then(attachment_name)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("{}_{}.zip", kind, id)))
    });
    tokio::fs::write(&path, &reply.raw).await?;
    info!(path = %path.display(), bytes = reply.raw.len(), "document saved");
    println!("{}", path.display());
    Ok(())
}
