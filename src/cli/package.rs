//! `securechain package`

use clap::{Args, Subcommand};

use super::connection::{print_json, ConnectionArgs};
use crate::core::error::Result;
use crate::graph::NodeType;
use crate::operations::{self, PackageRequest};

#[derive(Args, Debug)]
pub struct PackageArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: PackageCommand,
}

#[derive(Subcommand, Debug)]
pub enum PackageCommand {
    /// Show a package as Depex knows it
    Status {
        /// pypi, npm, maven, cargo, rubygems or nuget
        ecosystem: NodeType,
        name: String,
    },

    /// Show one version of a package
    VersionStatus {
        ecosystem: NodeType,
        name: String,
        version: String,
    },

    /// Ask Depex to build a package's graph
    Init { ecosystem: NodeType, name: String },

    /// Ask Depex to analyse a GitHub repository
    InitRepo {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "SECURECHAIN_USER_ID")]
        user_id: String,
    },

    /// List a user's repositories
    Repos {
        #[arg(long, env = "SECURECHAIN_USER_ID")]
        user_id: String,
    },
}

impl PackageCommand {
    pub fn request(&self) -> Result<PackageRequest> {
        match self {
            PackageCommand::Status { ecosystem, name } => {
                PackageRequest::package_status(*ecosystem, name)
            }
            PackageCommand::VersionStatus {
                ecosystem,
                name,
                version,
            } => PackageRequest::version_status(*ecosystem, name, version),
            PackageCommand::Init { ecosystem, name } => {
                PackageRequest::init_package(*ecosystem, name)
            }
            PackageCommand::InitRepo {
                owner,
                name,
                user_id,
            } => PackageRequest::init_repository(owner, name, user_id),
            PackageCommand::Repos { user_id } => PackageRequest::user_repositories(user_id),
        }
    }
}

pub async fn run(args: PackageArgs) -> Result<()> {
    let client = args.connection.client()?;
    let request = args.command.request()?;
    let body = operations::dispatch(&client, &request, args.connection.bearer()).await?;
    print_json(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::BackendCall;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        package: PackageArgs,
    }

    fn parse(args: &[&str]) -> PackageRequest {
        let mut argv = vec!["securechain", "--api-url", "http://backend"];
        argv.extend_from_slice(args);
        Harness::try_parse_from(argv).unwrap().package.command.request().unwrap()
    }

    #[test]
    fn test_version_status_query() {
        let request = parse(&["version-status", "pypi", "flask", "2.3.2"]);
        assert_eq!(
            request.path(),
            "/depex/version/status?node_type=PyPIPackage&package_name=flask&version_name=2.3.2"
        );
    }

    #[test]
    fn test_init_repo() {
        let request = parse(&["init-repo", "--owner", "pallets", "--name", "flask", "--user-id", "u1"]);
        assert_eq!(
            request,
            PackageRequest::InitRepository {
                owner: "pallets".to_string(),
                name: "flask".to_string(),
                user_id: "u1".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_ecosystem_rejected() {
        assert!(Harness::try_parse_from([
            "securechain",
            "--api-url",
            "http://backend",
            "status",
            "cocoapods",
            "x"
        ])
        .is_err());
    }
}
