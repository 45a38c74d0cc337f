//! `securechain serve`

use clap::Args;

use crate::core::config::Config;
use crate::core::error::Result;

#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    securechain serve                   Serve on the configured host/port
    securechain serve --port 8080       Use custom port
    securechain serve --host 0.0.0.0    Listen on all interfaces")]
pub struct ServeArgs {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to serve on (overrides PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Open the health endpoint in a browser once listening
    #[arg(long)]
    pub open: bool,
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    crate::web::run(config, args.open).await
}
