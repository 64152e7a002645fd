//! Resolver REST Server
//!
//! Serves the incident form and the JSON resolution endpoint.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use resolver::cli::build_resolver;
use resolver::config::{self, CortexConfig, SnowflakeConfig};
use resolver::server::{start_server, AppState};

#[derive(Parser)]
#[command(name = "resolver_server")]
#[command(about = "Resolver REST API Server")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, env = "RESOLVER_BIND", default_value = "127.0.0.1:3000")]
  bind: SocketAddr,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,

  #[command(flatten)]
  snowflake: SnowflakeConfig,

  #[command(flatten)]
  cortex: CortexConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
  config::load_dotenv();
  let args = Args::parse();

  let filter = if args.verbose {
    EnvFilter::new("resolver=debug,tower_http=debug,info")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resolver=info,warn"))
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!("Starting Resolver REST Server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!("Snowflake account: {}", args.snowflake.account);

  let resolver = build_resolver(args.snowflake, args.cortex)?;
  start_server(args.bind, AppState { resolver }).await
}
