use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use resolver::cli;
use resolver::config::{self, CortexConfig, SnowflakeConfig};

#[derive(Parser)]
#[command(name = "resolver")]
#[command(
  about = "Resolver - Incident Intelligence Assistant\nFind similar historical incidents and get an AI-generated resolution"
)]
#[command(version)]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Snowflake connection and Cortex model settings
#[derive(Args)]
struct Connection {
  #[command(flatten)]
  snowflake: SnowflakeConfig,

  #[command(flatten)]
  cortex: CortexConfig,
}

#[derive(Subcommand)]
enum Command {
  /// Retrieve similar incidents and generate a recommended resolution
  Resolve {
    #[command(flatten)]
    connection: Connection,
    /// Print the resolution as JSON
    #[arg(long)]
    json: bool,
    /// Incident description, passed through unchanged (quote it)
    description: String,
  },
  /// Verify that the configured credentials can open a session
  Check {
    #[command(flatten)]
    snowflake: SnowflakeConfig,
  },
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::Resolve { connection, json, description } => {
      let resolver = cli::build_resolver(connection.snowflake, connection.cortex)?;
      cli::resolve(&resolver, &description, json).await
    }
    Command::Check { snowflake } => cli::check(snowflake).await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  config::load_dotenv();
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("resolver=debug,warn")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("resolver=warn"))
  };
  tracing_subscriber::registry().with(fmt::layer().with_writer(std::io::stderr)).with(filter).init();

  handle(cli.command).await
}
