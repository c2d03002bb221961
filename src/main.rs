//! StudyQA - study assistant CLI
//!
#![doc = "StudyQA - study assistant CLI"]
#![doc = "Main entry point for the StudyQA application and relay server."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use studyqa::cli::{Cli, Commands};
use studyqa::commands;
use studyqa::config::{Config, LoggingConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up OPENAI_API_KEY and STUDYQA_* from a local .env file
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let mut config = Config::load(config_path, &cli)?;

    init_tracing(&config.logging);

    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.relay.host = host.clone();
        }
        if let Some(port) = port {
            config.relay.port = *port;
        }
    }

    // Validate configuration
    config.validate()?;

    tracing::debug!(command = ?cli.command, "Dispatching command");
    commands::dispatch(cli.command, config).await
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("studyqa={}", logging.level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json_format {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
