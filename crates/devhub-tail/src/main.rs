//! DevHub topic tail.
//!
//! # Usage
//!
//! ```bash
//! # Tail a topic against a local server
//! devhub-tail --topic 42 --token "$TOKEN"
//!
//! # Reuse the login stored by a previous session
//! devhub-tail --topic 42 --state ~/.devhub/state.redb --api-url https://devhub.example.com/api
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use devhub_client::{ApiBase, ConnectionConfig, ReconnectConfig};
use devhub_tail::{Runtime, RuntimeError, TailDriver, stored_token};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Follow one DevHub chat topic in real time
#[derive(Parser, Debug)]
#[command(name = "devhub-tail")]
#[command(about = "Tail a DevHub chat topic over its realtime socket")]
#[command(version)]
struct Args {
    /// Topic to subscribe to
    #[arg(short, long)]
    topic: String,

    /// Bearer token. Falls back to the login stored in --state.
    #[arg(long, env = "DEVHUB_TOKEN")]
    token: Option<String>,

    /// Path to the persisted client state
    #[arg(long, env = "DEVHUB_STATE")]
    state: Option<PathBuf>,

    /// API base URL, absolute or a path on --origin
    #[arg(long, env = "DEVHUB_API_URL")]
    api_url: Option<String>,

    /// Origin the API defaults to when --api-url is not set
    #[arg(long, default_value = "http://localhost:8080")]
    origin: String,

    /// Seconds between heartbeats, 0 to disable
    #[arg(long, default_value = "30")]
    heartbeat_secs: u64,

    /// Reconnect attempts before giving up
    #[arg(long, default_value = "5")]
    max_reconnects: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let api = ApiBase::resolve(args.api_url.as_deref(), &args.origin).map_err(RuntimeError::from)?;

    let token = match (args.token, &args.state) {
        (Some(token), _) => token,
        (None, Some(path)) => stored_token(path)?.ok_or(RuntimeError::MissingToken)?,
        (None, None) => return Err(RuntimeError::MissingToken.into()),
    };

    let config = ConnectionConfig {
        reconnect: ReconnectConfig { max_attempts: args.max_reconnects, ..ReconnectConfig::default() },
        heartbeat_interval: (args.heartbeat_secs > 0).then(|| Duration::from_secs(args.heartbeat_secs)),
    };

    tracing::info!(api = %api, topic = %args.topic, "devhub-tail starting");

    let driver = TailDriver::new(api, config, &args.topic, token);
    Runtime::new(driver).run().await?;

    Ok(())
}
