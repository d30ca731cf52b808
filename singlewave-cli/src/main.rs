//! SingleWave developer CLI
//!
//! Plays the host application: keeps SDK state in a JSON file, simulates the
//! platform's permission answers and delivers tokens and notification
//! payloads to the SDK.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{bail, eyre, WrapErr};
use singlewave_core::storage::{KeyValueStore, PersistedState};
use singlewave_core::{
    dispatch, AuthorizationStatus, CustomDataEncoding, LaunchContext, ReregistrationPolicy,
    SdkConfig, SingleWave, DEFAULT_BACKEND_URL,
};
use tracing_subscriber::EnvFilter;

mod host;
mod store;

use host::SimulatedHost;
use store::FileStore;

#[derive(Parser)]
#[command(name = "singlewave")]
#[command(about = "Register a device and report notification opens against the SingleWave backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project id issued by SingleWave
    #[arg(long, env = "SINGLEWAVE_PROJECT_ID", global = true, default_value = "")]
    project_id: String,

    /// State file (defaults to the platform data directory)
    #[arg(long, env = "SINGLEWAVE_STATE", global = true)]
    state: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, env = "SINGLEWAVE_BACKEND_URL", global = true, default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Log SDK diagnostics
    #[arg(short, long, global = true)]
    debug: bool,

    /// Notification permission the simulated device reports
    #[arg(long, global = true, default_value = "authorized")]
    permission: AuthorizationStatus,

    /// Device locale language code
    #[arg(long, global = true, default_value = "en")]
    language: String,

    /// When to re-register after an update (always, on-change)
    #[arg(long, global = true, default_value = "always")]
    reregistration: ReregistrationPolicy,

    /// Rendering of custom data (json, legacy)
    #[arg(long, global = true, default_value = "json")]
    data_encoding: CustomDataEncoding,

    /// Keep failed backend calls and re-send them later
    #[arg(long, global = true)]
    outbox: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deliver a device token, as the platform would after permission is granted
    Register {
        /// Raw device token, hex encoded
        #[arg(long)]
        token: String,
    },

    /// Replace the subscriber's custom data
    SetData {
        /// Entries as key=value
        entries: Vec<String>,
    },

    /// Deliver a tapped notification
    Open {
        /// Notification userInfo as JSON
        #[arg(long)]
        payload: String,
    },

    /// Deliver a notification received in the foreground
    Foreground {
        /// Notification userInfo as JSON
        #[arg(long)]
        payload: String,
    },

    /// Re-send backend calls left in the outbox
    Flush,

    /// Print the persisted SDK state
    State,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let state_path = match cli.state.clone() {
        Some(path) => path,
        None => default_state_path()?,
    };
    let store = Arc::new(
        FileStore::open(&state_path)
            .wrap_err_with(|| format!("opening state file {}", state_path.display()))?,
    );

    if matches!(cli.command, Commands::State) {
        return print_state(store.as_ref());
    }

    if cli.project_id.is_empty() {
        bail!("--project-id (or SINGLEWAVE_PROJECT_ID) is required");
    }

    let config = SdkConfig::new(cli.project_id.clone(), cli.debug)
        .with_backend_url(cli.backend_url.clone())
        .with_reregistration(cli.reregistration)
        .with_custom_data_encoding(cli.data_encoding)
        .with_durable_outbox(cli.outbox);
    let launch = LaunchContext {
        language: Some(cli.language.clone()),
        build: Some(env!("CARGO_PKG_VERSION").to_string()),
        launch_options: None,
    };

    let host = Arc::new(SimulatedHost::new(cli.permission));
    let client = SingleWave::initialize(
        config,
        launch,
        store.clone(),
        host.clone(),
        host.clone(),
        host.clone(),
    );

    match cli.command {
        Commands::Register { token } => {
            let token = hex::decode(token.trim()).wrap_err("device token must be hex")?;
            if !host.token_requested() {
                bail!(
                    "permission is {}; the platform would not issue a device token",
                    cli.permission
                );
            }
            client.on_token_received(token).await;
            println!("registered device token {}", client.device_token());
        }
        Commands::SetData { entries } => {
            let custom_data = parse_entries(&entries)?;
            client.set_custom_data(custom_data).await;
            println!("custom data set ({} entries)", client.custom_data().len());
        }
        Commands::Open { payload } => {
            client.on_notification_opened(payload).await;
        }
        Commands::Foreground { payload } => {
            client.on_notification_foreground(payload).await;
        }
        Commands::Flush => {
            let remaining = client.flush_pending_requests().await;
            println!("{remaining} backend call(s) still pending");
        }
        Commands::State => print_state(store.as_ref())?,
    }

    tracing::debug!(badge_clears = host.badge_clears(), "done");
    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_state_path() -> eyre::Result<PathBuf> {
    let dir = dirs::data_dir().ok_or_else(|| eyre!("no data directory on this platform"))?;
    Ok(dir.join("singlewave").join("state.json"))
}

fn parse_entries(entries: &[String]) -> eyre::Result<HashMap<String, String>> {
    entries
        .iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| eyre!("expected key=value, got {entry:?}"))
        })
        .collect()
}

fn print_state(store: &dyn KeyValueStore) -> eyre::Result<()> {
    let persisted = PersistedState::load(store);
    let pending = dispatch::load_pending(store)?;
    let state = serde_json::json!({
        "device_token": persisted.device_token,
        "custom_data": persisted.custom_data,
        "pending_requests": pending,
    });
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
