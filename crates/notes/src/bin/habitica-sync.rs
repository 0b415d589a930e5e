//! CLI entry point: mirror Habitica tasks into per-category markdown notes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use habitica::HabiticaClient;
use notes::{EventHub, EventKind, FileNoteStore, SubscriberGroup, SyncConfig, SyncOrchestrator};

#[derive(Parser)]
#[command(
    name = "habitica-sync",
    about = "Mirror Habitica tasks into per-category markdown notes",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all tasks and regenerate the notes
    Sync {
        /// Keep syncing on this interval instead of exiting
        #[arg(long, value_name = "SECONDS")]
        watch: Option<u64>,
    },
    /// Check credentials and report the quota state
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::default();

    let client_config = config
        .client_config()
        .context("HABITICA_USER_ID and HABITICA_API_KEY must be set")?;
    let client = HabiticaClient::new(&client_config)?;

    match cli.command {
        Command::Verify => {
            client.verify_credentials().await?;
            let state = client.rate_limit().await;
            info!(remaining = state.remaining, "credentials ok");
        }
        Command::Sync { watch } => {
            if !config.sync_notes {
                bail!("note sync is disabled (SYNC_NOTES_ENABLED=0)");
            }

            let hub = Arc::new(EventHub::new());
            if config.live_panel {
                for event in EventKind::ALL {
                    hub.subscribe(event, SubscriberGroup::Panel, move |tasks| {
                        info!(?event, count = tasks.len(), "tasks refreshed");
                    });
                }
            }

            let store = FileNoteStore::new(&config.folder);
            let orchestrator =
                SyncOrchestrator::new(client, hub, store, config.render_settings());

            orchestrator.sync_all().await?;

            if let Some(secs) = watch {
                // Retry-on-next-tick is this caller's policy; the core itself
                // never retries.
                let interval = Duration::from_secs(secs.max(1));
                loop {
                    tokio::time::sleep(interval).await;
                    if let Err(e) = orchestrator.sync_all().await {
                        warn!(error = %e, "sync failed, retrying on next tick");
                    }
                }
            }
        }
    }

    Ok(())
}
