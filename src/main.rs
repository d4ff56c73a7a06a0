//! Lasertag console binary entrypoint wiring the stream client, store, and gateway.

use futures::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lasertag_console::config::AppConfig;
use lasertag_console::services::{gateway::CommandGateway, stream::StreamClient};
use lasertag_console::state::{ConnectionPhase, DashboardState, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let state = DashboardState::new();
    let gateway = CommandGateway::new(&config);

    // Older servers only push deltas, so seed the view once before streaming.
    if let Err(err) = gateway.fetch_initial(&state).await {
        warn!(error = %err, "initial bulk fetch failed; waiting for the stream");
    }

    let stream = StreamClient::new(&config, state.clone());
    stream.connect().await;

    tokio::spawn(report_connection(state.clone()));
    tokio::spawn(report_scoreboard(state.clone()));

    shutdown_signal().await;
    stream.disconnect().await;
    info!("console shut down");

    Ok(())
}

/// Log connection phase changes so the operator can tell a stale display
/// from a live one.
async fn report_connection(state: SharedState) {
    let mut phases = WatchStream::new(state.connection_watcher());
    while let Some(phase) = phases.next().await {
        match phase {
            ConnectionPhase::Connecting => info!("connecting to event stream"),
            ConnectionPhase::Connected => info!("event stream connected"),
            ConnectionPhase::Disconnected => warn!("event stream disconnected"),
        }
    }
}

/// Trace the derived ranking whenever the store changes.
async fn report_scoreboard(state: SharedState) {
    let mut revisions = WatchStream::new(state.revision_watcher());
    while revisions.next().await.is_some() {
        let scores = state.read_view(|view| view.game.team_scores.clone()).await;
        debug!(?scores, "scoreboard updated");
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM before shutting the console down.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
