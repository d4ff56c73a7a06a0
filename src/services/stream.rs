//! The event stream client: one logical SSE subscription with timed reconnect.
//!
//! The client owns a single background task. `connect` tears down any
//! previous task before spawning a new one so events are never delivered
//! twice; a transport failure schedules exactly one reconnect attempt, which
//! is skipped when a concurrent `connect` already reestablished the stream.

use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use reqwest::header::ACCEPT;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::dto::event::DashboardEvent;
use crate::error::DecodeError;
use crate::services::sse::{SseFrame, SseParser};
use crate::state::{ConnectionPhase, SharedState};

/// Client for the server's `/api/events` SSE channel.
pub struct StreamClient {
    http: reqwest::Client,
    events_url: String,
    reconnect_delay: Duration,
    state: SharedState,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StreamClient {
    /// Build a client; no connection is attempted until [`StreamClient::connect`].
    pub fn new(config: &AppConfig, state: SharedState) -> Arc<Self> {
        Arc::new(Self {
            http: reqwest::Client::new(),
            events_url: config.events_url(),
            reconnect_delay: config.reconnect_delay,
            state,
            task: Mutex::new(None),
        })
    }

    /// Establish the subscription, tearing down any existing one first.
    pub async fn connect(self: &Arc<Self>) {
        let mut task = self.task.lock().await;
        teardown(&mut task).await;
        let client = Arc::clone(self);
        *task = Some(tokio::spawn(async move { client.run().await }));
    }

    /// Release the subscription. Safe to call when none is active.
    pub async fn disconnect(&self) {
        let mut task = self.task.lock().await;
        teardown(&mut task).await;
        self.state.set_connection(ConnectionPhase::Disconnected);
    }

    async fn run(self: Arc<Self>) {
        loop {
            self.state.set_connection(ConnectionPhase::Connecting);
            match self.subscribe().await {
                Ok(()) => warn!(url = %self.events_url, "event stream ended"),
                Err(err) => warn!(url = %self.events_url, error = %err, "event stream failed"),
            }
            self.state.set_connection(ConnectionPhase::Disconnected);

            if !should_redial_after(&self.state, self.reconnect_delay).await {
                return;
            }
        }
    }

    /// Open the stream and pump frames into the store until the transport drops.
    async fn subscribe(&self) -> Result<(), reqwest::Error> {
        let response = self
            .http
            .get(&self.events_url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;

        self.state.set_connection(ConnectionPhase::Connected);
        info!(url = %self.events_url, "event stream connected");

        let mut chunks = response.bytes_stream();
        let mut parser = SseParser::new();
        while let Some(chunk) = chunks.next().await {
            for frame in parser.push(&chunk?) {
                dispatch_frame(&self.state, frame).await;
            }
        }
        Ok(())
    }
}

/// Decode one frame and apply it to the store.
///
/// Decode failures are isolated: the frame is dropped with a warning and the
/// subscription stays up.
pub(crate) async fn dispatch_frame(state: &SharedState, frame: SseFrame) {
    let Some(event) = frame.event else {
        debug!("dropping unnamed SSE frame");
        return;
    };
    match DashboardEvent::decode(&event, &frame.data) {
        Ok(decoded) => state.apply_event(decoded).await,
        Err(DecodeError::UnknownEvent(name)) => {
            debug!(event = %name, "ignoring unknown event type");
        }
        Err(err) => warn!(event = %event, error = %err, "dropping undecodable event"),
    }
}

/// Abort the subscription task and wait for it to fully stop.
///
/// `abort` alone only requests cancellation; the task's in-flight poll can
/// still publish a phase update after the caller moves on, leaving a stale
/// indicator. Awaiting the handle makes teardown synchronous: once this
/// returns, the old task can no longer touch the connection phase.
async fn teardown(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        handle.abort();
        let _ = handle.await;
    }
}

/// Wait out the reconnect delay, then decide whether to redial.
///
/// The scheduled attempt is a no-op when a connection was reestablished in
/// the meantime, which keeps overlapping timers from causing reconnect storms.
async fn should_redial_after(state: &SharedState, delay: Duration) -> bool {
    sleep(delay).await;
    !state.is_connected()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::state::DashboardState;

    fn named_frame(event: &str, data: &str) -> SseFrame {
        SseFrame {
            event: Some(event.to_string()),
            data: data.to_string(),
        }
    }

    #[tokio::test]
    async fn decode_failure_leaves_previous_state_unchanged() {
        let state = DashboardState::new();
        dispatch_frame(
            &state,
            named_frame("dispensers", r#"{"health": [{"id": 4, "online": true}]}"#),
        )
        .await;
        assert_eq!(
            state
                .read_view(|view| view.dispensers.online_health_ids())
                .await,
            vec![4]
        );

        dispatch_frame(&state, named_frame("dispensers", "not json")).await;
        assert_eq!(
            state
                .read_view(|view| view.dispensers.online_health_ids())
                .await,
            vec![4],
            "malformed payload must not clobber dispenser state"
        );
    }

    #[tokio::test]
    async fn unknown_events_and_unnamed_frames_are_skipped() {
        let state = DashboardState::new();
        let revisions = state.revision_watcher();

        dispatch_frame(&state, named_frame("firmware-update", "{}")).await;
        dispatch_frame(
            &state,
            SseFrame {
                event: None,
                data: "{}".into(),
            },
        )
        .await;
        assert_eq!(*revisions.borrow(), 0, "nothing should have been applied");
    }

    #[tokio::test]
    async fn events_apply_in_delivery_order() {
        let state = DashboardState::new();
        dispatch_frame(&state, named_frame("isPlaying", "false")).await;
        dispatch_frame(&state, named_frame("timeLeft", "42")).await;
        assert!(
            state.read_view(|view| view.game.playing).await,
            "later timer tick overrides the stale isPlaying"
        );
    }

    #[tokio::test]
    async fn teardown_outlives_the_old_task() {
        struct SetOnDrop(Arc<AtomicBool>);
        impl Drop for SetOnDrop {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let stopped = Arc::new(AtomicBool::new(false));
        let guard = SetOnDrop(Arc::clone(&stopped));
        let mut task = Some(tokio::spawn(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        }));

        teardown(&mut task).await;
        assert!(task.is_none());
        assert!(
            stopped.load(Ordering::SeqCst),
            "old task must be fully stopped before teardown returns, \
             or it could overwrite the phase set by its successor"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn redial_proceeds_only_while_still_disconnected() {
        let state = DashboardState::new();
        state.set_connection(ConnectionPhase::Disconnected);
        assert!(should_redial_after(&state, Duration::from_secs(3)).await);

        // Simulate a concurrent connect() winning the race before the timer
        // fires: the scheduled attempt must become a no-op.
        state.set_connection(ConnectionPhase::Connected);
        assert!(!should_redial_after(&state, Duration::from_secs(3)).await);
    }
}
