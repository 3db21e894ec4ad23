//! Debounced autosave timer.
//!
//! Listens to [`GraphEvent`]s and, once the graph has been quiet for the
//! debounce period, sends an [`AutosaveTick`] to the owner of the document.
//! The owner does the actual save; this task never touches graph state.
//! Every change restarts the countdown. A change that leaves the graph empty
//! cancels any pending tick.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::graph::GraphEvent;

/// "Save now" signal for the document owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveTick {
    /// Revision of the last change seen before the quiet period.
    pub revision: u64,
}

pub struct AutosaveService {
    events: broadcast::Receiver<GraphEvent>,
    ticks: mpsc::Sender<AutosaveTick>,
    debounce: Duration,
    shutdown: CancellationToken,
}

impl AutosaveService {
    pub fn new(
        events: broadcast::Receiver<GraphEvent>,
        ticks: mpsc::Sender<AutosaveTick>,
        debounce: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self { events, ticks, debounce, shutdown }
    }

    /// Run the timer loop until shutdown, until the document is dropped, or
    /// until the tick receiver goes away.
    pub async fn run(mut self) {
        let mut pending: Option<(Instant, u64)> = None;
        let mut last_revision = 0;

        info!(debounce_ms = self.debounce.as_millis() as u64, "autosave running");

        loop {
            let next_deadline = pending.map(|(at, _)| at);

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!(pending = pending.is_some(), "autosave shutting down");
                    break;
                }

                event = self.events.recv() => match event {
                    Ok(event) => {
                        last_revision = event.revision;
                        if event.node_count == 0 {
                            trace!(revision = event.revision, "graph empty, autosave cancelled");
                            pending = None;
                        } else {
                            pending = Some((Instant::now() + self.debounce, event.revision));
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events still mean "something changed".
                        warn!(skipped, "autosave lagged behind change events");
                        pending = Some((Instant::now() + self.debounce, last_revision));
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("graph document dropped, autosave stopping");
                        break;
                    }
                },

                _ = async {
                    match next_deadline {
                        Some(d) => tokio::time::sleep_until(d).await,
                        None => std::future::pending().await,
                    }
                } => {
                    if let Some((_, revision)) = pending.take() {
                        debug!(revision, "autosave due");
                        if self.ticks.send(AutosaveTick { revision }).await.is_err() {
                            debug!("autosave receiver gone, stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;
    use tokio::time::sleep;

    const DEBOUNCE: Duration = Duration::from_millis(2000);

    struct Harness {
        events: broadcast::Sender<GraphEvent>,
        ticks: mpsc::Receiver<AutosaveTick>,
        shutdown: CancellationToken,
        task: tokio::task::JoinHandle<()>,
    }

    fn start() -> Harness {
        let (events, events_rx) = broadcast::channel(16);
        let (ticks_tx, ticks) = mpsc::channel(4);
        let shutdown = CancellationToken::new();
        let service = AutosaveService::new(events_rx, ticks_tx, DEBOUNCE, shutdown.clone());
        let task = tokio::spawn(service.run());
        Harness { events, ticks, shutdown, task }
    }

    fn changed(node_count: usize, revision: u64) -> GraphEvent {
        GraphEvent { graph_id: Some("g".into()), node_count, revision }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_quiet_period() {
        let mut h = start();
        h.events.send(changed(3, 1)).unwrap();

        sleep(Duration::from_millis(1999)).await;
        assert_eq!(h.ticks.try_recv(), Err(TryRecvError::Empty));

        sleep(Duration::from_millis(2)).await;
        assert_eq!(h.ticks.try_recv(), Ok(AutosaveTick { revision: 1 }));

        sleep(DEBOUNCE * 3).await;
        assert_eq!(h.ticks.try_recv(), Err(TryRecvError::Empty));
        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn each_change_restarts_the_countdown() {
        let mut h = start();
        h.events.send(changed(2, 1)).unwrap();
        sleep(Duration::from_millis(1500)).await;
        h.events.send(changed(3, 2)).unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(h.ticks.try_recv(), Err(TryRecvError::Empty));

        sleep(Duration::from_millis(600)).await;
        assert_eq!(h.ticks.try_recv(), Ok(AutosaveTick { revision: 2 }));
        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn empty_graph_cancels_pending_save() {
        let mut h = start();
        h.events.send(changed(2, 1)).unwrap();
        sleep(Duration::from_millis(500)).await;
        h.events.send(changed(0, 2)).unwrap();

        sleep(DEBOUNCE * 2).await;
        assert_eq!(h.ticks.try_recv(), Err(TryRecvError::Empty));
        h.shutdown.cancel();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_document_is_dropped() {
        let h = start();
        drop(h.events);
        h.task.await.unwrap();
    }
}
