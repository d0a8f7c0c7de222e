//! # Persistence Coordinator
//!
//! Coalesces configuration changes and writes sanitized snapshots to a
//! `ConfigStore` once edits go quiet.
//!
//! - Every `schedule` replaces the pending value and re-arms the debounce
//!   timer, so only the last value of a burst is written
//! - At most one write is in flight: the worker owns the store
//! - A snapshot equal by value to the last written one is not rewritten
//! - A failed write is logged, recorded in the status and kept pending; it is
//!   retried on the next debounce cycle or on `close(ClosePolicy::Flush)`
//! - Closing is explicit: the caller chooses between flushing and discarding

use rostra_core::{ConfigStore, Configuration, RostraError, sanitize_snapshot, snapshot_checksum};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

// =============================================================================
// PUBLIC TYPES
// =============================================================================

/// What to do with a pending snapshot on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Write the pending snapshot before stopping.
    Flush,
    /// Drop the pending snapshot.
    Discard,
}

/// Result of a flush request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushOutcome {
    /// The snapshot was saved.
    Written,
    /// The snapshot equals the last written one; nothing was saved.
    Unchanged,
    /// No change was pending.
    NothingPending,
    /// The pending snapshot was dropped on close.
    Discarded,
}

/// Observable state of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushStatus {
    /// Successful saves since start.
    pub writes: u64,
    /// Failed saves since start.
    pub failures: u64,
    /// A snapshot is waiting to be written.
    pub pending: bool,
    /// Error of the most recent failed save, cleared on the next success.
    pub last_error: Option<String>,
    /// Checksum of the last written snapshot.
    pub last_checksum: Option<u64>,
    /// The worker has stopped.
    pub closed: bool,
}

type Reply = oneshot::Sender<Result<FlushOutcome, RostraError>>;

enum Command {
    Schedule(Box<Configuration>),
    Flush(Reply),
    Close(ClosePolicy, Reply),
}

/// Handle to the debounce worker.
#[derive(Debug)]
pub struct PersistenceCoordinator {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<FlushStatus>,
}

impl PersistenceCoordinator {
    /// Spawn the worker on the current tokio runtime.
    ///
    /// `last_flushed` is the snapshot the store already holds, if any.
    pub fn spawn(
        store: Arc<dyn ConfigStore>,
        quiet: Duration,
        last_flushed: Option<Configuration>,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let initial = FlushStatus {
            last_checksum: last_flushed
                .as_ref()
                .and_then(|snapshot| snapshot_checksum(snapshot).ok()),
            ..FlushStatus::default()
        };
        let (status_tx, status) = watch::channel(initial);

        let worker = Worker {
            store,
            quiet,
            pending: None,
            last_flushed,
            status: status_tx,
        };
        tokio::spawn(worker.run(receiver));

        Self { commands, status }
    }

    /// Record a new configuration value and restart the quiet interval.
    pub fn schedule(&self, config: Configuration) {
        if self
            .commands
            .send(Command::Schedule(Box::new(config)))
            .is_err()
        {
            tracing::warn!("Persistence coordinator closed; change not scheduled");
        }
    }

    /// Write the pending snapshot now.
    pub async fn flush(&self) -> Result<FlushOutcome, RostraError> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Flush(reply), response).await
    }

    /// Stop the worker after applying `policy` to the pending snapshot.
    pub async fn close(&self, policy: ClosePolicy) -> Result<FlushOutcome, RostraError> {
        let (reply, response) = oneshot::channel();
        self.request(Command::Close(policy, reply), response).await
    }

    async fn request(
        &self,
        command: Command,
        response: oneshot::Receiver<Result<FlushOutcome, RostraError>>,
    ) -> Result<FlushOutcome, RostraError> {
        self.commands
            .send(command)
            .map_err(|_| closed_error())?;
        response.await.map_err(|_| closed_error())?
    }

    /// Current status snapshot.
    #[must_use]
    pub fn status(&self) -> FlushStatus {
        self.status.borrow().clone()
    }
}

fn closed_error() -> RostraError {
    RostraError::IoError("persistence coordinator closed".to_string())
}

// =============================================================================
// WORKER
// =============================================================================

struct Worker {
    store: Arc<dyn ConfigStore>,
    quiet: Duration,
    pending: Option<Configuration>,
    last_flushed: Option<Configuration>,
    status: watch::Sender<FlushStatus>,
}

impl Worker {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let sleep = tokio::time::sleep(self.quiet);
        tokio::pin!(sleep);
        let mut armed = false;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Schedule(config)) => {
                        self.pending = Some(*config);
                        sleep.as_mut().reset(Instant::now() + self.quiet);
                        armed = true;
                        self.publish_pending();
                    }
                    Some(Command::Flush(reply)) => {
                        armed = false;
                        let _ = reply.send(self.write_pending());
                    }
                    Some(Command::Close(policy, reply)) => {
                        let outcome = match policy {
                            ClosePolicy::Flush => self.write_pending(),
                            ClosePolicy::Discard => Ok(self.discard_pending()),
                        };
                        self.status.send_modify(|status| status.closed = true);
                        let _ = reply.send(outcome);
                        return;
                    }
                    None => {
                        // every handle dropped without close
                        let _ = self.write_pending();
                        self.status.send_modify(|status| status.closed = true);
                        return;
                    }
                },
                () = &mut sleep, if armed => {
                    armed = false;
                    let _ = self.write_pending();
                }
            }
        }
    }

    fn publish_pending(&self) {
        let pending = self.pending.is_some();
        self.status.send_modify(|status| status.pending = pending);
    }

    fn discard_pending(&mut self) -> FlushOutcome {
        let outcome = match self.pending.take() {
            Some(_) => {
                tracing::info!("Discarding pending configuration snapshot");
                FlushOutcome::Discarded
            }
            None => FlushOutcome::NothingPending,
        };
        self.publish_pending();
        outcome
    }

    fn write_pending(&mut self) -> Result<FlushOutcome, RostraError> {
        let Some(config) = self.pending.take() else {
            return Ok(FlushOutcome::NothingPending);
        };

        let snapshot = sanitize_snapshot(&config);
        if self.last_flushed.as_ref() == Some(&snapshot) {
            tracing::debug!("Snapshot unchanged; skipping write");
            self.publish_pending();
            return Ok(FlushOutcome::Unchanged);
        }

        let dropped = config.combo_catalog.len() - snapshot.combo_catalog.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Omitting combos with repeated slots from snapshot");
        }

        match self.store.save(&snapshot) {
            Ok(()) => {
                let checksum = snapshot_checksum(&snapshot).ok();
                self.last_flushed = Some(snapshot);
                self.status.send_modify(|status| {
                    status.writes += 1;
                    status.pending = false;
                    status.last_error = None;
                    status.last_checksum = checksum;
                });
                tracing::debug!(?checksum, "Configuration snapshot written");
                Ok(FlushOutcome::Written)
            }
            Err(e) => {
                tracing::warn!("Configuration save failed, will retry: {}", e);
                self.pending = Some(config);
                let message = e.to_string();
                self.status.send_modify(|status| {
                    status.failures += 1;
                    status.pending = true;
                    status.last_error = Some(message);
                });
                Err(e)
            }
        }
    }
}
