//! Twin engine: live and one-shot folds over the event log.
//!
//! # Subscription model
//!
//! Each subscription runs on its own tokio task and owns its accumulator.
//! The task:
//!
//! 1. registers on the log's change feed, then folds a snapshot of every
//!    matching event
//! 2. skips feed entries the snapshot already covers (by log version)
//! 3. applies a matching event directly when its key sorts after the last
//!    folded key
//! 4. refolds from a fresh snapshot when the event sorts before it, or when
//!    the feed lagged and entries may have been lost
//!
//! Only states that differ from the last published one are published.
//! Cancellation stops the task and waits for it, so no fold step runs after
//! [`TwinHandle::cancel`] returns.

use crate::error::{EngineError, Result};
use crate::event::EventKey;
use crate::fold::{apply_event, fold_events, Fold};
use crate::log::{EventLog, LogChange};
use crate::tag::{TagExpr, TagSet};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Folds and emits against one event log.
///
/// The log is passed in explicitly; there is no process-wide registry of
/// twins. Cloning an engine shares the log.
pub struct Engine<L: EventLog> {
    log: Arc<L>,
}

impl<L: EventLog> Clone for Engine<L> {
    fn clone(&self) -> Self {
        Self {
            log: Arc::clone(&self.log),
        }
    }
}

impl<L: EventLog> Engine<L> {
    /// Create an engine over `log`.
    pub fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// The underlying log.
    pub fn log(&self) -> &L {
        &self.log
    }

    /// Append an event. Returns once the log accepted it; folds observe it
    /// asynchronously.
    pub fn emit<P: Serialize>(&self, tags: TagSet, payload: &P) -> Result<EventKey> {
        let payload = serde_json::to_value(payload).map_err(crate::error::LogError::from)?;
        Ok(self.log.append(tags, payload)?)
    }

    /// Fold the current contents of the log without subscribing.
    pub fn current_state<F: Fold>(&self, fold: &F) -> Result<F::State> {
        let snapshot = self.log.snapshot(&fold.selector())?;
        Ok(fold_events(fold, &snapshot.events))
    }

    /// Start a live fold. Must be called from within a tokio runtime.
    pub fn subscribe<F: Fold>(&self, fold: F) -> Result<TwinHandle<F::State>> {
        let twin = format!("{}:{}", fold.name(), fold.id());
        let selector = fold.selector();

        // Register on the feed before reading so nothing falls in between.
        let changes = self.log.watch();
        let snapshot = self.log.snapshot(&selector)?;
        let state = fold_events(&fold, &snapshot.events);
        let cursor = Cursor {
            version: snapshot.version,
            last_key: snapshot.events.last().map(|e| e.meta.key.clone()),
        };

        info!(
            twin = %twin,
            selector = %selector,
            events = snapshot.events.len(),
            "Twin subscribed"
        );

        let (state_tx, state_rx) = watch::channel(state.clone());
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let runner = TwinRunner {
            twin: twin.clone(),
            fold,
            selector,
            log: Arc::clone(&self.log),
            state,
            cursor,
        };
        let task = tokio::spawn(runner.run(changes, state_tx, cancel_rx));

        Ok(TwinHandle::new(twin, state_rx, cancel_tx, task))
    }
}

/// Position of a subscription in the log.
#[derive(Debug, Clone)]
struct Cursor {
    version: u64,
    last_key: Option<EventKey>,
}

struct TwinRunner<F: Fold, L: EventLog> {
    twin: String,
    fold: F,
    selector: TagExpr,
    log: Arc<L>,
    state: F::State,
    cursor: Cursor,
}

impl<F: Fold, L: EventLog> TwinRunner<F, L> {
    async fn run(
        mut self,
        mut changes: broadcast::Receiver<LogChange>,
        state_tx: watch::Sender<F::State>,
        mut cancel_rx: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;
                _ = &mut cancel_rx => break,
                change = changes.recv() => match change {
                    Ok(change) => self.on_change(change),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(twin = %self.twin, skipped, "Change feed lagged, refolding");
                        self.refold();
                    }
                    Err(RecvError::Closed) => break,
                },
            }

            let next = &self.state;
            state_tx.send_if_modified(|current| {
                if current != next {
                    *current = next.clone();
                    true
                } else {
                    false
                }
            });
        }
        debug!(twin = %self.twin, "Twin stopped");
    }

    fn on_change(&mut self, change: LogChange) {
        if change.version <= self.cursor.version {
            return;
        }
        if !self.selector.matches(&change.event.meta.tags) {
            return;
        }

        let key = &change.event.meta.key;
        match &self.cursor.last_key {
            Some(last) if key <= last => {
                debug!(twin = %self.twin, key = %key, last = %last, "Event behind folded head");
                self.refold();
            }
            _ => {
                let state = std::mem::replace(&mut self.state, self.fold.initial());
                self.state = apply_event(&self.fold, state, &change.event);
                self.cursor.version = change.version;
                self.cursor.last_key = Some(key.clone());
            }
        }
    }

    fn refold(&mut self) {
        match self.log.snapshot(&self.selector) {
            Ok(snapshot) => {
                self.state = fold_events(&self.fold, &snapshot.events);
                self.cursor = Cursor {
                    version: snapshot.version,
                    last_key: snapshot.events.last().map(|e| e.meta.key.clone()),
                };
                debug!(
                    twin = %self.twin,
                    events = snapshot.events.len(),
                    version = snapshot.version,
                    "Refolded twin"
                );
            }
            Err(e) => {
                warn!(twin = %self.twin, error = %e, "Refold failed, keeping last state");
            }
        }
    }
}

/// Handle to a live fold.
///
/// Dropping the handle aborts the fold task; [`TwinHandle::cancel`] stops it
/// and waits for it to finish.
#[derive(Debug)]
pub struct TwinHandle<S> {
    twin: String,
    state: watch::Receiver<S>,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl<S> TwinHandle<S> {
    pub(crate) fn new(
        twin: String,
        state: watch::Receiver<S>,
        cancel: oneshot::Sender<()>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            twin,
            state,
            cancel: Some(cancel),
            task: Some(task),
        }
    }
}

impl<S: Clone> TwinHandle<S> {
    /// Twin name and id.
    pub fn twin(&self) -> &str {
        &self.twin
    }

    /// The most recently published state.
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Wait for the next published state.
    pub async fn changed(&mut self) -> Result<S> {
        self.state
            .changed()
            .await
            .map_err(|_| EngineError::TwinTerminated {
                twin: self.twin.clone(),
            })?;
        Ok(self.state.borrow_and_update().clone())
    }

    /// Wait until the published state satisfies `pred`.
    pub async fn wait_for(&mut self, pred: impl FnMut(&S) -> bool) -> Result<S> {
        let state = self
            .state
            .wait_for(pred)
            .await
            .map_err(|_| EngineError::TwinTerminated {
                twin: self.twin.clone(),
            })?;
        Ok(state.clone())
    }

    /// A receiver observing the same published states.
    pub fn receiver(&self) -> watch::Receiver<S> {
        self.state.clone()
    }

    /// Stop the fold and wait until its task has exited.
    pub async fn cancel(mut self) -> Result<()> {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.map_err(|_| EngineError::TwinTerminated {
                twin: self.twin.clone(),
            })?;
        }
        debug!(twin = %self.twin, "Twin cancelled");
        Ok(())
    }
}

impl<S> Drop for TwinHandle<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
