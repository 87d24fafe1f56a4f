//! Views composed from several live twins.
//!
//! [`Engine::follow`] keeps one twin (the source) live and derives from each
//! of its states the set of other twins it points at. Every target gets its
//! own subscription for as long as the source keeps pointing at it; targets
//! the source stops naming are cancelled. The combined view is republished
//! whenever the source or any followed target changes.

use crate::engine::{Engine, TwinHandle};
use crate::error::Result;
use crate::fold::Fold;
use crate::log::EventLog;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{oneshot, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

impl<L: EventLog> Engine<L> {
    /// Follow the twins that `targets` derives from each state of `source`.
    ///
    /// `combine` receives the target states in the order `targets` listed
    /// them, duplicates removed. Must be called from within a tokio runtime.
    pub fn follow<S, E, M, C, T>(&self, source: S, targets: M, combine: C) -> Result<TwinHandle<T>>
    where
        S: Fold,
        E: Fold,
        M: Fn(&S::State) -> Vec<E> + Send + 'static,
        C: Fn(Vec<E::State>) -> T + Send + 'static,
        T: Clone + PartialEq + Send + Sync + 'static,
    {
        let twin = format!("{}:{}/follow", source.name(), source.id());
        let source = self.subscribe(source)?;

        let mut runner: FollowRunner<L, S, E, M, C> = FollowRunner {
            twin: twin.clone(),
            engine: self.clone(),
            source,
            targets,
            combine,
            order: Vec::new(),
            followed: BTreeMap::new(),
            notify: Arc::new(Notify::new()),
        };
        // Nothing is followed yet, so nothing can be dropped here.
        let initial = runner.source.state();
        runner.retarget(&initial);
        info!(twin = %twin, targets = runner.order.len(), "Following related twins");

        let (state_tx, state_rx) = watch::channel(runner.view());
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(runner.run(state_tx, cancel_rx));

        Ok(TwinHandle::new(twin, state_rx, cancel_tx, task))
    }
}

struct Followed<S> {
    handle: TwinHandle<S>,
    forward: JoinHandle<()>,
}

struct FollowRunner<L: EventLog, S: Fold, E: Fold, M, C> {
    twin: String,
    engine: Engine<L>,
    source: TwinHandle<S::State>,
    targets: M,
    combine: C,
    order: Vec<String>,
    followed: BTreeMap<String, Followed<E::State>>,
    notify: Arc<Notify>,
}

impl<L, S, E, M, C, T> FollowRunner<L, S, E, M, C>
where
    L: EventLog,
    S: Fold,
    E: Fold,
    M: Fn(&S::State) -> Vec<E> + Send + 'static,
    C: Fn(Vec<E::State>) -> T + Send + 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    async fn run(mut self, state_tx: watch::Sender<T>, mut cancel_rx: oneshot::Receiver<()>) {
        loop {
            let source = tokio::select! {
                biased;
                _ = &mut cancel_rx => break,
                changed = self.source.changed() => Some(changed),
                _ = self.notify.notified() => None,
            };

            if let Some(changed) = source {
                match changed {
                    Ok(state) => {
                        for handle in self.retarget(&state) {
                            stop(handle).await;
                        }
                    }
                    Err(e) => {
                        warn!(twin = %self.twin, error = %e, "Source twin ended");
                        break;
                    }
                }
            }

            let next = self.view();
            state_tx.send_if_modified(move |current| {
                if *current != next {
                    *current = next;
                    true
                } else {
                    false
                }
            });
        }

        stop(self.source).await;
        for (_, followed) in self.followed {
            followed.forward.abort();
            stop(followed.handle).await;
        }
        debug!(twin = %self.twin, "Follow stopped");
    }

    /// Subscribe to newly named targets and hand back the ones no longer named.
    fn retarget(&mut self, state: &S::State) -> Vec<TwinHandle<E::State>> {
        let mut order = Vec::new();
        let mut named = BTreeSet::new();

        for target in (self.targets)(state) {
            let key = format!("{}:{}", target.name(), target.id());
            if named.contains(&key) {
                continue;
            }
            if !self.followed.contains_key(&key) {
                match self.engine.subscribe(target) {
                    Ok(handle) => {
                        let forward = self.forward(&handle);
                        self.followed.insert(key.clone(), Followed { handle, forward });
                    }
                    Err(e) => {
                        warn!(twin = %self.twin, target = %key, error = %e, "Could not follow target");
                        continue;
                    }
                }
            }
            named.insert(key.clone());
            order.push(key);
        }

        let stale: Vec<String> = self
            .followed
            .keys()
            .filter(|key| !named.contains(*key))
            .cloned()
            .collect();
        let dropped: Vec<_> = stale
            .iter()
            .filter_map(|key| self.followed.remove(key))
            .map(|followed| {
                followed.forward.abort();
                followed.handle
            })
            .collect();

        debug!(
            twin = %self.twin,
            following = order.len(),
            dropped = dropped.len(),
            "Retargeted"
        );
        self.order = order;
        dropped
    }

    /// Wake the runner whenever `handle` publishes.
    fn forward(&self, handle: &TwinHandle<E::State>) -> JoinHandle<()> {
        let mut state = handle.receiver();
        let notify = Arc::clone(&self.notify);
        tokio::spawn(async move {
            while state.changed().await.is_ok() {
                notify.notify_one();
            }
        })
    }

    fn view(&self) -> T {
        let states = self
            .order
            .iter()
            .filter_map(|key| self.followed.get(key))
            .map(|followed| followed.handle.state())
            .collect();
        (self.combine)(states)
    }
}

async fn stop<S: Clone>(handle: TwinHandle<S>) {
    let twin = handle.twin().to_string();
    if let Err(e) = handle.cancel().await {
        debug!(twin = %twin, error = %e, "Twin ended before cancel");
    }
}
