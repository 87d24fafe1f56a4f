//! Fold (twin) definitions.
//!
//! A [`Fold`] describes how one piece of state is derived from the log: which
//! events it observes, what it starts from, and a pure transition function.
//! The same [`fold_events`] replay is used for one-shot reads, for the
//! initial catch-up of a live subscription and for refolds after an
//! out-of-order insertion, so there is no separate "replay" code path.

use crate::event::{LogEvent, Metadata};
use crate::tag::TagExpr;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{trace, warn};

/// A deterministic reducer over a tag-selected event stream.
///
/// `apply` must be total and pure: the same state and event always yield the
/// same result. Events that make no sense in the current state are answered
/// with the unchanged state (and a diagnostic), never with an error.
pub trait Fold: Send + Sync + 'static {
    /// Derived state
    type State: Clone + Debug + PartialEq + Send + Sync + 'static;
    /// Event family this fold decodes payloads into
    type Event: DeserializeOwned + Debug + Send;

    /// Fold kind, used in diagnostics.
    fn name(&self) -> &str;

    /// Entity id this instance folds, used in diagnostics.
    fn id(&self) -> &str;

    /// Selector for the events this fold observes.
    fn selector(&self) -> TagExpr;

    /// State before any event has been folded.
    fn initial(&self) -> Self::State;

    /// Transition function.
    fn apply(&self, state: Self::State, event: Self::Event, meta: &Metadata) -> Self::State;
}

/// Apply one logged event, rejecting payloads that do not decode.
pub fn apply_event<F: Fold>(fold: &F, state: F::State, event: &LogEvent) -> F::State {
    match event.decode::<F::Event>() {
        Ok(decoded) => {
            trace!(
                twin = fold.name(),
                id = fold.id(),
                key = %event.meta.key,
                event = ?decoded,
                "Folding event"
            );
            fold.apply(state, decoded, &event.meta)
        }
        Err(e) => {
            warn!(
                twin = fold.name(),
                id = fold.id(),
                key = %event.meta.key,
                event_type = ?event.event_type(),
                error = %e,
                "Rejected undecodable event"
            );
            state
        }
    }
}

/// Fold `events` (already in log order) from the initial state.
pub fn fold_events<'a, F, I>(fold: &F, events: I) -> F::State
where
    F: Fold,
    I: IntoIterator<Item = &'a LogEvent>,
{
    events
        .into_iter()
        .fold(fold.initial(), |state, event| apply_event(fold, state, event))
}
