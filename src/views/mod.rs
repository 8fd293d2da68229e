//! Per-view state controllers.
//!
//! Each view owns its state behind a mutex and talks to the server through
//! a shared [`Backend`](crate::api::Backend). Methods take `&self`, so a
//! view can be driven from several tasks at once; the lock is never held
//! across an await. Every load carries a generation number, and a result
//! whose generation is no longer current (a newer load started, or the
//! view was disposed) is dropped instead of applied.

mod add;
mod detail;
mod list;
mod recommendations;
mod statistics;

pub use add::{AddContentState, AddContentView, ContentDraft};
pub use detail::{DeleteOutcome, DetailPhase, DetailState, DetailView, Mutation};
pub use list::{ContentFilter, FilterChange, FilterStrategy, ListKind, ListState, ListView};
pub use recommendations::{ImportOutcome, RecommendationsState, RecommendationsView};
pub use statistics::{StatisticsState, StatisticsView};

use crate::error::{AppError, Result};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Success(msg) | Notice::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

/// Interactive yes/no confirmation for destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Keys of actions whose write is still outstanding.
#[derive(Debug, Clone)]
pub(crate) struct InFlight<K: Eq + Hash>(HashSet<K>);

impl<K: Eq + Hash> Default for InFlight<K> {
    fn default() -> Self {
        Self(HashSet::new())
    }
}

impl<K: Eq + Hash + Clone + Debug> InFlight<K> {
    /// Claim `key`, failing if the same action is already running.
    pub(crate) fn begin(&mut self, key: K) -> Result<()> {
        if self.0.contains(&key) {
            return Err(AppError::Busy(format!("{:?} already in progress", key)));
        }
        self.0.insert(key);
        Ok(())
    }

    pub(crate) fn finish(&mut self, key: &K) {
        self.0.remove(key);
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.0.contains(key)
    }
}

/// Lock view state; a panic in another holder does not invalidate it.
pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
