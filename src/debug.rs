//! Per-attempt diagnostics.
//!
//! The executor reports every attempt outcome to an optional
//! [`AttemptObserver`] installed on the client. [`LastAttempt`] keeps only the
//! most recent snapshot, which is usually all a failing test needs to print.

use std::sync::{Arc, Mutex};

/// What a single attempt produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Response {
        status: u16,
        headers: Vec<(String, String)>,
    },
    Error(String),
}

/// Diagnostic record of one attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugSnapshot {
    pub url: String,
    pub attempt: u32,
    pub outcome: SnapshotOutcome,
}

impl DebugSnapshot {
    pub fn status(&self) -> Option<u16> {
        match &self.outcome {
            SnapshotOutcome::Response { status, .. } => Some(*status),
            SnapshotOutcome::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            SnapshotOutcome::Error(message) => Some(message),
            SnapshotOutcome::Response { .. } => None,
        }
    }
}

/// Receives a snapshot after every attempt.
pub trait AttemptObserver: Send + Sync {
    fn on_attempt(&self, snapshot: &DebugSnapshot);
}

impl<F> AttemptObserver for F
where
    F: Fn(&DebugSnapshot) + Send + Sync,
{
    fn on_attempt(&self, snapshot: &DebugSnapshot) {
        self(snapshot)
    }
}

/// Observer that retains the latest snapshot.
///
/// Shared between concurrent calls it is last-write-wins.
#[derive(Clone, Debug, Default)]
pub struct LastAttempt {
    inner: Arc<Mutex<Option<DebugSnapshot>>>,
}

impl LastAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<DebugSnapshot> {
        self.inner
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl AttemptObserver for LastAttempt {
    fn on_attempt(&self, snapshot: &DebugSnapshot) {
        let mut slot = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(snapshot.clone());
    }
}
