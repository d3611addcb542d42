//! Deduplicated user-facing warnings.
//!
//! A [`WarningLog`] remembers which messages it has already emitted and
//! forwards only the first occurrence of each to `tracing::warn!`.

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Registry of warnings already emitted.
#[derive(Debug, Default)]
pub struct WarningLog {
    seen: Mutex<HashSet<String>>,
}

impl WarningLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide log used by [`GGPlot::build`](super::GGPlot::build).
    pub fn global() -> &'static WarningLog {
        static GLOBAL: OnceLock<WarningLog> = OnceLock::new();
        GLOBAL.get_or_init(WarningLog::new)
    }

    /// Emit `message` unless it was emitted before. Returns whether it was
    /// emitted.
    pub fn warn_once(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        if seen.contains(&message) {
            return false;
        }
        tracing::warn!(target: "trueno_gg", "{message}");
        seen.insert(message);
        true
    }

    /// Whether `message` has been emitted.
    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).contains(message)
    }

    /// Number of distinct messages emitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
