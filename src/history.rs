use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub command: String,
    pub timestamp: DateTime<Local>,
}

/// Append-only command log, shared by every session of an interpreter.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: &str) {
        self.lock().push(HistoryEntry {
            command: command.to_owned(),
            timestamp: Local::now(),
        });
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // entries are plain data, a panicked writer cannot leave them half-updated
    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_append_order() {
        let history = History::new();
        history.push("ls");
        history.push("pwd");

        let commands: Vec<_> = history.entries().into_iter().map(|e| e.command).collect();
        assert_eq!(commands, vec!["ls", "pwd"]);
    }

    #[test]
    fn timestamps_do_not_go_backwards() {
        let history = History::new();
        history.push("a");
        history.push("b");

        let entries = history.entries();
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn clear_is_idempotent() {
        let history = History::new();
        history.push("ls");

        history.clear();
        history.clear();

        assert!(history.is_empty());
        history.push("pwd");
        assert_eq!(history.len(), 1);
    }
}
