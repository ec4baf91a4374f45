//! World event log
//!
//! Bounded in-memory record of notable world events (spawn failures, area
//! transitions, skipped definitions). The core never prints; drivers read
//! entries out of this log for display.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of entries to keep in the log
const MAX_LOG_ENTRIES: usize = 256;

/// Category of a log entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogCategory {
    /// Spawn lifecycle: factory refusals, re-armed slots
    Spawn,
    /// Player area transitions
    Transition,
    /// Content/configuration problems (skipped definitions)
    Config,
    /// Terrain regeneration
    Terrain,
}

impl LogCategory {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            LogCategory::Spawn => "SPN",
            LogCategory::Transition => "TRN",
            LogCategory::Config => "CFG",
            LogCategory::Terrain => "TER",
        }
    }
}

/// A single log entry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    /// Tick when this happened
    pub tick: u64,
    /// Category of event
    pub category: LogCategory,
    /// Short description
    pub message: String,
}

/// Bounded log of world events; oldest entries are dropped past capacity.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WorldLog {
    entries: VecDeque<LogEntry>,
}

impl WorldLog {
    pub fn new() -> Self {
        WorldLog {
            entries: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    /// Record an event, dropping the oldest entry if at capacity.
    pub fn push(&mut self, tick: u64, category: LogCategory, message: impl Into<String>) {
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            tick,
            category,
            message: message.into(),
        });
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_bounded() {
        let mut log = WorldLog::new();
        for i in 0..(MAX_LOG_ENTRIES as u64 + 50) {
            log.push(i, LogCategory::Spawn, format!("event {}", i));
        }

        assert_eq!(log.len(), MAX_LOG_ENTRIES);
        // Oldest entries were dropped
        assert_eq!(log.iter().next().unwrap().tick, 50);
    }

    #[test]
    fn test_recent_returns_tail() {
        let mut log = WorldLog::new();
        for i in 0..10u64 {
            log.push(i, LogCategory::Transition, "move");
        }

        let ticks: Vec<u64> = log.recent(3).map(|e| e.tick).collect();
        assert_eq!(ticks, vec![7, 8, 9]);
    }
}
