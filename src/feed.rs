//! Session log feed: newest-first entries plus a running counter

use chrono::Local;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    UserScan,
    SysResponse,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::UserScan => f.pad("USER_SCAN"),
            Category::SysResponse => f.pad("SYS_RESPONSE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Info,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => f.pad("LOW"),
            Severity::Info => f.pad("INFO"),
            Severity::High => f.pad("HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Wall clock time as HH:MM:SS
    pub timestamp: String,
    pub category: Category,
    pub detail: String,
    pub severity: Severity,
}

impl LogEntry {
    /// Creates an entry stamped with the current local time
    pub fn now(category: Category, detail: impl Into<String>, severity: Severity) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            category,
            detail: detail.into(),
            severity,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<12} {:<4} {}",
            self.timestamp, self.category, self.severity, self.detail
        )
    }
}

/// Append-only, unbounded for the lifetime of the session
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    entries: VecDeque<LogEntry>,
    counter: u64,
}

impl LogFeed {
    pub fn new(initial_count: u64) -> Self {
        LogFeed {
            entries: VecDeque::new(),
            counter: initial_count,
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        debug!(category = %entry.category, severity = %entry.severity, "log entry appended");
        self.entries.push_front(entry);
        self.counter += 1;
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value shown in the counter display
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_clock_time() {
        let entry = LogEntry::now(Category::UserScan, "x", Severity::Info);
        assert_eq!(entry.timestamp.len(), 8);
        assert_eq!(entry.timestamp.as_bytes()[2], b':');
        assert_eq!(entry.timestamp.as_bytes()[5], b':');
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut feed = LogFeed::new(40);
        for i in 0..5 {
            feed.append(LogEntry::now(Category::SysResponse, format!("entry {i}"), Severity::Low));
        }
        let details: Vec<_> = feed.entries().map(|e| e.detail.as_str()).collect();
        assert_eq!(details, ["entry 4", "entry 3", "entry 2", "entry 1", "entry 0"]);
        assert_eq!(feed.len(), 5);
        assert_eq!(feed.counter(), 45);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut feed = LogFeed::new(0);
        let entry = LogEntry::now(Category::UserScan, "same", Severity::Info);
        feed.append(entry.clone());
        feed.append(entry);
        assert_eq!(feed.len(), 2);
        assert_eq!(feed.counter(), 2);
    }

    #[test]
    fn display_shows_labels() {
        let entry = LogEntry {
            timestamp: "12:00:01".into(),
            category: Category::SysResponse,
            detail: "Threat blocked".into(),
            severity: Severity::High,
        };
        let line = entry.to_string();
        assert!(line.starts_with("[12:00:01] SYS_RESPONSE"));
        assert!(line.contains("HIGH"));
        assert!(line.ends_with("Threat blocked"));
    }
}
