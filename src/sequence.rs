//! Scripted scan flow: IDLE -> SCANNING -> REPORT_REVEAL -> IDLE.
//!
//! Every delayed step is a scheduled task tagged with the generation of the
//! scan that queued it. Starting a new scan bumps the generation, so tasks
//! left over from an interrupted run are dropped when they come due.

use crate::analysis::{truncate_chars, Analysis, Analyzer};
use crate::config::ScanConfig;
use crate::feed::{Category, LogEntry, Severity};
use crate::scheduler::Scheduler;
use rand::rngs::StdRng;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Revealing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Complete,
    RevealTick,
    LogRequest,
    LogResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Task {
    generation: u64,
    step: Step,
}

/// What the surrounding UI has to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Latency elapsed; the control is usable again and the reveal begins
    ReportReady,
    /// The whole report is on screen
    RevealFinished,
    LogAppended(LogEntry),
}

pub struct ScanController {
    config: ScanConfig,
    analyzer: Analyzer,
    scheduler: Scheduler<Task>,
    generation: u64,
    phase: ScanPhase,
    input: String,
    analysis: Option<Analysis>,
    revealed: usize,
    display: String,
}

impl ScanController {
    pub fn new(config: ScanConfig, rng: StdRng) -> Self {
        let analyzer = Analyzer::new(&config, rng);
        ScanController {
            config,
            analyzer,
            scheduler: Scheduler::new(),
            generation: 0,
            phase: ScanPhase::Idle,
            input: String::new(),
            analysis: None,
            revealed: 0,
            display: String::new(),
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// The trigger is disabled while a scan is in flight
    pub fn is_busy(&self) -> bool {
        self.phase == ScanPhase::Scanning
    }

    /// Text revealed so far
    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    /// Last `lines` lines of the display, so the newest text stays in view
    pub fn display_tail(&self, lines: usize) -> Vec<&str> {
        let all: Vec<&str> = self.display.split('\n').collect();
        let start = all.len().saturating_sub(lines);
        all[start..].to_vec()
    }

    /// Starts a scan at `now` (ms).
    ///
    /// Blank input and triggers while the control is busy are ignored and
    /// return `false`. A trigger during the reveal abandons it and starts over.
    pub fn trigger(&mut self, input: &str, now: u64) -> bool {
        if input.trim().is_empty() {
            debug!("ignoring blank scan input");
            return false;
        }
        if self.is_busy() {
            debug!("scan already running");
            return false;
        }
        if self.phase == ScanPhase::Revealing {
            info!(generation = self.generation, "restarting scan, abandoning reveal");
        }

        self.generation += 1;
        self.phase = ScanPhase::Scanning;
        self.input = input.to_string();
        self.schedule(now + self.config.latency_ms, Step::Complete);
        info!(generation = self.generation, "scan started");
        true
    }

    /// Runs every step due at `now` and reports what happened
    pub fn advance(&mut self, now: u64) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Some((at, task)) = self.scheduler.pop_due(now) {
            if task.generation != self.generation {
                debug!(stale = task.generation, current = self.generation, "dropping stale task");
                continue;
            }
            match task.step {
                Step::Complete => {
                    let analysis = self.analyzer.analyze(&self.input);
                    info!(verdict = %analysis.verdict, score = analysis.score, "report ready");
                    self.analysis = Some(analysis);
                    self.display.clear();
                    self.revealed = 0;
                    self.phase = ScanPhase::Revealing;
                    self.schedule(at + self.config.tick_ms, Step::RevealTick);
                    self.schedule(at + self.config.log_delay_ms, Step::LogRequest);
                    events.push(ScanEvent::ReportReady);
                }
                Step::RevealTick => {
                    if self.reveal_next() {
                        self.schedule(at + self.config.tick_ms, Step::RevealTick);
                    } else {
                        self.phase = ScanPhase::Idle;
                        debug!("reveal finished");
                        events.push(ScanEvent::RevealFinished);
                    }
                }
                Step::LogRequest => {
                    let detail = format!(
                        "Scan requested: \"{}\"",
                        truncate_chars(self.input.trim(), self.config.log_chars)
                    );
                    events.push(ScanEvent::LogAppended(LogEntry::now(
                        Category::UserScan,
                        detail,
                        Severity::Info,
                    )));
                    self.schedule(at + self.config.response_delay_ms, Step::LogResponse);
                }
                Step::LogResponse => {
                    if let Some(entry) = self.response_entry() {
                        events.push(ScanEvent::LogAppended(entry));
                    }
                }
            }
        }
        events
    }

    fn schedule(&mut self, at: u64, step: Step) {
        self.scheduler.schedule(
            at,
            Task {
                generation: self.generation,
                step,
            },
        );
    }

    /// Appends the next character; `false` once nothing is left
    fn reveal_next(&mut self) -> bool {
        let Some(analysis) = &self.analysis else {
            return false;
        };
        match analysis.report[self.revealed..].chars().next() {
            Some(ch) => {
                self.display.push(ch);
                self.revealed += ch.len_utf8();
                self.revealed < analysis.report.len()
            }
            None => false,
        }
    }

    fn response_entry(&self) -> Option<LogEntry> {
        let analysis = self.analysis.as_ref()?;
        let entry = if analysis.is_blocked() {
            LogEntry::now(
                Category::SysResponse,
                format!("Threat blocked, anomaly score {}/100", analysis.score),
                Severity::High,
            )
        } else {
            LogEntry::now(
                Category::SysResponse,
                format!("Request cleared, anomaly score {}/100", analysis.score),
                Severity::Low,
            )
        };
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn controller() -> ScanController {
        ScanController::new(ScanConfig::default(), StdRng::seed_from_u64(11))
    }

    fn logs(events: &[ScanEvent]) -> Vec<&LogEntry> {
        events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::LogAppended(entry) => Some(entry),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut scan = controller();
        assert!(!scan.trigger("", 0));
        assert!(!scan.trigger("   \t\n", 0));
        assert_eq!(scan.phase(), ScanPhase::Idle);
        assert!(scan.advance(100_000).is_empty());
    }

    #[test]
    fn report_waits_for_latency() {
        let mut scan = controller();
        assert!(scan.trigger("hello world", 1000));
        assert!(scan.is_busy());
        assert!(scan.advance(2999).is_empty());
        assert_eq!(scan.advance(3000), vec![ScanEvent::ReportReady]);
        assert_eq!(scan.phase(), ScanPhase::Revealing);
        assert!(!scan.is_busy());
    }

    #[test]
    fn busy_control_rejects_trigger() {
        let mut scan = controller();
        assert!(scan.trigger("first", 0));
        assert!(!scan.trigger("second", 10));
        scan.advance(2000);
        assert!(scan.analysis().is_some());
        assert!(scan.display().is_empty());
    }

    #[test]
    fn reveals_one_character_per_tick() {
        let mut scan = controller();
        scan.trigger("hello world", 0);
        scan.advance(2000);
        scan.advance(2030);
        assert_eq!(scan.display().chars().count(), 1);
        scan.advance(2090);
        assert_eq!(scan.display().chars().count(), 3);

        let report = scan.analysis().map(|a| a.report.clone()).unwrap_or_default();
        let finish = 2000 + 30 * report.chars().count() as u64;
        let events = scan.advance(finish);
        assert!(events.contains(&ScanEvent::RevealFinished));
        assert_eq!(scan.display(), report);
        assert_eq!(scan.phase(), ScanPhase::Idle);
    }

    #[test]
    fn suspicious_scan_logs_high_severity() {
        let mut scan = controller();
        scan.trigger("drop table accounts", 0);
        let events = scan.advance(10_000);
        let entries = logs(&events);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].category, Category::UserScan);
        assert_eq!(entries[0].severity, Severity::Info);
        assert_eq!(entries[1].category, Category::SysResponse);
        assert_eq!(entries[1].severity, Severity::High);
        assert!(scan.analysis().is_some_and(|a| a.is_blocked()));
    }

    #[test]
    fn normal_scan_logs_low_severity() {
        let mut scan = controller();
        scan.trigger("hello world", 0);
        let events = scan.advance(10_000);
        let entries = logs(&events);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].severity, Severity::Low);
        assert!(scan.analysis().is_some_and(|a| !a.is_blocked()));
    }

    #[test]
    fn log_entries_follow_reveal_start() {
        let mut scan = controller();
        scan.trigger("hello world", 0);
        assert!(logs(&scan.advance(2599)).is_empty());
        let first = scan.advance(2600);
        assert_eq!(logs(&first).len(), 1);
        assert!(logs(&scan.advance(2999)).is_empty());
        assert_eq!(logs(&scan.advance(3000)).len(), 1);
    }

    #[test]
    fn request_log_is_truncated() {
        let mut scan = controller();
        let long = "x".repeat(100);
        scan.trigger(&long, 0);
        let events = scan.advance(2600);
        let entries = logs(&events);
        assert_eq!(entries[0].detail, format!("Scan requested: \"{}\"", "x".repeat(32)));
    }

    #[test]
    fn retrigger_during_reveal_cancels_old_run() {
        let mut scan = controller();
        scan.trigger("hello world", 0);
        scan.advance(2100);
        assert_eq!(scan.phase(), ScanPhase::Revealing);

        assert!(scan.trigger("drop everything", 2100));
        assert_eq!(scan.phase(), ScanPhase::Scanning);

        // Nothing from the first run may surface
        let events = scan.advance(4099);
        assert!(events.is_empty());

        let events = scan.advance(4100);
        assert_eq!(events, vec![ScanEvent::ReportReady]);
        assert!(scan.display().is_empty());

        let events = scan.advance(20_000);
        let entries = logs(&events);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].detail.contains("drop everything"));
        assert_eq!(entries[1].severity, Severity::High);
    }

    #[test]
    fn tail_keeps_latest_lines() {
        let mut scan = controller();
        scan.trigger("hello world", 0);
        scan.advance(100_000);
        let tail = scan.display_tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[1], "> Analysis complete. Entry written to session log.");
    }
}
