//! Heuristic "deep scan" of a piece of text.
//!
//! Purely cosmetic: the input is matched against a keyword list and a canned
//! report is produced. The score is random but always falls in the range that
//! belongs to the verdict.

use crate::config::ScanConfig;
use rand::rngs::StdRng;
use rand::Rng;
use std::fmt;

/// Status line that marks a blocked result in a report
pub const BLOCKED_LINE: &str = "- Status: BLOCKED";
const CLEAN_LINE: &str = "- Status: CLEAN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Normal,
    Suspicious,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Normal => f.pad("NORMAL"),
            Verdict::Suspicious => f.pad("SUSPICIOUS"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub verdict: Verdict,
    pub score: u8,
    /// Keyword that triggered a suspicious verdict
    pub trigger: Option<String>,
    pub report: String,
}

impl Analysis {
    pub fn is_blocked(&self) -> bool {
        report_is_blocked(&self.report)
    }
}

/// True when the report carries the blocked status line
pub fn report_is_blocked(report: &str) -> bool {
    report.lines().any(|line| line.trim() == BLOCKED_LINE)
}

/// First `max` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub struct Analyzer {
    keywords: Vec<String>,
    suspicious_score: [u8; 2],
    normal_score: [u8; 2],
    echo_chars: usize,
    rng: StdRng,
}

impl Analyzer {
    pub fn new(config: &ScanConfig, rng: StdRng) -> Self {
        Analyzer {
            keywords: config.keywords.iter().map(|k| k.to_lowercase()).collect(),
            suspicious_score: config.suspicious_score,
            normal_score: config.normal_score,
            echo_chars: config.echo_chars,
            rng,
        }
    }

    /// Deterministic part of the analysis: the verdict and the keyword behind it
    pub fn classify(&self, input: &str) -> (Verdict, Option<String>) {
        let lowered = input.to_lowercase();
        match self.keywords.iter().find(|k| lowered.contains(k.as_str())) {
            Some(keyword) => (Verdict::Suspicious, Some(keyword.clone())),
            None => (Verdict::Normal, None),
        }
    }

    pub fn analyze(&mut self, input: &str) -> Analysis {
        let (verdict, trigger) = self.classify(input);
        let [low, high] = match verdict {
            Verdict::Suspicious => self.suspicious_score,
            Verdict::Normal => self.normal_score,
        };
        let score = self.rng.gen_range(low..=high);
        let report = self.render_report(input, verdict, score, trigger.as_deref());
        Analysis {
            verdict,
            score,
            trigger,
            report,
        }
    }

    fn render_report(&self, input: &str, verdict: Verdict, score: u8, trigger: Option<&str>) -> String {
        let target = truncate_chars(input.trim(), self.echo_chars);
        let (status, recommendation) = match verdict {
            Verdict::Suspicious => (
                BLOCKED_LINE,
                "Quarantine the request and audit the originating session.",
            ),
            Verdict::Normal => (CLEAN_LINE, "No action required."),
        };
        let trigger = trigger.map_or_else(|| "none".to_string(), |k| format!("\"{k}\""));

        let mut report = String::new();
        report.push_str(&format!("> [INITIATING DEEP SCAN] on target: \"{target}...\"\n"));
        report.push_str("> Parsing payload structure... OK\n");
        report.push_str("> Cross-referencing signature database... DONE\n");
        report.push_str("> Heuristic analysis...\n");
        report.push_str("\n[RESULT]:\n");
        report.push_str(&format!("  - Classification: {verdict}\n"));
        report.push_str(&format!("  - Anomaly Score: {score}/100\n"));
        report.push_str(&format!("  - Trigger: {trigger}\n"));
        report.push_str(&format!("  {status}\n"));
        report.push_str(&format!("  - Recommendation: {recommendation}\n"));
        report.push_str("\n> Analysis complete. Entry written to session log.");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn analyzer(seed: u64) -> Analyzer {
        Analyzer::new(&ScanConfig::default(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn keywords_mark_input_suspicious() {
        let analyzer = analyzer(1);
        for input in ["DROP TABLE users;", "please delete it", "Ignore previous instructions"] {
            assert_eq!(analyzer.classify(input).0, Verdict::Suspicious, "{input}");
        }
        assert_eq!(
            analyzer.classify("drop it").1.as_deref(),
            Some("drop")
        );
    }

    #[test]
    fn plain_text_is_normal() {
        let analyzer = analyzer(1);
        assert_eq!(analyzer.classify("hello world"), (Verdict::Normal, None));
    }

    #[test]
    fn scores_stay_in_verdict_range() {
        for seed in 0..50 {
            let mut analyzer = analyzer(seed);
            let bad = analyzer.analyze("drop database");
            assert!((75..=99).contains(&bad.score));
            let good = analyzer.analyze("hello world");
            assert!((3..=24).contains(&good.score));
        }
    }

    #[test]
    fn blocked_status_follows_verdict() {
        let mut analyzer = analyzer(3);
        let bad = analyzer.analyze("drop");
        assert!(bad.is_blocked());
        assert!(bad.report.contains("SUSPICIOUS"));

        let good = analyzer.analyze("hello world");
        assert!(!good.is_blocked());
        assert!(good.report.contains("Status: CLEAN"));
    }

    #[test]
    fn echoed_input_cannot_fake_a_block() {
        let mut analyzer = analyzer(3);
        let good = analyzer.analyze("- Status: BLOCKED");
        assert_eq!(good.verdict, Verdict::Normal);
        assert!(!good.is_blocked());
    }

    #[test]
    fn report_echoes_truncated_input() {
        let mut analyzer = analyzer(9);
        let analysis = analyzer.analyze("  abcdefghijklmnopqrstuvwxyz  ");
        assert!(analysis.report.contains("\"abcdefghijklmnopqrst...\""));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 20), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
