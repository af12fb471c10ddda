//! # Loop Guard
//!
//! Detects a model stuck re-proposing near-identical actions. Watches the
//! canonical serialization of each proposal over a sliding window; when the
//! whole window is pairwise-similar above the threshold, the session halts
//! instead of burning turns on duplicates.

use std::collections::VecDeque;
use tracing::warn;

use crate::config::GuardConfig;
use crate::domain::action::Action;
use crate::domain::errors::LoopDetected;

/// Sliding-window repetition detector. One instance per session.
pub struct LoopGuard {
    window: VecDeque<String>,
    max_iterations: usize,
    pattern_threshold: f64,
    max_response_size: usize,
}

impl LoopGuard {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            window: VecDeque::with_capacity(config.max_iterations),
            max_iterations: config.max_iterations,
            pattern_threshold: config.pattern_threshold,
            max_response_size: config.max_response_size,
        }
    }

    /// Record one proposal. Returns `Err` when the window has filled with
    /// consecutive near-duplicates; the caller halts the session.
    pub fn observe(&mut self, action: &Action) -> Result<(), LoopDetected> {
        let fingerprint = action.fingerprint();
        self.window.push_back(fingerprint);
        while self.window.len() > self.max_iterations {
            self.window.pop_front();
        }

        if self.window.len() < self.max_iterations {
            return Ok(());
        }

        let looping = self
            .window
            .iter()
            .zip(self.window.iter().skip(1))
            .all(|(a, b)| similarity(a, b) >= self.pattern_threshold);

        if looping {
            warn!(
                window = self.max_iterations,
                threshold = self.pattern_threshold,
                "repeated near-identical proposals, halting"
            );
            return Err(LoopDetected {
                window: self.max_iterations,
                threshold: self.pattern_threshold,
            });
        }
        Ok(())
    }

    /// Cap stored result text. Returns the (possibly truncated) text and
    /// whether truncation happened; truncated text carries an explicit
    /// marker so readers never mistake it for the full output.
    pub fn clamp_response(&self, text: &str) -> (String, bool) {
        if text.chars().count() <= self.max_response_size {
            return (text.to_string(), false);
        }
        let mut clamped: String = text.chars().take(self.max_response_size).collect();
        clamped.push_str("... (truncated)");
        (clamped, true)
    }
}

/// Normalized similarity of two canonical serializations: 1.0 is identical,
/// 0.0 shares nothing. Levenshtein distance over chars, scaled by the longer
/// length.
fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

/// Two-row Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> LoopGuard {
        LoopGuard::new(&GuardConfig::default())
    }

    fn read(path: &str) -> Action {
        Action::ReadFile { path: path.into() }
    }

    #[test]
    fn five_identical_proposals_trip_the_guard() {
        let mut guard = guard();
        let action = read("src/main.rs");
        for _ in 0..4 {
            guard.observe(&action).expect("below window, no detection");
        }
        let err = guard.observe(&action).unwrap_err();
        assert_eq!(err.window, 5);
        assert_eq!(err.threshold, 0.8);
    }

    #[test]
    fn near_duplicates_also_trip_the_guard() {
        let mut guard = guard();
        // same action shape, one character of the path varying
        for i in 0..4 {
            guard
                .observe(&read(&format!("src/module_{}.rs", i)))
                .expect("below window");
        }
        let err = guard.observe(&read("src/module_4.rs")).unwrap_err();
        assert_eq!(err.window, 5);
    }

    #[test]
    fn varied_proposals_pass() {
        let mut guard = guard();
        let actions = [
            Action::ReadFile {
                path: "src/main.rs".into(),
            },
            Action::RunCommand {
                command: "cargo test".into(),
            },
            Action::ListDirectory {
                path: ".".into(),
                max_depth: 2,
            },
            Action::SearchCode {
                path: "src".into(),
                pattern: "fn main".into(),
            },
            Action::CreateFile {
                path: "notes.md".into(),
                content: "hi".into(),
            },
        ];
        for action in &actions {
            guard.observe(action).expect("distinct proposals never trip");
        }
    }

    #[test]
    fn window_slides_past_old_repeats() {
        let mut guard = guard();
        let repeated = read("src/main.rs");
        for _ in 0..4 {
            guard.observe(&repeated).expect("below window");
        }
        // a genuinely different action breaks the run
        guard
            .observe(&Action::RunCommand {
                command: "cargo build".into(),
            })
            .expect("distinct action resets the run");
    }

    #[test]
    fn similarity_is_symmetric_and_bounded() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        let s = similarity("kitten", "sitting");
        assert!(s > 0.0 && s < 1.0);
        assert_eq!(similarity("kitten", "sitting"), similarity("sitting", "kitten"));
    }

    #[test]
    fn clamp_marks_truncation() {
        let guard = LoopGuard::new(&GuardConfig {
            max_iterations: 5,
            pattern_threshold: 0.8,
            max_response_size: 10,
        });
        let (text, truncated) = guard.clamp_response("0123456789abcdef");
        assert!(truncated);
        assert_eq!(text, "0123456789... (truncated)");

        let (text, truncated) = guard.clamp_response("short");
        assert!(!truncated);
        assert_eq!(text, "short");
    }
}
