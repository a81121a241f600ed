// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Outcome report
//!
//! Terminal per-step summary built after the last step runs or the pipeline
//! halts. Created fresh per invocation, rendered, discarded.

use colored::Colorize;

use super::step::StepOutcome;
use crate::errors::FailureKind;

/// Pipeline-level terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    Idle,
    Running,
    Completed,
    HaltedOnFailure,
}

/// Diagnostic attached to the halting step.
#[derive(Debug, Clone)]
pub struct HaltDiagnostic {
    pub step: String,
    pub kind: FailureKind,
    pub detail: String,
    pub attempts: u32,
}

/// Ordered per-step outcome summary for one run.
#[derive(Debug)]
pub struct OutcomeReport {
    pub status: PipelineStatus,
    /// (step name, label, outcome), in pipeline order.
    pub rows: Vec<(String, String, StepOutcome)>,
    pub halt: Option<HaltDiagnostic>,
}

impl OutcomeReport {
    pub fn passed(&self) -> usize {
        self.count(StepOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(StepOutcome::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(StepOutcome::Skipped)
    }

    fn count(&self, outcome: StepOutcome) -> usize {
        self.rows.iter().filter(|(_, _, o)| *o == outcome).count()
    }

    pub fn success(&self) -> bool {
        self.status == PipelineStatus::Completed
    }

    /// Suggested re-invocation for a halted run.
    pub fn resume_suggestion(&self, target: &str) -> Option<String> {
        self.halt
            .as_ref()
            .map(|h| format!("shipflow ship {} --resume-from {}", target, h.step))
    }

    /// Print the summary table and halt diagnostic.
    pub fn render(&self, target: &str) {
        println!();
        println!("{}", "Shipping report".bold());
        println!("{}", "═".repeat(50));

        for (name, label, outcome) in &self.rows {
            let mark = match outcome {
                StepOutcome::Passed => "✓".green(),
                StepOutcome::Failed => "✗".red(),
                StepOutcome::Skipped => "○".dimmed(),
                StepOutcome::Pending | StepOutcome::Running => "·".dimmed(),
            };
            println!("  {} {:<10} {}", mark, name, label.dimmed());
        }

        println!();
        println!(
            "  {} passed, {} failed, {} skipped",
            self.passed(),
            self.failed(),
            self.skipped()
        );

        if let Some(ref halt) = self.halt {
            println!();
            println!(
                "{}",
                format!(
                    "Halted at '{}' after {} attempt{} ({})",
                    halt.step,
                    halt.attempts,
                    if halt.attempts == 1 { "" } else { "s" },
                    halt.kind.label()
                )
                .red()
                .bold()
            );

            let detail = crate::utils::truncate_lines(&halt.detail, crate::utils::MAX_DIAGNOSTIC_LINES);
            if !detail.is_empty() {
                println!("{}", detail.dimmed());
            }

            if let Some(resume) = self.resume_suggestion(target) {
                println!();
                println!("Resume with: {}", resume.cyan());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> OutcomeReport {
        OutcomeReport {
            status: PipelineStatus::HaltedOnFailure,
            rows: vec![
                ("detect".into(), "Detect project".into(), StepOutcome::Passed),
                ("validate".into(), "Validate".into(), StepOutcome::Passed),
                ("archive".into(), "Archive".into(), StepOutcome::Failed),
                ("upload".into(), "Upload".into(), StepOutcome::Pending),
            ],
            halt: Some(HaltDiagnostic {
                step: "archive".into(),
                kind: FailureKind::Signing,
                detail: "no signing certificate".into(),
                attempts: 3,
            }),
        }
    }

    #[test]
    fn test_counts() {
        let r = report();
        assert_eq!(r.passed(), 2);
        assert_eq!(r.failed(), 1);
        assert_eq!(r.skipped(), 0);
        assert!(!r.success());
    }

    #[test]
    fn test_resume_suggestion_names_halting_step() {
        let r = report();
        let suggestion = r.resume_suggestion("./MyApp").unwrap();
        assert_eq!(suggestion, "shipflow ship ./MyApp --resume-from archive");
    }

    #[test]
    fn test_no_suggestion_when_completed() {
        let r = OutcomeReport {
            status: PipelineStatus::Completed,
            rows: vec![],
            halt: None,
        };
        assert!(r.resume_suggestion("./MyApp").is_none());
        assert!(r.success());
    }
}
