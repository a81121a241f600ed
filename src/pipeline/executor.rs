// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pipeline executor
//!
//! Runs the ordered step list strictly sequentially: resume-cursor
//! skipping, bounded retries for retryable failure kinds, dry-run
//! simulation, halt on the first unrecovered failure, and a terminal
//! outcome report. Step actions never error past this loop; the executor
//! is the sole place deciding continue-vs-halt.

use colored::Colorize;

use super::context::RunContext;
use super::report::{HaltDiagnostic, OutcomeReport, PipelineStatus};
use super::step::{Step, StepOutcome, StepResult};
use crate::errors::{ShipflowError, ShipflowResult};

/// Options for one executor invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Simulate every step; no collaborator is invoked.
    pub dry_run: bool,
    /// Steps before this name are force-skipped.
    pub resume_from: Option<String>,
    /// Print step notes as they are produced.
    pub verbose: bool,
}

/// Sequential step executor.
pub struct PipelineExecutor;

impl PipelineExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Execute the pipeline, returning the report and the accumulated
    /// context. A halted run is a normal return; `Err` means the invocation
    /// itself was invalid (empty pipeline, unknown resume target, context
    /// invariant breach).
    pub async fn run(
        &self,
        steps: &[Step],
        options: &RunOptions,
    ) -> ShipflowResult<(OutcomeReport, RunContext)> {
        self.run_with(steps, options, RunContext::new()).await
    }

    /// Like [`run`](Self::run), starting from a previously accumulated
    /// context. A resumed run passes the facts saved when it halted so that
    /// steps skipped by the cursor don't leave later steps blind.
    pub async fn run_with(
        &self,
        steps: &[Step],
        options: &RunOptions,
        ctx: RunContext,
    ) -> ShipflowResult<(OutcomeReport, RunContext)> {
        if steps.is_empty() {
            return Err(ShipflowError::EmptyPipeline);
        }

        // An unrecognized resume target is rejected loudly; silently
        // restarting from the beginning re-runs steps the user believed
        // were done.
        if let Some(ref name) = options.resume_from {
            if !steps.iter().any(|s| s.name == *name) {
                return Err(ShipflowError::UnknownResumeStep {
                    name: name.clone(),
                    available: steps
                        .iter()
                        .map(|s| s.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }

        let mut ctx = ctx;
        let mut outcomes = vec![StepOutcome::Pending; steps.len()];
        let mut cursor = options.resume_from.clone();
        let mut halt: Option<HaltDiagnostic> = None;

        if options.dry_run {
            println!("{}", "Dry run: simulating all steps".yellow());
        }

        for (index, step) in steps.iter().enumerate() {
            // Resume-cursor suppression ends at the cursor step itself.
            if let Some(target) = cursor.as_deref() {
                if step.name != target {
                    outcomes[index] = StepOutcome::Skipped;
                    println!("  {} {} (skipped)", "○".dimmed(), step.label.dimmed());
                    continue;
                }
            }
            cursor = None;

            if !step.enabled {
                outcomes[index] = StepOutcome::Skipped;
                println!("  {} {} (skipped)", "○".dimmed(), step.label.dimmed());
                continue;
            }

            outcomes[index] = StepOutcome::Running;
            println!("  {} {}...", "→".blue(), step.label);

            let mut attempt = 0;
            loop {
                attempt += 1;

                let result = if options.dry_run {
                    step.action.simulate(&ctx)
                } else {
                    step.action.run(&ctx).await
                };

                match result {
                    StepResult::Passed { notes, discovered } => {
                        for (key, value) in discovered {
                            ctx.set(&key, value)?;
                        }
                        outcomes[index] = StepOutcome::Passed;
                        println!("  {} {}", "✓".green(), step.label.bold());
                        if options.verbose {
                            for note in notes {
                                println!("    {}", note.dimmed());
                            }
                        }
                        break;
                    }
                    StepResult::Failed {
                        kind,
                        detail,
                        remediation,
                    } => {
                        let retryable = kind.is_retryable() && attempt < step.max_attempts;

                        if retryable {
                            tracing::warn!(
                                step = step.name,
                                attempt,
                                kind = kind.label(),
                                "step failed, retrying"
                            );
                            if let Some(ref fix) = remediation {
                                println!(
                                    "    {} {} — {}",
                                    "↻".yellow(),
                                    format!("attempt {} failed ({})", attempt, kind.label()).yellow(),
                                    fix
                                );
                            } else {
                                println!(
                                    "    {} {}",
                                    "↻".yellow(),
                                    format!("attempt {} failed ({}), retrying", attempt, kind.label())
                                        .yellow()
                                );
                            }
                            continue;
                        }

                        outcomes[index] = StepOutcome::Failed;
                        println!("  {} {} failed", "✗".red(), step.label.bold());
                        halt = Some(HaltDiagnostic {
                            step: step.name.to_string(),
                            kind,
                            detail,
                            attempts: attempt,
                        });
                        break;
                    }
                }
            }

            // First unrecovered failure halts; later steps stay pending.
            if halt.is_some() {
                break;
            }
        }

        let status = if halt.is_some() {
            PipelineStatus::HaltedOnFailure
        } else {
            PipelineStatus::Completed
        };

        let rows = steps
            .iter()
            .zip(outcomes.iter())
            .map(|(s, o)| (s.name.to_string(), s.label.clone(), *o))
            .collect();

        Ok((OutcomeReport { status, rows, halt }, ctx))
    }
}

impl Default for PipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use crate::pipeline::step::StepAction;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Scripted action: pops the next result per invocation and counts
    /// real and simulated calls separately.
    struct Scripted {
        results: Mutex<Vec<StepResult>>,
        runs: Arc<AtomicUsize>,
        simulations: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(results: Vec<StepResult>) -> (Box<Self>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let runs = Arc::new(AtomicUsize::new(0));
            let simulations = Arc::new(AtomicUsize::new(0));
            let action = Box::new(Self {
                results: Mutex::new(results),
                runs: runs.clone(),
                simulations: simulations.clone(),
            });
            (action, runs, simulations)
        }
    }

    #[async_trait]
    impl StepAction for Scripted {
        async fn run(&self, _ctx: &RunContext) -> StepResult {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                StepResult::passed()
            } else {
                results.remove(0)
            }
        }

        fn simulate(&self, _ctx: &RunContext) -> StepResult {
            self.simulations.fetch_add(1, Ordering::SeqCst);
            StepResult::passed()
        }
    }

    fn passing_step(name: &'static str) -> (Step, Arc<AtomicUsize>) {
        let (action, runs, _) = Scripted::new(vec![]);
        (Step::new(name, name, action), runs)
    }

    fn failing_step(name: &'static str, kind: FailureKind, attempts: u32) -> (Step, Arc<AtomicUsize>) {
        let results = (0..attempts + 1)
            .map(|_| StepResult::failed(kind, "scripted failure"))
            .collect();
        let (action, runs, _) = Scripted::new(results);
        (Step::new(name, name, action).with_attempts(attempts), runs)
    }

    #[tokio::test]
    async fn test_all_steps_pass() {
        let (a, _) = passing_step("one");
        let (b, _) = passing_step("two");

        let executor = PipelineExecutor::new();
        let (report, _) = executor
            .run(&[a, b], &RunOptions::default())
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(report.passed(), 2);
        assert_eq!(report.failed(), 0);
    }

    #[tokio::test]
    async fn test_empty_pipeline_rejected() {
        let executor = PipelineExecutor::new();
        let err = executor.run(&[], &RunOptions::default()).await;
        assert!(matches!(err, Err(ShipflowError::EmptyPipeline)));
    }

    #[tokio::test]
    async fn test_resume_skips_prefix_without_invoking_actions() {
        let (a, a_runs) = passing_step("one");
        let (b, b_runs) = passing_step("two");
        let (c, c_runs) = passing_step("three");

        let options = RunOptions {
            resume_from: Some("two".to_string()),
            ..Default::default()
        };
        let executor = PipelineExecutor::new();
        let (report, _) = executor.run(&[a, b, c], &options).await.unwrap();

        assert_eq!(a_runs.load(Ordering::SeqCst), 0);
        assert_eq!(b_runs.load(Ordering::SeqCst), 1);
        assert_eq!(c_runs.load(Ordering::SeqCst), 1);
        assert_eq!(report.rows[0].2, StepOutcome::Skipped);
        assert_eq!(report.rows[1].2, StepOutcome::Passed);
        assert_eq!(report.rows[2].2, StepOutcome::Passed);
        assert!(report.success());
    }

    #[tokio::test]
    async fn test_unknown_resume_target_rejected() {
        let (a, a_runs) = passing_step("one");

        let options = RunOptions {
            resume_from: Some("no-such-step".to_string()),
            ..Default::default()
        };
        let executor = PipelineExecutor::new();
        let err = executor.run(&[a], &options).await;

        assert!(matches!(err, Err(ShipflowError::UnknownResumeStep { .. })));
        assert_eq!(a_runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_dry_run_never_invokes_real_actions() {
        let (a_action, a_runs, a_sims) = Scripted::new(vec![]);
        let (b_action, b_runs, b_sims) = Scripted::new(vec![]);
        let steps = [
            Step::new("one", "one", a_action),
            Step::new("two", "two", b_action),
        ];

        let options = RunOptions {
            dry_run: true,
            ..Default::default()
        };
        let executor = PipelineExecutor::new();
        let (report, _) = executor.run(&steps, &options).await.unwrap();

        assert!(report.success());
        assert_eq!(a_runs.load(Ordering::SeqCst), 0);
        assert_eq!(b_runs.load(Ordering::SeqCst), 0);
        assert_eq!(a_sims.load(Ordering::SeqCst), 1);
        assert_eq!(b_sims.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_halt_pipeline() {
        let (a, _) = passing_step("one");
        let (b, b_runs) = failing_step("two", FailureKind::TransientNetwork, 3);
        let (c, c_runs) = passing_step("three");

        let executor = PipelineExecutor::new();
        let (report, _) = executor
            .run(&[a, b, c], &RunOptions::default())
            .await
            .unwrap();

        assert!(!report.success());
        assert_eq!(b_runs.load(Ordering::SeqCst), 3);
        assert_eq!(c_runs.load(Ordering::SeqCst), 0);
        assert_eq!(report.rows[1].2, StepOutcome::Failed);
        assert_eq!(report.rows[2].2, StepOutcome::Pending);

        let halt = report.halt.as_ref().unwrap();
        assert_eq!(halt.step, "two");
        assert_eq!(halt.attempts, 3);
    }

    #[tokio::test]
    async fn test_fail_then_pass_within_budget_continues() {
        let (action, runs, _) = Scripted::new(vec![StepResult::failed(
            FailureKind::Signing,
            "first attempt fails",
        )]);
        let flaky = Step::new("archive", "archive", action).with_attempts(3);
        let (next, next_runs) = passing_step("upload");

        let executor = PipelineExecutor::new();
        let (report, _) = executor
            .run(&[flaky, next], &RunOptions::default())
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(next_runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_ignores_remaining_attempts() {
        let (b, b_runs) = failing_step("two", FailureKind::Unrecognized, 3);

        let executor = PipelineExecutor::new();
        let (report, _) = executor.run(&[b], &RunOptions::default()).await.unwrap();

        assert!(!report.success());
        // Attempts remained in the budget, but an unrecognized failure is
        // never retried.
        assert_eq!(b_runs.load(Ordering::SeqCst), 1);
        assert_eq!(report.halt.as_ref().unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn test_disabled_step_reported_skipped() {
        let (a, _) = passing_step("one");
        let (b, b_runs) = passing_step("two");
        let b = b.enabled_if(false);

        let executor = PipelineExecutor::new();
        let (report, _) = executor
            .run(&[a, b], &RunOptions::default())
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(b_runs.load(Ordering::SeqCst), 0);
        assert_eq!(report.rows[1].2, StepOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_discovered_values_merge_into_context() {
        let (action, _, _) = Scripted::new(vec![StepResult::passed_with(
            vec![],
            vec![("app_id".to_string(), "1234".to_string())],
        )]);
        let step = Step::new("detect", "detect", action);

        let executor = PipelineExecutor::new();
        let (_, ctx) = executor.run(&[step], &RunOptions::default()).await.unwrap();

        assert_eq!(ctx.get("app_id"), Some("1234"));
    }

    /// Nine-step end-to-end shape: archive (step 5) exhausts its budget.
    #[tokio::test]
    async fn test_nine_step_archive_failure_scenario() {
        let names = [
            "detect", "validate", "iap", "bump", "archive", "upload", "metadata", "optimize",
            "submit",
        ];

        let mut steps = Vec::new();
        let mut counters = Vec::new();
        for name in names {
            if name == "archive" {
                let (step, runs) = failing_step(name, FailureKind::Signing, 3);
                steps.push(step);
                counters.push(runs);
            } else {
                let (step, runs) = passing_step(name);
                steps.push(step);
                counters.push(runs);
            }
        }

        let executor = PipelineExecutor::new();
        let (report, _) = executor
            .run(&steps, &RunOptions::default())
            .await
            .unwrap();

        assert!(!report.success());
        assert_eq!(report.passed(), 4);
        assert_eq!(report.failed(), 1);
        for row in &report.rows[5..] {
            assert_eq!(row.2, StepOutcome::Pending);
        }
        assert_eq!(
            report.resume_suggestion("./App").unwrap(),
            "shipflow ship ./App --resume-from archive"
        );
        for counter in &counters[5..] {
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }
    }

    /// Follow-up invocation resuming at the failed step.
    #[tokio::test]
    async fn test_nine_step_resume_scenario() {
        let names = [
            "detect", "validate", "iap", "bump", "archive", "upload", "metadata", "optimize",
            "submit",
        ];

        let mut steps = Vec::new();
        let mut counters = Vec::new();
        for name in names {
            let (step, runs) = passing_step(name);
            steps.push(step);
            counters.push(runs);
        }

        let options = RunOptions {
            resume_from: Some("archive".to_string()),
            ..Default::default()
        };
        let executor = PipelineExecutor::new();
        let (report, _) = executor.run(&steps, &options).await.unwrap();

        assert!(report.success());
        assert_eq!(report.skipped(), 4);
        assert_eq!(report.passed(), 5);
        for counter in &counters[..4] {
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }
        for counter in &counters[4..] {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    /// Action that passes only when a required context key is present,
    /// like the real steps downstream of detect/bump.
    struct Requires(&'static str);

    #[async_trait]
    impl StepAction for Requires {
        async fn run(&self, ctx: &RunContext) -> StepResult {
            match ctx.require(self.0) {
                Ok(_) => StepResult::passed(),
                Err(e) => StepResult::failed(FailureKind::Unrecognized, e.to_string()),
            }
        }

        fn simulate(&self, _ctx: &RunContext) -> StepResult {
            StepResult::passed()
        }
    }

    #[tokio::test]
    async fn test_resume_with_saved_context_feeds_dependent_steps() {
        let (detect, detect_runs) = passing_step("detect");
        let archive = Step::new("archive", "archive", Box::new(Requires("scheme")));

        let mut saved = RunContext::new();
        saved.set("scheme", "Zephyr").unwrap();

        let options = RunOptions {
            resume_from: Some("archive".to_string()),
            ..Default::default()
        };
        let executor = PipelineExecutor::new();
        let (report, ctx) = executor
            .run_with(&[detect, archive], &options, saved)
            .await
            .unwrap();

        assert!(report.success());
        assert_eq!(detect_runs.load(Ordering::SeqCst), 0);
        assert_eq!(report.rows[0].2, StepOutcome::Skipped);
        assert_eq!(report.rows[1].2, StepOutcome::Passed);
        assert_eq!(ctx.get("scheme"), Some("Zephyr"));
    }

    #[tokio::test]
    async fn test_resume_without_saved_context_halts_at_dependent_step() {
        let (detect, _) = passing_step("detect");
        let archive = Step::new("archive", "archive", Box::new(Requires("scheme")));

        let options = RunOptions {
            resume_from: Some("archive".to_string()),
            ..Default::default()
        };
        let executor = PipelineExecutor::new();
        let (report, _) = executor
            .run(&[detect, archive], &options)
            .await
            .unwrap();

        assert!(!report.success());
        assert_eq!(report.halt.as_ref().unwrap().step, "archive");
    }
}
