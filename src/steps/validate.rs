// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Validate step
//!
//! swiftlint auto-fix followed by a lint pass, then the guardrail
//! checklist. Error-severity findings from either fail the step; warnings
//! are surfaced but don't halt a ship.

use async_trait::async_trait;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::errors::FailureKind;
use crate::guardrails::{self, Severity};
use crate::pipeline::{RunContext, StepAction, StepResult};

pub struct ValidateStep {
    env: Arc<StepEnv>,
}

impl ValidateStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

}

#[async_trait]
impl StepAction for ValidateStep {
    async fn run(&self, _ctx: &RunContext) -> StepResult {
        let fix = try_step!(self.env.toolchain.linter.fix(&self.env.target).await);
        if !fix.success {
            return StepResult::failed(fix.failure_kind(), fix.combined());
        }

        let lint = try_step!(self.env.toolchain.linter.lint(&self.env.target).await);
        if lint.errors > 0 {
            return StepResult::failed(
                FailureKind::Unrecognized,
                format!(
                    "swiftlint reports {} error{} ({} warnings)",
                    lint.errors,
                    if lint.errors == 1 { "" } else { "s" },
                    lint.warnings
                ),
            );
        }

        let report = try_step!(
            guardrails::run_guardrails(
                &self.env.target,
                &self.env.config,
                &self.env.config.pending_metadata(),
                self.env.toolchain.liveness.as_ref(),
            )
            .await
        );

        if !report.is_clean() {
            let details: Vec<String> = report
                .findings
                .iter()
                .filter(|f| f.severity == Severity::Error)
                .map(|f| format!("[{}] {}", f.check, f.message))
                .collect();
            return StepResult::failed(FailureKind::Unrecognized, details.join("\n"));
        }

        let mut notes = vec![format!("swiftlint: 0 errors, {} warnings", lint.warnings)];
        for finding in &report.findings {
            notes.push(format!("warning [{}] {}", finding.check, finding.message));
        }

        StepResult::passed_with(notes, vec![])
    }

    fn simulate(&self, _ctx: &RunContext) -> StepResult {
        tracing::info!("dry run: would lint and run guardrail checks");
        StepResult::passed_with(vec!["dry run: lint and guardrails skipped".to_string()], vec![])
    }
}
