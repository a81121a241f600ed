// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Step model
//!
//! A step is one named unit of work with its own action and retry budget.
//! Actions never return `Err` to the executor; failures are encoded in
//! `StepResult` with a classified `FailureKind` so the executor alone
//! decides continue-vs-halt.

use async_trait::async_trait;

use super::context::RunContext;
use crate::errors::FailureKind;

/// Per-step outcome as tracked and reported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not yet attempted (also the report value for steps after a halt).
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl StepOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Pending => "pending",
            StepOutcome::Running => "running",
            StepOutcome::Passed => "passed",
            StepOutcome::Failed => "failed",
            StepOutcome::Skipped => "skipped",
        }
    }
}

/// What one action invocation produced.
#[derive(Debug, Clone)]
pub enum StepResult {
    Passed {
        /// Human-readable notes for the verbose log.
        notes: Vec<String>,
        /// Context values discovered by this step; merged write-once by the
        /// executor.
        discovered: Vec<(String, String)>,
    },
    Failed {
        kind: FailureKind,
        /// Diagnostic text, truncated at render time.
        detail: String,
        /// Corrective sub-operation applied before the next attempt, if any.
        remediation: Option<String>,
    },
}

impl StepResult {
    pub fn passed() -> Self {
        StepResult::Passed {
            notes: Vec::new(),
            discovered: Vec::new(),
        }
    }

    pub fn passed_with(notes: Vec<String>, discovered: Vec<(String, String)>) -> Self {
        StepResult::Passed { notes, discovered }
    }

    pub fn failed(kind: FailureKind, detail: impl Into<String>) -> Self {
        StepResult::Failed {
            kind,
            detail: detail.into(),
            remediation: None,
        }
    }

    pub fn failed_remediated(
        kind: FailureKind,
        detail: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        StepResult::Failed {
            kind,
            detail: detail.into(),
            remediation: Some(remediation.into()),
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, StepResult::Passed { .. })
    }
}

/// Executable behavior of a step.
#[async_trait]
pub trait StepAction: Send + Sync {
    /// Run the real action. Internal errors become `StepResult::Failed`.
    async fn run(&self, ctx: &RunContext) -> StepResult;

    /// Dry-run substitute: describe what would happen and synthesize
    /// placeholder context values. Must not touch any collaborator.
    fn simulate(&self, ctx: &RunContext) -> StepResult;
}

/// One named unit of work in the shipping pipeline.
pub struct Step {
    /// Unique identifier used for resume targeting and logging.
    pub name: &'static str,
    /// Human-readable label for reports.
    pub label: String,
    /// Retry budget; most steps use 1, the flaky external ones 3.
    pub max_attempts: u32,
    /// Disabled steps are reported skipped without running.
    pub enabled: bool,
    pub action: Box<dyn StepAction>,
}

impl Step {
    pub fn new(name: &'static str, label: impl Into<String>, action: Box<dyn StepAction>) -> Self {
        Self {
            name,
            label: label.into(),
            max_attempts: 1,
            enabled: true,
            action,
        }
    }

    pub fn with_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn enabled_if(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("max_attempts", &self.max_attempts)
            .field("enabled", &self.enabled)
            .finish()
    }
}
