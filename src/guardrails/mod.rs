// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pre-submission guardrails
//!
//! Rule-based checks that catch the rejections App Review hands out for
//! free: metadata over field limits, trademarked terms in store text,
//! sensitive-API use without a privacy usage string, and a dead support
//! URL. These run inside the validate step and via `shipflow validate`.

mod limits;
mod privacy;
mod trademarks;

pub use limits::{check_limit, limit_for};
pub use privacy::check_privacy_strings;
pub use trademarks::scan_trademarks;

use std::path::Path;

use crate::config::ShipConfig;
use crate::errors::ShipflowResult;
use crate::tools::{Liveness, LivenessChecker};

/// Severity of a guardrail finding. Errors fail the validate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One guardrail finding.
#[derive(Debug, Clone)]
pub struct Finding {
    pub check: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    pub fn error(check: &'static str, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(check: &'static str, message: impl Into<String>) -> Self {
        Self {
            check,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Aggregated guardrail results.
#[derive(Debug, Default)]
pub struct GuardrailReport {
    pub findings: Vec<Finding>,
}

impl GuardrailReport {
    pub fn errors(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.findings.len() - self.errors()
    }

    pub fn is_clean(&self) -> bool {
        self.errors() == 0
    }
}

/// Run every guardrail against a target project.
///
/// `metadata` holds the (field, text) pairs that will be pushed to the
/// store for this release.
pub async fn run_guardrails(
    target: &Path,
    config: &ShipConfig,
    metadata: &[(String, String)],
    liveness: &dyn LivenessChecker,
) -> ShipflowResult<GuardrailReport> {
    let mut report = GuardrailReport::default();

    for (field, text) in metadata {
        if let Some(finding) = check_limit(field, text) {
            report.findings.push(finding);
        }
    }

    report
        .findings
        .extend(scan_trademarks(metadata, &config.trademark_terms));

    report.findings.extend(check_privacy_strings(target)?);

    if let Some(ref url) = config.support_url {
        match liveness.check(url).await {
            Liveness::Reachable => {}
            Liveness::Unreachable => report.findings.push(Finding::error(
                "support-url",
                format!("Support URL is unreachable: {}", url),
            )),
            Liveness::Timeout => report.findings.push(Finding::warning(
                "support-url",
                format!("Support URL timed out: {}", url),
            )),
        }
    }

    Ok(report)
}
