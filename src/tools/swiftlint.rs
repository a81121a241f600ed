// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! swiftlint adapter
//!
//! Runs auto-fix, then lints with the JSON reporter and tallies findings by
//! severity.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use super::{run_command, LintSummary, Linter, ToolOutput};
use crate::errors::{ShipflowError, ShipflowResult};

pub struct SwiftLint {
    program: String,
}

impl SwiftLint {
    pub fn new() -> Self {
        Self {
            program: "swiftlint".to_string(),
        }
    }
}

impl Default for SwiftLint {
    fn default() -> Self {
        Self::new()
    }
}

/// One finding from swiftlint's JSON reporter.
#[derive(Debug, Deserialize)]
struct LintFinding {
    severity: String,
}

fn summarize(findings: &[LintFinding]) -> LintSummary {
    let errors = findings
        .iter()
        .filter(|f| f.severity.eq_ignore_ascii_case("error"))
        .count();
    LintSummary {
        errors,
        warnings: findings.len() - errors,
    }
}

#[async_trait]
impl Linter for SwiftLint {
    async fn fix(&self, project_dir: &Path) -> ShipflowResult<ToolOutput> {
        run_command(&self.program, &["--fix", "--quiet"], project_dir).await
    }

    async fn lint(&self, project_dir: &Path) -> ShipflowResult<LintSummary> {
        // swiftlint exits non-zero when error-severity findings exist, so
        // exit status alone can't distinguish "findings" from "broken run".
        let output = run_command(
            &self.program,
            &["lint", "--quiet", "--reporter", "json"],
            project_dir,
        )
        .await?;

        let findings: Vec<LintFinding> =
            serde_json::from_str(output.stdout.trim()).map_err(|e| {
                ShipflowError::ToolInvocationFailed {
                    tool: self.program.clone(),
                    error: format!("unparseable lint report: {}", e),
                    help: Some("Is swiftlint's JSON reporter available?".to_string()),
                }
            })?;

        Ok(summarize(&findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_counts_by_severity() {
        let report = r#"[
            {"severity": "Warning", "rule_id": "line_length"},
            {"severity": "Error", "rule_id": "force_cast"},
            {"severity": "Warning", "rule_id": "todo"}
        ]"#;
        let findings: Vec<LintFinding> = serde_json::from_str(report).unwrap();
        let summary = summarize(&findings);

        assert_eq!(summary.errors, 1);
        assert_eq!(summary.warnings, 2);
    }

    #[test]
    fn test_summarize_empty_report() {
        let findings: Vec<LintFinding> = serde_json::from_str("[]").unwrap();
        let summary = summarize(&findings);
        assert_eq!(summary, LintSummary { errors: 0, warnings: 0 });
    }
}
