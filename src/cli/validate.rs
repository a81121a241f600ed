// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Validate command - lint and guardrails without shipping

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::config::ShipConfig;
use crate::guardrails::{self, Severity};
use crate::tools::{HttpLivenessChecker, SwiftLint, Linter};

/// Run lint and guardrail checks only
pub async fn run(target: PathBuf, verbose: bool) -> Result<()> {
    if !target.is_dir() {
        return Err(miette::miette!("Target is not a directory: {}", target.display()));
    }

    let config = ShipConfig::load(&target)?;

    let linter = SwiftLint::new();
    let lint = linter.lint(&target).await?;

    let metadata = config.pending_metadata();

    let liveness = HttpLivenessChecker::new();
    let report = guardrails::run_guardrails(&target, &config, &metadata, &liveness).await?;

    println!();
    println!("{}: {}", "Validation".bold(), target.display());
    println!("{}", "═".repeat(50));
    println!(
        "  swiftlint: {} error{}, {} warning{}",
        lint.errors,
        if lint.errors == 1 { "" } else { "s" },
        lint.warnings,
        if lint.warnings == 1 { "" } else { "s" }
    );

    for finding in &report.findings {
        let mark = match finding.severity {
            Severity::Error => "✗".red(),
            Severity::Warning => "⚠".yellow(),
        };
        println!("  {} [{}] {}", mark, finding.check, finding.message);
    }

    if verbose && report.findings.is_empty() {
        println!("  {} no guardrail findings", "✓".green());
    }

    println!();
    if lint.errors == 0 && report.is_clean() {
        println!("{}", "Ready to ship".green().bold());
        Ok(())
    } else {
        Err(miette::miette!(
            "Validation failed: {} lint error(s), {} guardrail error(s)",
            lint.errors,
            report.errors()
        ))
    }
}
