// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Doctor command - report availability of required external tools

use colored::Colorize;
use miette::Result;

use crate::errors::ShipflowError;
use crate::tools::REQUIRED_TOOLS;

/// Check every collaborator binary is installed
pub async fn run(verbose: bool) -> Result<()> {
    println!();
    println!("{}", "Tool check".bold());
    println!("{}", "═".repeat(50));

    let mut missing = Vec::new();

    for tool in REQUIRED_TOOLS {
        match which::which(tool) {
            Ok(path) => {
                if verbose {
                    println!("  {} {} ({})", "✓".green(), tool, path.display().to_string().dimmed());
                } else {
                    println!("  {} {}", "✓".green(), tool);
                }
            }
            Err(_) => {
                println!("  {} {}", "✗".red(), tool);
                missing.push(*tool);
            }
        }
    }

    println!();
    if missing.is_empty() {
        println!("{}", "All required tools installed".green());
        Ok(())
    } else {
        for tool in &missing {
            let err = ShipflowError::tool_not_found(tool);
            eprintln!("{}", err);
        }
        Err(miette::miette!("{} required tool(s) missing", missing.len()))
    }
}
