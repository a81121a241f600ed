// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Ship command - run the full pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ShipConfig;
use crate::pipeline::{PipelineExecutor, RunContext, RunOptions};
use crate::steps::{build_pipeline, StepEnv};
use crate::tools::Toolchain;

/// Saved run context inside the scratch directory.
const CONTEXT_FILE: &str = "context.json";

/// CLI flag overrides applied on top of the target's config file.
pub struct ShipArgs {
    pub target: PathBuf,
    pub resume_from: Option<String>,
    pub version: Option<String>,
    pub release_notes: Option<String>,
    pub dry_run: bool,
    pub optimize: bool,
}

/// Run the shipping pipeline
pub async fn run(args: ShipArgs, verbose: bool) -> Result<()> {
    if !args.target.is_dir() {
        return Err(miette::miette!(
            "Target is not a directory: {}",
            args.target.display()
        ));
    }

    let mut config = ShipConfig::load(&args.target)?;
    if args.version.is_some() {
        config.version = args.version;
    }
    if args.release_notes.is_some() {
        config.release_notes = args.release_notes;
    }
    config.optimize = config.optimize || args.optimize;

    let scratch = config.scratch_path(&args.target);
    if !args.dry_run {
        std::fs::create_dir_all(&scratch).map_err(|e| {
            miette::miette!("Failed to create scratch directory '{}': {}", scratch.display(), e)
        })?;
    }

    let options = RunOptions {
        dry_run: args.dry_run,
        resume_from: args.resume_from.clone(),
        verbose,
    };

    // A halted run saves its context next to the other scratch artifacts;
    // resuming reloads it so skipped steps still contribute their facts.
    let context_file = scratch.join(CONTEXT_FILE);
    let initial = if options.resume_from.is_some() && context_file.exists() {
        RunContext::load(&context_file)?
    } else {
        if options.resume_from.is_some() {
            tracing::warn!(
                "no saved run context at {}; resumed steps may be missing earlier facts",
                context_file.display()
            );
        }
        RunContext::new()
    };

    let env = Arc::new(StepEnv {
        target: args.target.clone(),
        scratch: scratch.clone(),
        toolchain: Toolchain::detect(config.asc_key_id.clone()),
        config,
    });

    println!();
    println!("{}: {}", "Shipping".bold(), args.target.display());
    println!("{}", "═".repeat(50));

    let steps = build_pipeline(env);
    let executor = PipelineExecutor::new();
    let (report, ctx) = executor.run_with(&steps, &options, initial).await?;

    let target_display = args.target.display().to_string();
    report.render(&target_display);

    if report.success() {
        // Completed runs don't need the scratch artifacts; halted runs keep
        // them so resumption skips the finished steps.
        if !options.dry_run && scratch.exists() {
            if let Err(e) = std::fs::remove_dir_all(&scratch) {
                tracing::warn!(error = %e, "failed to clear scratch directory");
            }
        }
        Ok(())
    } else {
        if !options.dry_run {
            if let Err(e) = ctx.save(&context_file) {
                tracing::warn!(error = %e, "failed to save run context for resumption");
            }
        }
        let step = report
            .halt
            .as_ref()
            .map(|h| h.step.clone())
            .unwrap_or_default();
        Err(crate::errors::ShipflowError::PipelineHalted {
            step,
            help: report
                .resume_suggestion(&target_display)
                .map(|s| format!("Resume with: {}", s)),
        }
        .into())
    }
}
