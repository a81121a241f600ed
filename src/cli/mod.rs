// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for shipflow.

pub mod doctor;
pub mod metadata;
pub mod ship;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// App Store shipping pipeline
///
/// Drive a release through detect, validate, archive, upload, and submit
/// with resume-from-step support.
#[derive(Parser, Debug)]
#[clap(
    name = "shipflow",
    version,
    about = "Resumable App Store shipping pipeline",
    long_about = None,
    after_help = "Examples:\n\
        shipflow ship ./MyApp                         Run the full pipeline\n\
        shipflow ship ./MyApp --resume-from archive   Resume a halted run\n\
        shipflow ship ./MyApp --dry-run               Simulate without side effects\n\
        shipflow validate ./MyApp                     Lint and guardrails only\n\
        shipflow doctor                               Check required tools\n\n\
        See 'shipflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the shipping pipeline against a project
    Ship {
        /// Project directory containing the *.xcodeproj
        target: PathBuf,

        /// Resume from this step; earlier steps are skipped
        #[clap(long, value_name = "STEP")]
        resume_from: Option<String>,

        /// Marketing version to ship (default: next patch version)
        #[clap(long, value_name = "X.Y.Z")]
        version: Option<String>,

        /// "What's new" text pushed with the release
        #[clap(long, value_name = "TEXT")]
        release_notes: Option<String>,

        /// Simulate every step without external side effects
        #[clap(long)]
        dry_run: bool,

        /// Enable phased release after upload
        #[clap(long)]
        optimize: bool,
    },

    /// Run lint and guardrail checks without shipping
    Validate {
        /// Project directory
        target: PathBuf,
    },

    /// Inspect or edit App Store Connect metadata
    Metadata {
        #[clap(subcommand)]
        action: MetadataAction,
    },

    /// Check that required external tools are installed
    Doctor,
}

/// Metadata subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum MetadataAction {
    /// List apps visible to the configured API key
    Apps,

    /// List store versions for an app
    Versions {
        /// App Store Connect app identifier
        app_id: String,
    },

    /// Read one metadata field
    Get {
        /// App Store Connect app identifier
        app_id: String,

        /// Field name (description, keywords, whats_new, ...)
        field: String,
    },

    /// Write one metadata field
    Set {
        /// App Store Connect app identifier
        app_id: String,

        /// Field name (description, keywords, whats_new, ...)
        field: String,

        /// New value
        value: String,
    },
}
