// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! # shipflow - App Store Shipping Pipeline
//!
//! `shipflow` drives an App Store release through a fixed sequence of
//! steps — detect, validate, iap, bump, archive, upload, metadata,
//! optimize, submit — delegating the hard work to `xcodebuild`,
//! `swiftlint`, and the App Store Connect CLI.
//!
//! ## Features
//!
//! - **Resumable** - `--resume-from <step>` skips completed work
//! - **Self-healing** - known failure signatures trigger a remediation
//!   and a bounded retry
//! - **Dry-run** - simulate the whole pipeline without side effects
//! - **Guardrails** - field limits, trademark scan, privacy usage strings
//!
//! ## Quick Start
//!
//! ```bash
//! # Ship a release
//! shipflow ship ./MyApp --release-notes "Bug fixes"
//!
//! # Resume after fixing a failure
//! shipflow ship ./MyApp --resume-from archive
//!
//! # Check everything without shipping
//! shipflow validate ./MyApp
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod guardrails;
pub mod pipeline;
pub mod project;
pub mod steps;
pub mod tools;
pub mod utils;

// Re-export commonly used types
pub use config::ShipConfig;
pub use errors::{FailureKind, ShipflowError, ShipflowResult};
pub use pipeline::{OutcomeReport, PipelineExecutor, RunOptions, Step, StepOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
