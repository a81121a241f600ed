// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pipeline core
//!
//! The resumable step executor and its supporting types.

mod context;
mod executor;
mod report;
mod step;

pub use context::{keys, RunContext};
pub use executor::{PipelineExecutor, RunOptions};
pub use report::{HaltDiagnostic, OutcomeReport, PipelineStatus};
pub use step::{Step, StepAction, StepOutcome, StepResult};
