// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Bump step
//!
//! The single writer of on-disk version state. Picks the marketing version
//! (configured, or next patch) and the next build number, writes both back
//! to the project file, and discovers the shipped version for later steps.

use async_trait::async_trait;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::pipeline::{keys, RunContext, StepAction, StepResult};
use crate::project::ProjectDescriptor;

pub struct BumpStep {
    env: Arc<StepEnv>,
}

impl BumpStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl StepAction for BumpStep {
    async fn run(&self, _ctx: &RunContext) -> StepResult {
        let mut descriptor = try_step!(ProjectDescriptor::discover(&self.env.target));
        let previous = descriptor.marketing_version.clone();

        let next_version = match self.env.config.version {
            Some(ref v) => v.clone(),
            None => try_step!(descriptor.next_patch_version()),
        };

        descriptor.marketing_version = next_version.clone();
        descriptor.build_number += 1;
        try_step!(descriptor.store());

        StepResult::passed_with(
            vec![format!(
                "{} -> {} (build {})",
                previous, next_version, descriptor.build_number
            )],
            vec![(keys::VERSION.to_string(), next_version)],
        )
    }

    fn simulate(&self, _ctx: &RunContext) -> StepResult {
        let version = self
            .env
            .config
            .version
            .clone()
            .unwrap_or_else(|| "0.0.0-dry-run".to_string());
        tracing::info!(%version, "dry run: would bump version and build number");
        StepResult::passed_with(
            vec![format!("dry run: would write version {}", version)],
            vec![(keys::VERSION.to_string(), version)],
        )
    }
}
