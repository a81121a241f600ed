// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Optimize step
//!
//! Turns on phased rollout for the shipped version. Only runs when the
//! invocation asked for it; otherwise the executor reports it skipped.

use async_trait::async_trait;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::pipeline::{keys, RunContext, StepAction, StepResult};

pub struct OptimizeStep {
    env: Arc<StepEnv>,
}

impl OptimizeStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl StepAction for OptimizeStep {
    async fn run(&self, ctx: &RunContext) -> StepResult {
        let app_id = try_step!(ctx.require(keys::APP_ID));
        let version = try_step!(ctx.require(keys::VERSION));

        let output = try_step!(
            self.env
                .toolchain
                .release
                .enable_phased_release(app_id, version)
                .await
        );

        if output.success {
            StepResult::passed_with(
                vec![format!("phased release enabled for {}", version)],
                vec![],
            )
        } else {
            StepResult::failed(output.failure_kind(), output.combined())
        }
    }

    fn simulate(&self, ctx: &RunContext) -> StepResult {
        let version = ctx.get(keys::VERSION).unwrap_or("0.0.0-dry-run");
        tracing::info!(%version, "dry run: would enable phased release");
        StepResult::passed_with(
            vec![format!("dry run: would enable phased release for {}", version)],
            vec![],
        )
    }
}
