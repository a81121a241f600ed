// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Metadata step
//!
//! Pushes store metadata for the release. Field limits are enforced
//! locally before any remote write.

use async_trait::async_trait;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::errors::FailureKind;
use crate::guardrails::check_limit;
use crate::pipeline::{keys, RunContext, StepAction, StepResult};

pub struct MetadataStep {
    env: Arc<StepEnv>,
}

impl MetadataStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn pending_fields(&self) -> Vec<(String, String)> {
        self.env.config.pending_metadata()
    }
}

#[async_trait]
impl StepAction for MetadataStep {
    async fn run(&self, ctx: &RunContext) -> StepResult {
        let fields = self.pending_fields();
        if fields.is_empty() {
            return StepResult::passed_with(
                vec!["no metadata changes for this release".to_string()],
                vec![],
            );
        }

        let app_id = try_step!(ctx.require(keys::APP_ID));

        for (field, value) in &fields {
            if let Some(finding) = check_limit(field, value) {
                return StepResult::failed(FailureKind::Unrecognized, finding.message);
            }
        }

        let mut notes = Vec::new();
        for (field, value) in &fields {
            let output = try_step!(
                self.env
                    .toolchain
                    .release
                    .set_metadata(app_id, field, value)
                    .await
            );
            if !output.success {
                return StepResult::failed(output.failure_kind(), output.combined());
            }
            notes.push(format!("set {} ({} chars)", field, value.chars().count()));
        }

        StepResult::passed_with(notes, vec![])
    }

    fn simulate(&self, _ctx: &RunContext) -> StepResult {
        let fields = self.pending_fields();
        tracing::info!(fields = fields.len(), "dry run: would push store metadata");
        StepResult::passed_with(
            fields
                .iter()
                .map(|(f, v)| format!("dry run: would set {} ({} chars)", f, v.chars().count()))
                .collect(),
            vec![],
        )
    }
}
