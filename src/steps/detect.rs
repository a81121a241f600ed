// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Detect step
//!
//! Loads the project descriptor and resolves the matching App Store
//! Connect app record. Discovers the scheme, bundle id, and app id the
//! rest of the pipeline reads.

use async_trait::async_trait;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::pipeline::{keys, RunContext, StepAction, StepResult};
use crate::project::ProjectDescriptor;

pub struct DetectStep {
    env: Arc<StepEnv>,
}

impl DetectStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl StepAction for DetectStep {
    async fn run(&self, _ctx: &RunContext) -> StepResult {
        let descriptor = try_step!(ProjectDescriptor::discover(&self.env.target));

        let scheme = self
            .env
            .config
            .scheme
            .clone()
            .unwrap_or_else(|| descriptor.name.clone());

        let bundle_id = self
            .env
            .config
            .bundle_id
            .clone()
            .unwrap_or_else(|| descriptor.bundle_id.clone());

        let app = try_step!(self.env.toolchain.release.find_app(&bundle_id).await);
        let Some(app) = app else {
            return StepResult::failed(
                crate::errors::FailureKind::ManualAction,
                format!(
                    "No App Store Connect app with bundle id '{}'. Create the app record in the \
                     web UI first, then re-run.",
                    bundle_id
                ),
            );
        };

        StepResult::passed_with(
            vec![
                format!("project: {} ({})", descriptor.name, bundle_id),
                format!(
                    "current version {} build {}",
                    descriptor.marketing_version, descriptor.build_number
                ),
                format!("app record: {} ({})", app.name, app.id),
            ],
            vec![
                (keys::SCHEME.to_string(), scheme),
                (keys::BUNDLE_ID.to_string(), bundle_id),
                (keys::APP_ID.to_string(), app.id),
            ],
        )
    }

    fn simulate(&self, _ctx: &RunContext) -> StepResult {
        tracing::info!(target = %self.env.target.display(), "dry run: would detect project and app record");
        StepResult::passed_with(
            vec!["dry run: synthesized app record".to_string()],
            vec![
                (keys::SCHEME.to_string(), "DryRunScheme".to_string()),
                (keys::BUNDLE_ID.to_string(), "com.example.dry-run".to_string()),
                (keys::APP_ID.to_string(), "dry-run-app-id".to_string()),
            ],
        )
    }
}
