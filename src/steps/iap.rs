// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! In-app purchase step
//!
//! Reconciles the product identifiers the app declares against the
//! records App Store Connect knows about. Skeleton records can be created
//! from here, but pricing and the review screenshot are web-UI-only, so
//! creating any ends the run with explicit instructions.

use async_trait::async_trait;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::errors::FailureKind;
use crate::pipeline::{keys, RunContext, StepAction, StepResult};

pub struct IapStep {
    env: Arc<StepEnv>,
}

impl IapStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }
}

#[async_trait]
impl StepAction for IapStep {
    async fn run(&self, ctx: &RunContext) -> StepResult {
        let declared = &self.env.config.iap_products;
        if declared.is_empty() {
            return StepResult::passed_with(
                vec!["no in-app purchase products declared".to_string()],
                vec![],
            );
        }

        let app_id = try_step!(ctx.require(keys::APP_ID));
        let existing = try_step!(self.env.toolchain.release.list_iap_products(app_id).await);

        let missing: Vec<&String> = declared
            .iter()
            .filter(|p| !existing.contains(p))
            .collect();

        if missing.is_empty() {
            return StepResult::passed_with(
                vec![format!("{} product records present", declared.len())],
                vec![],
            );
        }

        for product in &missing {
            let output = try_step!(
                self.env
                    .toolchain
                    .release
                    .create_iap_product(app_id, product)
                    .await
            );
            if !output.success {
                return StepResult::failed(output.failure_kind(), output.combined());
            }
        }

        StepResult::failed(
            FailureKind::ManualAction,
            format!(
                "Created {} skeleton in-app purchase record{}: {}. Complete pricing and the \
                 review screenshot in the App Store Connect web UI, then resume from 'iap'.",
                missing.len(),
                if missing.len() == 1 { "" } else { "s" },
                missing
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    }

    fn simulate(&self, _ctx: &RunContext) -> StepResult {
        tracing::info!(
            products = self.env.config.iap_products.len(),
            "dry run: would reconcile in-app purchase records"
        );
        StepResult::passed_with(
            vec!["dry run: product reconciliation skipped".to_string()],
            vec![],
        )
    }
}
