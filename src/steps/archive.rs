// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Archive step
//!
//! Builds the release archive. Remediation: a signing-classified failure
//! flips on automatic provisioning updates for the remaining attempts.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::errors::FailureKind;
use crate::pipeline::{keys, RunContext, StepAction, StepResult};

pub struct ArchiveStep {
    env: Arc<StepEnv>,
    allow_provisioning_updates: AtomicBool,
}

impl ArchiveStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self {
            env,
            allow_provisioning_updates: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl StepAction for ArchiveStep {
    async fn run(&self, ctx: &RunContext) -> StepResult {
        let scheme = try_step!(ctx.require(keys::SCHEME));
        let archive_path = self.env.scratch.join(format!("{}.xcarchive", scheme));
        let allow_updates = self.allow_provisioning_updates.load(Ordering::SeqCst);

        let output = try_step!(
            self.env
                .toolchain
                .build
                .archive(&self.env.target, scheme, &archive_path, allow_updates)
                .await
        );

        if output.success {
            return StepResult::passed_with(
                vec![format!("archive at {}", archive_path.display())],
                vec![(
                    keys::ARCHIVE_PATH.to_string(),
                    archive_path.to_string_lossy().to_string(),
                )],
            );
        }

        let kind = output.failure_kind();
        if kind == FailureKind::Signing && !allow_updates {
            self.allow_provisioning_updates.store(true, Ordering::SeqCst);
            return StepResult::failed_remediated(
                kind,
                output.combined(),
                "retrying with -allowProvisioningUpdates",
            );
        }

        StepResult::failed(kind, output.combined())
    }

    fn simulate(&self, ctx: &RunContext) -> StepResult {
        let scheme = ctx.get(keys::SCHEME).unwrap_or("DryRunScheme");
        let archive_path = self.env.scratch.join(format!("{}.xcarchive", scheme));
        tracing::info!(%scheme, "dry run: would build release archive");
        StepResult::passed_with(
            vec![format!("dry run: would archive to {}", archive_path.display())],
            vec![(
                keys::ARCHIVE_PATH.to_string(),
                archive_path.to_string_lossy().to_string(),
            )],
        )
    }
}
