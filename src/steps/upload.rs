// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Upload step
//!
//! Exports the ipa from the archive and uploads it. Remediation: a
//! duplicate-build failure bumps the build counter in the project file
//! before the next attempt. Discovers the build number that actually
//! landed, which submit polls.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use super::{try_step, StepEnv};
use crate::errors::FailureKind;
use crate::pipeline::{keys, RunContext, StepAction, StepResult};
use crate::project::ProjectDescriptor;

pub struct UploadStep {
    env: Arc<StepEnv>,
}

impl UploadStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        Self { env }
    }

    fn export_dir(&self) -> PathBuf {
        self.env.scratch.join("export")
    }
}

#[async_trait]
impl StepAction for UploadStep {
    async fn run(&self, ctx: &RunContext) -> StepResult {
        let scheme = try_step!(ctx.require(keys::SCHEME));
        let archive_path = PathBuf::from(try_step!(ctx.require(keys::ARCHIVE_PATH)));
        let export_dir = self.export_dir();

        let export = try_step!(
            self.env
                .toolchain
                .build
                .export_ipa(&archive_path, &export_dir)
                .await
        );
        if !export.success {
            return StepResult::failed(export.failure_kind(), export.combined());
        }

        let ipa_path = export_dir.join(format!("{}.ipa", scheme));
        let upload = try_step!(self.env.toolchain.release.upload(&ipa_path).await);

        if upload.success {
            let descriptor = try_step!(ProjectDescriptor::discover(&self.env.target));
            return StepResult::passed_with(
                vec![format!(
                    "uploaded {} (build {})",
                    ipa_path.display(),
                    descriptor.build_number
                )],
                vec![
                    (
                        keys::IPA_PATH.to_string(),
                        ipa_path.to_string_lossy().to_string(),
                    ),
                    (
                        keys::BUILD_NUMBER.to_string(),
                        descriptor.build_number.to_string(),
                    ),
                ],
            );
        }

        let kind = upload.failure_kind();
        if kind == FailureKind::DuplicateBuild {
            // The remote already has this build number; advance the counter
            // so the next attempt uploads as a fresh build.
            let mut descriptor = try_step!(ProjectDescriptor::discover(&self.env.target));
            descriptor.build_number += 1;
            try_step!(descriptor.store());

            // The existing archive still embeds the old number; rebuild it
            // so the retry exports an ipa that carries the bump.
            let rebuilt = try_step!(
                self.env
                    .toolchain
                    .build
                    .archive(&self.env.target, scheme, &archive_path, false)
                    .await
            );
            if !rebuilt.success {
                return StepResult::failed(rebuilt.failure_kind(), rebuilt.combined());
            }

            return StepResult::failed_remediated(
                kind,
                upload.combined(),
                format!(
                    "bumped build number to {} and rebuilt the archive",
                    descriptor.build_number
                ),
            );
        }

        StepResult::failed(kind, upload.combined())
    }

    fn simulate(&self, ctx: &RunContext) -> StepResult {
        let scheme = ctx.get(keys::SCHEME).unwrap_or("DryRunScheme");
        let ipa_path = self.export_dir().join(format!("{}.ipa", scheme));
        tracing::info!("dry run: would export and upload build");
        StepResult::passed_with(
            vec![format!("dry run: would upload {}", ipa_path.display())],
            vec![
                (
                    keys::IPA_PATH.to_string(),
                    ipa_path.to_string_lossy().to_string(),
                ),
                (keys::BUILD_NUMBER.to_string(), "0".to_string()),
            ],
        )
    }
}
