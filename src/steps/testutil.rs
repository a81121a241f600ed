// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Shared collaborator fakes for step tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::errors::ShipflowResult;
use crate::tools::{
    AppRecord, BuildTool, LintSummary, Linter, Liveness, LivenessChecker, ProcessingState,
    ReleaseCli, ToolOutput, VersionRecord,
};

pub fn ok_output() -> ToolOutput {
    ToolOutput {
        success: true,
        stdout: String::new(),
        stderr: String::new(),
        exit_code: 0,
    }
}

pub fn fail_output(stderr: &str) -> ToolOutput {
    ToolOutput {
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: 1,
    }
}

pub struct NoopBuild;

#[async_trait]
impl BuildTool for NoopBuild {
    async fn archive(&self, _: &Path, _: &str, _: &Path, _: bool) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }

    async fn export_ipa(&self, _: &Path, _: &Path) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }
}

/// Scripted build tool: pops one archive result per call (empty script
/// means success) and records the provisioning flag each call passed.
pub struct RecordingBuild {
    results: Mutex<Vec<ToolOutput>>,
    flags: Arc<Mutex<Vec<bool>>>,
}

impl RecordingBuild {
    pub fn new(results: Vec<ToolOutput>) -> (Box<Self>, Arc<Mutex<Vec<bool>>>) {
        let flags = Arc::new(Mutex::new(Vec::new()));
        let build = Box::new(Self {
            results: Mutex::new(results),
            flags: flags.clone(),
        });
        (build, flags)
    }
}

#[async_trait]
impl BuildTool for RecordingBuild {
    async fn archive(
        &self,
        _target: &Path,
        _scheme: &str,
        _archive_path: &Path,
        allow_provisioning_updates: bool,
    ) -> ShipflowResult<ToolOutput> {
        self.flags.lock().unwrap().push(allow_provisioning_updates);
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            Ok(ok_output())
        } else {
            Ok(results.remove(0))
        }
    }

    async fn export_ipa(&self, _: &Path, _: &Path) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }
}

pub struct NoopLinter;

#[async_trait]
impl Linter for NoopLinter {
    async fn fix(&self, _: &Path) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }

    async fn lint(&self, _: &Path) -> ShipflowResult<LintSummary> {
        Ok(LintSummary {
            errors: 0,
            warnings: 0,
        })
    }
}

pub struct NoopLiveness;

#[async_trait]
impl LivenessChecker for NoopLiveness {
    async fn check(&self, _: &str) -> Liveness {
        Liveness::Reachable
    }
}

/// All-success release backend: every bundle id has an app record, every
/// build is already processed.
pub struct NoopRelease;

#[async_trait]
impl ReleaseCli for NoopRelease {
    async fn list_apps(&self) -> ShipflowResult<Vec<AppRecord>> {
        Ok(vec![])
    }

    async fn find_app(&self, bundle_id: &str) -> ShipflowResult<Option<AppRecord>> {
        Ok(Some(AppRecord {
            id: "app-1".to_string(),
            name: "Zephyr".to_string(),
            bundle_id: bundle_id.to_string(),
        }))
    }

    async fn versions(&self, _: &str) -> ShipflowResult<Vec<VersionRecord>> {
        Ok(vec![])
    }

    async fn upload(&self, _: &Path) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }

    async fn processing_state(&self, _: &str, _: u64) -> ShipflowResult<ProcessingState> {
        Ok(ProcessingState::Valid)
    }

    async fn get_metadata(&self, _: &str, _: &str) -> ShipflowResult<Option<String>> {
        Ok(None)
    }

    async fn set_metadata(&self, _: &str, _: &str, _: &str) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }

    async fn list_iap_products(&self, _: &str) -> ShipflowResult<Vec<String>> {
        Ok(vec![])
    }

    async fn create_iap_product(&self, _: &str, _: &str) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }

    async fn submit_for_review(&self, _: &str, _: &str) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }

    async fn enable_phased_release(&self, _: &str, _: &str) -> ShipflowResult<ToolOutput> {
        Ok(ok_output())
    }
}

const PBXPROJ: &str = r#"
		buildSettings = {
			CURRENT_PROJECT_VERSION = 42;
			MARKETING_VERSION = 1.4.2;
			PRODUCT_BUNDLE_IDENTIFIER = com.example.zephyr;
		};
"#;

/// Temp directory holding a minimal Zephyr.xcodeproj at version 1.4.2
/// build 42.
pub fn fixture_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let xcodeproj = dir.path().join("Zephyr.xcodeproj");
    std::fs::create_dir(&xcodeproj).unwrap();
    std::fs::write(xcodeproj.join("project.pbxproj"), PBXPROJ).unwrap();
    dir
}

/// Scratch path used by step fixtures.
pub fn scratch_for(target: &Path) -> PathBuf {
    target.join(".shipflow/scratch")
}
