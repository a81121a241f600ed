// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Collaborator tool adapters
//!
//! Every hard operation (building, linting, talking to App Store Connect,
//! reachability probes) is delegated to an external collaborator behind a
//! trait. Adapters return structured results and classify their own failure
//! output; nothing above this layer parses raw tool text.

mod asc;
mod liveness;
mod swiftlint;
mod xcodebuild;

pub use asc::AscCli;
pub use liveness::HttpLivenessChecker;
pub use swiftlint::SwiftLint;
pub use xcodebuild::XcodeBuild;

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::errors::{classify_output, FailureKind, ShipflowError, ShipflowResult};

/// Structured result of one collaborator invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ToolOutput {
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Classify a failed invocation's output.
    pub fn failure_kind(&self) -> FailureKind {
        classify_output(&self.combined())
    }
}

/// Run an external program and capture its output.
///
/// A spawn failure (binary missing, permissions) is a `ShipflowError`; a
/// non-zero exit is a normal `ToolOutput` for the caller to classify.
pub async fn run_command(
    program: &str,
    args: &[&str],
    working_dir: &Path,
) -> ShipflowResult<ToolOutput> {
    tracing::debug!(program, ?args, "running collaborator");

    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ShipflowError::ToolInvocationFailed {
            tool: program.to_string(),
            error: e.to_string(),
            help: Some(format!("'{}' may not be installed", program)),
        })?;

    Ok(ToolOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Build-tool seam (xcodebuild).
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// Produce a release archive for a scheme.
    async fn archive(
        &self,
        project_dir: &Path,
        scheme: &str,
        archive_path: &Path,
        allow_provisioning_updates: bool,
    ) -> ShipflowResult<ToolOutput>;

    /// Export a signed ipa from an archive into an output directory.
    async fn export_ipa(&self, archive_path: &Path, export_dir: &Path)
        -> ShipflowResult<ToolOutput>;
}

/// Lint findings by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LintSummary {
    pub errors: usize,
    pub warnings: usize,
}

/// Linter seam (swiftlint).
#[async_trait]
pub trait Linter: Send + Sync {
    /// Apply auto-corrections in place.
    async fn fix(&self, project_dir: &Path) -> ShipflowResult<ToolOutput>;

    /// Report remaining findings by severity.
    async fn lint(&self, project_dir: &Path) -> ShipflowResult<LintSummary>;
}

/// Remote build-processing state reported by the release service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingState {
    /// Still being processed; poll again.
    Processing,
    /// Ready for submission.
    Valid,
    /// Rejected by the service (bad binary, export compliance, ...).
    Invalid,
    /// No build with that number is known yet.
    Missing,
}

/// An app as listed by the release service.
#[derive(Debug, Clone)]
pub struct AppRecord {
    pub id: String,
    pub name: String,
    pub bundle_id: String,
}

/// An app-store version row.
#[derive(Debug, Clone)]
pub struct VersionRecord {
    pub id: String,
    pub version: String,
    pub state: String,
}

/// Release-management CLI seam (App Store Connect).
#[async_trait]
pub trait ReleaseCli: Send + Sync {
    async fn list_apps(&self) -> ShipflowResult<Vec<AppRecord>>;

    /// Look up the app record for a bundle identifier.
    async fn find_app(&self, bundle_id: &str) -> ShipflowResult<Option<AppRecord>>;

    async fn versions(&self, app_id: &str) -> ShipflowResult<Vec<VersionRecord>>;

    /// Upload an exported ipa.
    async fn upload(&self, ipa_path: &Path) -> ShipflowResult<ToolOutput>;

    /// Processing state of a specific uploaded build number.
    async fn processing_state(
        &self,
        app_id: &str,
        build_number: u64,
    ) -> ShipflowResult<ProcessingState>;

    /// Read a localized metadata field (description, keywords, whats_new...).
    async fn get_metadata(&self, app_id: &str, field: &str) -> ShipflowResult<Option<String>>;

    /// Write a localized metadata field.
    async fn set_metadata(&self, app_id: &str, field: &str, value: &str)
        -> ShipflowResult<ToolOutput>;

    /// Product identifiers of existing in-app purchase records.
    async fn list_iap_products(&self, app_id: &str) -> ShipflowResult<Vec<String>>;

    /// Create a skeleton in-app purchase record.
    async fn create_iap_product(&self, app_id: &str, product_id: &str)
        -> ShipflowResult<ToolOutput>;

    /// Submit a version for review.
    async fn submit_for_review(&self, app_id: &str, version: &str) -> ShipflowResult<ToolOutput>;

    /// Turn on phased rollout for a version.
    async fn enable_phased_release(
        &self,
        app_id: &str,
        version: &str,
    ) -> ShipflowResult<ToolOutput>;
}

/// Verdict from a reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Reachable,
    Unreachable,
    Timeout,
}

/// URL liveness seam; guardrail checks only, never the pipeline core.
#[async_trait]
pub trait LivenessChecker: Send + Sync {
    async fn check(&self, url: &str) -> Liveness;
}

/// The full set of collaborators a pipeline run needs.
pub struct Toolchain {
    pub build: Box<dyn BuildTool>,
    pub linter: Box<dyn Linter>,
    pub release: Box<dyn ReleaseCli>,
    pub liveness: Box<dyn LivenessChecker>,
}

impl Toolchain {
    /// Real adapters for the installed vendor tools.
    pub fn detect(asc_key_id: Option<String>) -> Self {
        Self {
            build: Box::new(XcodeBuild::new()),
            linter: Box::new(SwiftLint::new()),
            release: Box::new(AscCli::new(asc_key_id)),
            liveness: Box::new(HttpLivenessChecker::new()),
        }
    }
}

/// External binaries the pipeline shells out to, for `doctor`.
pub const REQUIRED_TOOLS: &[&str] = &["xcodebuild", "swiftlint", "asc"];
