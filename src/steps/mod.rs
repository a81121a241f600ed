// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! The shipping steps
//!
//! Nine steps in a fixed total order; later steps assume earlier ones'
//! side effects (archive assumes bump has written the new version).
//! Remediation heuristics live inside the step that needs them, branching
//! on the classified `FailureKind` of a collaborator result.

mod archive;
mod bump;
mod detect;
mod iap;
mod metadata;
mod optimize;
mod submit;
#[cfg(test)]
pub(crate) mod testutil;
mod upload;
mod validate;

pub use archive::ArchiveStep;
pub use bump::BumpStep;
pub use detect::DetectStep;
pub use iap::IapStep;
pub use metadata::MetadataStep;
pub use optimize::OptimizeStep;
pub use submit::SubmitStep;
pub use upload::UploadStep;
pub use validate::ValidateStep;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ShipConfig;
use crate::pipeline::Step;
use crate::tools::Toolchain;

/// Everything a step needs: the target, the scratch area, configuration,
/// and the collaborator toolchain.
pub struct StepEnv {
    pub target: PathBuf,
    pub scratch: PathBuf,
    pub config: ShipConfig,
    pub toolchain: Toolchain,
}

/// Convert a `ShipflowError` inside a step into a failed result; step
/// actions never error past the executor.
macro_rules! try_step {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => {
                return $crate::pipeline::StepResult::failed(
                    $crate::errors::FailureKind::Unrecognized,
                    e.to_string(),
                )
            }
        }
    };
}

pub(crate) use try_step;

/// The full shipping pipeline in its fixed order.
pub fn build_pipeline(env: Arc<StepEnv>) -> Vec<Step> {
    let retries = env.config.max_retries;
    let optimize_enabled = env.config.optimize;

    vec![
        Step::new("detect", "Detect project and app record", Box::new(DetectStep::new(env.clone()))),
        Step::new("validate", "Lint and guardrail checks", Box::new(ValidateStep::new(env.clone()))),
        Step::new("iap", "Reconcile in-app purchases", Box::new(IapStep::new(env.clone()))),
        Step::new("bump", "Bump version and build number", Box::new(BumpStep::new(env.clone()))),
        Step::new("archive", "Build release archive", Box::new(ArchiveStep::new(env.clone())))
            .with_attempts(retries),
        Step::new("upload", "Export and upload build", Box::new(UploadStep::new(env.clone())))
            .with_attempts(retries),
        Step::new("metadata", "Push store metadata", Box::new(MetadataStep::new(env.clone()))),
        Step::new("optimize", "Enable phased release", Box::new(OptimizeStep::new(env.clone())))
            .enabled_if(optimize_enabled),
        Step::new("submit", "Wait for processing and submit", Box::new(SubmitStep::new(env))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{keys, PipelineExecutor, RunContext, RunOptions};
    use crate::steps::testutil::{
        fixture_project, scratch_for, NoopBuild, NoopLinter, NoopLiveness, NoopRelease,
    };
    use std::path::Path;

    fn fake_env(target: &Path) -> Arc<StepEnv> {
        Arc::new(StepEnv {
            target: target.to_path_buf(),
            scratch: scratch_for(target),
            config: ShipConfig::default(),
            toolchain: Toolchain {
                build: Box::new(NoopBuild),
                linter: Box::new(NoopLinter),
                release: Box::new(NoopRelease),
                liveness: Box::new(NoopLiveness),
            },
        })
    }

    #[tokio::test]
    async fn test_full_pipeline_passes_over_fixture_project() {
        let dir = fixture_project();
        let steps = build_pipeline(fake_env(dir.path()));

        let executor = PipelineExecutor::new();
        let (report, ctx) = executor
            .run(&steps, &RunOptions::default())
            .await
            .unwrap();

        assert!(report.success());
        // detect/bump/archive/upload populated the shared facts.
        assert_eq!(ctx.get(keys::SCHEME), Some("Zephyr"));
        assert_eq!(ctx.get(keys::VERSION), Some("1.4.3"));
        assert_eq!(ctx.get(keys::BUILD_NUMBER), Some("43"));
        assert!(ctx.contains(keys::ARCHIVE_PATH));
    }

    #[tokio::test]
    async fn test_resume_from_archive_with_saved_context_passes() {
        let dir = fixture_project();

        // First invocation runs to completion and saves its facts, the way
        // the ship command persists context on halt.
        let steps = build_pipeline(fake_env(dir.path()));
        let executor = PipelineExecutor::new();
        let (_, ctx) = executor
            .run(&steps, &RunOptions::default())
            .await
            .unwrap();

        let context_file = dir.path().join("context.json");
        ctx.save(&context_file).unwrap();
        let reloaded = RunContext::load(&context_file).unwrap();

        // Second invocation resumes at archive; the skipped prefix's facts
        // come from the reloaded context.
        let steps = build_pipeline(fake_env(dir.path()));
        let options = RunOptions {
            resume_from: Some("archive".to_string()),
            ..Default::default()
        };
        let (report, _) = executor
            .run_with(&steps, &options, reloaded)
            .await
            .unwrap();

        assert!(report.success());
        // detect..bump skipped by the cursor, optimize disabled.
        assert_eq!(report.skipped(), 5);
        assert_eq!(report.passed(), 4);
        assert!(report.halt.is_none());
    }

    #[test]
    fn test_pipeline_order_is_fixed() {
        let env = Arc::new(StepEnv {
            target: PathBuf::from("."),
            scratch: PathBuf::from(".shipflow/scratch"),
            config: ShipConfig::default(),
            toolchain: Toolchain::detect(None),
        });

        let steps = build_pipeline(env);
        let names: Vec<&str> = steps.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            [
                "detect", "validate", "iap", "bump", "archive", "upload", "metadata", "optimize",
                "submit"
            ]
        );
    }

    #[test]
    fn test_flaky_steps_carry_retry_budget() {
        let env = Arc::new(StepEnv {
            target: PathBuf::from("."),
            scratch: PathBuf::from(".shipflow/scratch"),
            config: ShipConfig::default(),
            toolchain: Toolchain::detect(None),
        });

        let steps = build_pipeline(env);
        let budget = |name: &str| steps.iter().find(|s| s.name == name).unwrap().max_attempts;

        assert_eq!(budget("archive"), 3);
        assert_eq!(budget("upload"), 3);
        assert_eq!(budget("detect"), 1);
        assert_eq!(budget("submit"), 1);
    }

    #[test]
    fn test_optimize_disabled_by_default() {
        let env = Arc::new(StepEnv {
            target: PathBuf::from("."),
            scratch: PathBuf::from(".shipflow/scratch"),
            config: ShipConfig::default(),
            toolchain: Toolchain::detect(None),
        });

        let steps = build_pipeline(env);
        let optimize = steps.iter().find(|s| s.name == "optimize").unwrap();
        assert!(!optimize.enabled);
    }
}
