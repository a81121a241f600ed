// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Submit step
//!
//! Waits for the uploaded build to finish remote processing (bounded poll)
//! and submits the version for review. A poll timeout is reported as its
//! own failure kind so it can't be mistaken for a remote rejection.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{try_step, StepEnv};
use crate::errors::FailureKind;
use crate::pipeline::{keys, RunContext, StepAction, StepResult};
use crate::tools::ProcessingState;

pub struct SubmitStep {
    env: Arc<StepEnv>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl SubmitStep {
    pub fn new(env: Arc<StepEnv>) -> Self {
        let poll_interval = env.config.poll_interval();
        let poll_timeout = env.config.poll_timeout();
        Self {
            env,
            poll_interval,
            poll_timeout,
        }
    }

    #[cfg(test)]
    fn with_poll(env: Arc<StepEnv>, poll_interval: Duration, poll_timeout: Duration) -> Self {
        Self {
            env,
            poll_interval,
            poll_timeout,
        }
    }

    /// Block until the build is processed, a terminal remote state is
    /// reported, or the timeout elapses.
    async fn await_processing(&self, app_id: &str, build_number: u64) -> StepResult {
        let started = Instant::now();
        let spinner =
            crate::utils::create_spinner(&format!("waiting for build {} to process", build_number));

        let result = loop {
            let state = match self
                .env
                .toolchain
                .release
                .processing_state(app_id, build_number)
                .await
            {
                Ok(state) => state,
                Err(e) => break StepResult::failed(FailureKind::Unrecognized, e.to_string()),
            };

            match state {
                ProcessingState::Valid => break StepResult::passed(),
                ProcessingState::Invalid => {
                    break StepResult::failed(
                        FailureKind::Unrecognized,
                        format!(
                            "build {} was rejected by remote processing; check App Store Connect \
                             for details",
                            build_number
                        ),
                    );
                }
                ProcessingState::Processing | ProcessingState::Missing => {}
            }

            if started.elapsed() >= self.poll_timeout {
                break StepResult::failed(
                    FailureKind::PollTimeout,
                    format!(
                        "build {} still processing after {}s; re-run with --resume-from submit \
                         once processing completes",
                        build_number,
                        self.poll_timeout.as_secs()
                    ),
                );
            }

            tracing::debug!(build_number, "build still processing, waiting");
            tokio::time::sleep(self.poll_interval).await;
        };

        spinner.finish_and_clear();
        result
    }
}

#[async_trait]
impl StepAction for SubmitStep {
    async fn run(&self, ctx: &RunContext) -> StepResult {
        let app_id = try_step!(ctx.require(keys::APP_ID));
        let version = try_step!(ctx.require(keys::VERSION));
        let build_number: u64 = match try_step!(ctx.require(keys::BUILD_NUMBER)).parse() {
            Ok(n) => n,
            Err(_) => {
                return StepResult::failed(
                    FailureKind::Unrecognized,
                    "build_number in context is not numeric",
                )
            }
        };

        let waited = self.await_processing(app_id, build_number).await;
        if !waited.is_passed() {
            return waited;
        }

        let output = try_step!(
            self.env
                .toolchain
                .release
                .submit_for_review(app_id, version)
                .await
        );

        if output.success {
            StepResult::passed_with(
                vec![format!("version {} submitted for review", version)],
                vec![],
            )
        } else {
            StepResult::failed(output.failure_kind(), output.combined())
        }
    }

    fn simulate(&self, ctx: &RunContext) -> StepResult {
        let version = ctx.get(keys::VERSION).unwrap_or("0.0.0-dry-run");
        tracing::info!(%version, "dry run: would wait for processing and submit");
        StepResult::passed_with(
            vec![format!("dry run: would submit {} for review", version)],
            vec![],
        )
    }
}
