// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! URL liveness probe
//!
//! A HEAD request with a short timeout; only guardrail checks use this.

use async_trait::async_trait;
use std::time::Duration;

use super::{Liveness, LivenessChecker};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpLivenessChecker {
    client: reqwest::Client,
}

impl HttpLivenessChecker {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpLivenessChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LivenessChecker for HttpLivenessChecker {
    async fn check(&self, url: &str) -> Liveness {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() || response.status().is_redirection() => {
                Liveness::Reachable
            }
            Ok(_) => Liveness::Unreachable,
            Err(e) if e.is_timeout() => Liveness::Timeout,
            Err(_) => Liveness::Unreachable,
        }
    }
}
