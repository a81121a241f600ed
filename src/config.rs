// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Ship configuration
//!
//! All previously hard-wired knobs (retry budgets, poll interval/timeout,
//! scratch location, credential identifiers) live in one explicit object
//! with documented defaults, optionally overridden by a `.shipflow.yaml`
//! in the target directory and then by CLI flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{ShipflowError, ShipflowResult};

/// Name of the per-project configuration file.
pub const CONFIG_FILE: &str = ".shipflow.yaml";

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipConfig {
    /// Retry budget for the flaky external steps (archive, upload).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds between build-processing readiness checks.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Total seconds to wait for build processing before giving up.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Scratch directory for archives and export plists, relative to the
    /// target. Cleared on full success, kept on failure for resumption.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Build scheme; inferred from the project name when omitted.
    #[serde(default)]
    pub scheme: Option<String>,

    /// Bundle identifier override; read from the project file when omitted.
    #[serde(default)]
    pub bundle_id: Option<String>,

    /// App Store Connect API key identifier.
    #[serde(default)]
    pub asc_key_id: Option<String>,

    /// Support URL checked for liveness during validation.
    #[serde(default)]
    pub support_url: Option<String>,

    /// Terms that must not appear in store metadata.
    #[serde(default = "default_trademark_terms")]
    pub trademark_terms: Vec<String>,

    /// In-app purchase product identifiers the app declares.
    #[serde(default)]
    pub iap_products: Vec<String>,

    /// Marketing version to ship; bump step derives one when omitted.
    #[serde(default)]
    pub version: Option<String>,

    /// "What's new" text pushed by the metadata step.
    #[serde(default)]
    pub release_notes: Option<String>,

    /// Store metadata fields pushed by the metadata step, keyed by field
    /// name (description, keywords, promotional_text, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Enable the phased-release optimize step.
    #[serde(default)]
    pub optimize: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_poll_timeout_secs() -> u64 {
    1800
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".shipflow/scratch")
}

fn default_trademark_terms() -> Vec<String> {
    // Terms App Review rejects in third-party metadata.
    ["iPhone", "iPad", "Apple Watch", "App Store", "Android"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
            scratch_dir: default_scratch_dir(),
            scheme: None,
            bundle_id: None,
            asc_key_id: None,
            support_url: None,
            trademark_terms: default_trademark_terms(),
            iap_products: Vec::new(),
            version: None,
            release_notes: None,
            metadata: BTreeMap::new(),
            optimize: false,
        }
    }
}

impl ShipConfig {
    /// Load configuration for a target directory.
    ///
    /// Missing file means defaults; a present but malformed file is an error.
    pub fn load(target: &Path) -> ShipflowResult<Self> {
        let path = target.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ShipflowError::FileReadError {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity-check knob values.
    pub fn validate(&self) -> ShipflowResult<()> {
        if self.max_retries == 0 {
            return Err(ShipflowError::InvalidConfig {
                reason: "max_retries must be at least 1".to_string(),
                help: None,
            });
        }
        if self.poll_interval_secs == 0 || self.poll_timeout_secs == 0 {
            return Err(ShipflowError::InvalidConfig {
                reason: "poll interval and timeout must be non-zero".to_string(),
                help: None,
            });
        }
        if self.poll_interval_secs > self.poll_timeout_secs {
            return Err(ShipflowError::InvalidConfig {
                reason: "poll_interval_secs exceeds poll_timeout_secs".to_string(),
                help: Some("The submit step would never check readiness twice".to_string()),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Absolute scratch directory for a target.
    pub fn scratch_path(&self, target: &Path) -> PathBuf {
        if self.scratch_dir.is_absolute() {
            self.scratch_dir.clone()
        } else {
            target.join(&self.scratch_dir)
        }
    }

    /// The (field, text) metadata pairs this release will push. The
    /// `release_notes` shorthand rides along as `whats_new` unless the
    /// metadata map already spells that field out.
    pub fn pending_metadata(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .metadata
            .iter()
            .map(|(field, text)| (field.clone(), text.clone()))
            .collect();
        if let Some(ref notes) = self.release_notes {
            if !self.metadata.contains_key("whats_new") {
                fields.push(("whats_new".to_string(), notes.clone()));
            }
        }
        fields
    }
}
