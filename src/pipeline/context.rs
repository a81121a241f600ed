// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Run context
//!
//! Pipeline-scoped facts discovered during execution. Each key is written
//! once by the step that discovers it and read-only thereafter; the
//! executor is the only writer. The context serializes to a scratch file
//! on halt so a resumed run starts with the facts its skipped steps
//! discovered the first time around.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::errors::{ShipflowError, ShipflowResult};

/// Well-known context keys.
pub mod keys {
    /// App Store Connect app identifier.
    pub const APP_ID: &str = "app_id";
    /// Build scheme resolved at detect time.
    pub const SCHEME: &str = "scheme";
    /// Marketing version being shipped.
    pub const VERSION: &str = "version";
    /// Build number being shipped.
    pub const BUILD_NUMBER: &str = "build_number";
    /// Bundle identifier from the project file.
    pub const BUNDLE_ID: &str = "bundle_id";
    /// Path to the produced .xcarchive.
    pub const ARCHIVE_PATH: &str = "archive_path";
    /// Path to the exported .ipa.
    pub const IPA_PATH: &str = "ipa_path";
}

/// Write-once key/value facts for one pipeline run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RunContext {
    values: HashMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a discovered value. Rediscovering a key with the same value
    /// is a no-op (a resumed step re-derives facts already reloaded from
    /// the saved context); a conflicting value is a step-ordering error.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> ShipflowResult<()> {
        let value = value.into();
        if let Some(existing) = self.values.get(key) {
            if *existing == value {
                return Ok(());
            }
            return Err(ShipflowError::ContextOverwrite {
                key: key.to_string(),
            });
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Like `get`, but a missing key is an error naming the key.
    pub fn require(&self, key: &str) -> ShipflowResult<&str> {
        self.get(key).ok_or_else(|| ShipflowError::ContextMissing {
            key: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Persist the accumulated facts for a later resumed run.
    pub fn save(&self, path: &Path) -> ShipflowResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| ShipflowError::FileWriteError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Reload facts saved by a halted run.
    pub fn load(path: &Path) -> ShipflowResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ShipflowError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}
