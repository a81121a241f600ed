// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! App Store Connect CLI adapter
//!
//! Wraps the `asc` command-line client. Every listing call requests JSON
//! output and parses it with serde; mutations return the raw `ToolOutput`
//! for the caller to classify. The wire protocol itself belongs to the CLI.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

use super::{run_command, AppRecord, ProcessingState, ReleaseCli, ToolOutput, VersionRecord};
use crate::errors::{ShipflowError, ShipflowResult};

pub struct AscCli {
    program: String,
    key_id: Option<String>,
}

impl AscCli {
    pub fn new(key_id: Option<String>) -> Self {
        Self {
            program: "asc".to_string(),
            key_id,
        }
    }

    async fn invoke(&self, args: &[&str]) -> ShipflowResult<ToolOutput> {
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 2);
        full.extend_from_slice(args);
        if let Some(ref key) = self.key_id {
            full.push("--api-key-id");
            full.push(key.as_str());
        }
        run_command(&self.program, &full, Path::new(".")).await
    }

    /// Invoke and parse a JSON listing; a failed invocation is an error.
    async fn invoke_json<T: for<'de> Deserialize<'de>>(&self, args: &[&str]) -> ShipflowResult<T> {
        let output = self.invoke(args).await?;
        if !output.success {
            return Err(ShipflowError::ToolInvocationFailed {
                tool: self.program.clone(),
                error: output.combined(),
                help: None,
            });
        }
        Ok(serde_json::from_str(output.stdout.trim())?)
    }
}

#[derive(Debug, Deserialize)]
struct AppRow {
    id: String,
    name: String,
    #[serde(rename = "bundleId")]
    bundle_id: String,
}

#[derive(Debug, Deserialize)]
struct VersionRow {
    id: String,
    #[serde(rename = "versionString")]
    version: String,
    #[serde(rename = "appStoreState")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct BuildRow {
    #[serde(rename = "version")]
    build_number: String,
    #[serde(rename = "processingState")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct LocalizationRow {
    locale: String,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct IapRow {
    #[serde(rename = "productId")]
    product_id: String,
}

fn parse_processing_state(state: &str) -> ProcessingState {
    match state {
        "PROCESSING" => ProcessingState::Processing,
        "VALID" => ProcessingState::Valid,
        "FAILED" | "INVALID" => ProcessingState::Invalid,
        _ => ProcessingState::Processing,
    }
}

#[async_trait]
impl ReleaseCli for AscCli {
    async fn list_apps(&self) -> ShipflowResult<Vec<AppRecord>> {
        let rows: Vec<AppRow> = self.invoke_json(&["apps", "list", "--output", "json"]).await?;
        Ok(rows
            .into_iter()
            .map(|r| AppRecord {
                id: r.id,
                name: r.name,
                bundle_id: r.bundle_id,
            })
            .collect())
    }

    async fn find_app(&self, bundle_id: &str) -> ShipflowResult<Option<AppRecord>> {
        Ok(self
            .list_apps()
            .await?
            .into_iter()
            .find(|a| a.bundle_id == bundle_id))
    }

    async fn versions(&self, app_id: &str) -> ShipflowResult<Vec<VersionRecord>> {
        let rows: Vec<VersionRow> = self
            .invoke_json(&["versions", "list", "--app", app_id, "--output", "json"])
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| VersionRecord {
                id: r.id,
                version: r.version,
                state: r.state,
            })
            .collect())
    }

    async fn upload(&self, ipa_path: &Path) -> ShipflowResult<ToolOutput> {
        let ipa = ipa_path.to_string_lossy();
        self.invoke(&["builds", "upload", "--file", ipa.as_ref()]).await
    }

    async fn processing_state(
        &self,
        app_id: &str,
        build_number: u64,
    ) -> ShipflowResult<ProcessingState> {
        let rows: Vec<BuildRow> = self
            .invoke_json(&["builds", "list", "--app", app_id, "--limit", "10", "--output", "json"])
            .await?;

        let wanted = build_number.to_string();
        Ok(rows
            .iter()
            .find(|b| b.build_number == wanted)
            .map(|b| parse_processing_state(&b.state))
            .unwrap_or(ProcessingState::Missing))
    }

    async fn get_metadata(&self, app_id: &str, field: &str) -> ShipflowResult<Option<String>> {
        let rows: Vec<LocalizationRow> = self
            .invoke_json(&["metadata", "get", "--app", app_id, "--output", "json"])
            .await?;

        // en-US is the primary locale for every app this tool ships.
        Ok(rows
            .iter()
            .find(|l| l.locale == "en-US")
            .and_then(|l| l.fields.get(field))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    async fn set_metadata(
        &self,
        app_id: &str,
        field: &str,
        value: &str,
    ) -> ShipflowResult<ToolOutput> {
        self.invoke(&[
            "metadata", "set", "--app", app_id, "--locale", "en-US", "--field", field, "--value",
            value,
        ])
        .await
    }

    async fn list_iap_products(&self, app_id: &str) -> ShipflowResult<Vec<String>> {
        let rows: Vec<IapRow> = self
            .invoke_json(&["iap", "list", "--app", app_id, "--output", "json"])
            .await?;
        Ok(rows.into_iter().map(|r| r.product_id).collect())
    }

    async fn create_iap_product(
        &self,
        app_id: &str,
        product_id: &str,
    ) -> ShipflowResult<ToolOutput> {
        self.invoke(&["iap", "create", "--app", app_id, "--product-id", product_id])
            .await
    }

    async fn submit_for_review(&self, app_id: &str, version: &str) -> ShipflowResult<ToolOutput> {
        self.invoke(&["versions", "submit", "--app", app_id, "--version", version])
            .await
    }

    async fn enable_phased_release(
        &self,
        app_id: &str,
        version: &str,
    ) -> ShipflowResult<ToolOutput> {
        self.invoke(&[
            "versions",
            "phased-release",
            "enable",
            "--app",
            app_id,
            "--version",
            version,
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_processing_state() {
        assert_eq!(parse_processing_state("VALID"), ProcessingState::Valid);
        assert_eq!(parse_processing_state("PROCESSING"), ProcessingState::Processing);
        assert_eq!(parse_processing_state("FAILED"), ProcessingState::Invalid);
        assert_eq!(parse_processing_state("INVALID"), ProcessingState::Invalid);
    }

    #[test]
    fn test_app_row_parses_cli_json() {
        let json = r#"[{"id": "123", "name": "Zephyr", "bundleId": "com.example.zephyr"}]"#;
        let rows: Vec<AppRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].bundle_id, "com.example.zephyr");
    }

    #[test]
    fn test_localization_row_flattens_fields() {
        let json = r#"[{"locale": "en-US", "description": "A weather app", "keywords": "weather"}]"#;
        let rows: Vec<LocalizationRow> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].fields["description"].as_str(), Some("A weather app"));
    }
}
