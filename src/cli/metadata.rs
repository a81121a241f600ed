// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Metadata command - thin App Store Connect front-end

use colored::Colorize;
use miette::Result;

use super::MetadataAction;
use crate::guardrails::check_limit;
use crate::tools::{AscCli, ReleaseCli};

/// Dispatch a metadata action
pub async fn run(action: MetadataAction, _verbose: bool) -> Result<()> {
    let release = AscCli::new(std::env::var("ASC_KEY_ID").ok());

    match action {
        MetadataAction::Apps => {
            let apps = release.list_apps().await?;
            for app in apps {
                println!("{}  {}  {}", app.id, app.name.bold(), app.bundle_id.dimmed());
            }
        }
        MetadataAction::Versions { app_id } => {
            let versions = release.versions(&app_id).await?;
            for v in versions {
                println!("{}  v{}  {}", v.id, v.version.bold(), v.state.dimmed());
            }
        }
        MetadataAction::Get { app_id, field } => {
            match release.get_metadata(&app_id, &field).await? {
                Some(value) => println!("{}", value),
                None => println!("{}", "(empty)".dimmed()),
            }
        }
        MetadataAction::Set { app_id, field, value } => {
            if let Some(finding) = check_limit(&field, &value) {
                return Err(miette::miette!("{}", finding.message));
            }
            let output = release.set_metadata(&app_id, &field, &value).await?;
            if !output.success {
                return Err(miette::miette!("Failed to set '{}': {}", field, output.combined()));
            }
            println!("{} {} updated", "✓".green(), field);
        }
    }

    Ok(())
}
