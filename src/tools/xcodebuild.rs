// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! xcodebuild adapter
//!
//! Archives a scheme and exports signed ipas. Output stays free text; the
//! classification seam turns it into a `FailureKind` when an invocation
//! fails.

use async_trait::async_trait;
use std::path::Path;

use super::{run_command, BuildTool, ToolOutput};
use crate::errors::ShipflowResult;

pub struct XcodeBuild {
    program: String,
}

impl XcodeBuild {
    pub fn new() -> Self {
        Self {
            program: "xcodebuild".to_string(),
        }
    }
}

impl Default for XcodeBuild {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BuildTool for XcodeBuild {
    async fn archive(
        &self,
        project_dir: &Path,
        scheme: &str,
        archive_path: &Path,
        allow_provisioning_updates: bool,
    ) -> ShipflowResult<ToolOutput> {
        let archive = archive_path.to_string_lossy();
        let mut args = vec![
            "archive",
            "-scheme",
            scheme,
            "-configuration",
            "Release",
            "-destination",
            "generic/platform=iOS",
            "-archivePath",
            archive.as_ref(),
        ];

        // Lets xcodebuild refresh expired profiles itself; the archive
        // step's signing remediation turns this on for the retry.
        if allow_provisioning_updates {
            args.push("-allowProvisioningUpdates");
        }

        run_command(&self.program, &args, project_dir).await
    }

    async fn export_ipa(
        &self,
        archive_path: &Path,
        export_dir: &Path,
    ) -> ShipflowResult<ToolOutput> {
        let options_plist = export_dir.join("ExportOptions.plist");
        if !options_plist.exists() {
            std::fs::create_dir_all(export_dir)?;
            std::fs::write(&options_plist, EXPORT_OPTIONS_PLIST)?;
        }

        let archive = archive_path.to_string_lossy();
        let export = export_dir.to_string_lossy();
        let options = options_plist.to_string_lossy();
        let args = [
            "-exportArchive",
            "-archivePath",
            archive.as_ref(),
            "-exportPath",
            export.as_ref(),
            "-exportOptionsPlist",
            options.as_ref(),
        ];

        let working_dir = archive_path.parent().unwrap_or(Path::new("."));
        run_command(&self.program, &args, working_dir).await
    }
}

const EXPORT_OPTIONS_PLIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>method</key>
	<string>app-store-connect</string>
	<key>uploadSymbols</key>
	<true/>
</dict>
</plist>
"#;
