// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Privacy usage-string check
//!
//! An app that touches a sensitive API without the matching
//! `NS*UsageDescription` key in its Info.plist crashes at runtime and is
//! rejected in review. This scans Swift sources for known API markers and
//! cross-checks the plist.

use regex::Regex;
use std::path::Path;

use super::Finding;
use crate::errors::{ShipflowError, ShipflowResult};

/// (source marker, required plist key, human label)
const SENSITIVE_APIS: &[(&str, &str, &str)] = &[
    (r"CLLocationManager", "NSLocationWhenInUseUsageDescription", "location"),
    (r"AVCaptureDevice", "NSCameraUsageDescription", "camera"),
    (r"AVAudioRecorder|requestRecordPermission", "NSMicrophoneUsageDescription", "microphone"),
    (r"PHPhotoLibrary", "NSPhotoLibraryUsageDescription", "photo library"),
    (r"CNContactStore", "NSContactsUsageDescription", "contacts"),
    (r"HKHealthStore", "NSHealthShareUsageDescription", "health data"),
    (r"CMMotionManager|CMPedometer", "NSMotionUsageDescription", "motion"),
];

/// Scan a target project for sensitive-API use lacking a usage string.
pub fn check_privacy_strings(target: &Path) -> ShipflowResult<Vec<Finding>> {
    let sources = collect_swift_sources(target)?;
    if sources.is_empty() {
        return Ok(Vec::new());
    }

    let plist = read_info_plist(target)?;
    let mut findings = Vec::new();

    for (marker, plist_key, label) in SENSITIVE_APIS {
        let re = Regex::new(marker).expect("valid API marker regex");

        let used_in = sources.iter().find(|(_, content)| re.is_match(content));
        let Some((path, _)) = used_in else { continue };

        let declared = plist
            .as_ref()
            .map(|p| p.contains(plist_key))
            .unwrap_or(false);

        if !declared {
            findings.push(Finding::error(
                "privacy-strings",
                format!(
                    "{} API used in {} but Info.plist lacks {}",
                    label,
                    path.file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string()),
                    plist_key
                ),
            ));
        }
    }

    Ok(findings)
}

fn collect_swift_sources(target: &Path) -> ShipflowResult<Vec<(std::path::PathBuf, String)>> {
    let pattern = target.join("**/*.swift");
    let mut sources = Vec::new();

    for entry in glob::glob(&pattern.to_string_lossy())? {
        let Ok(path) = entry else { continue };
        // Vendored dependencies declare their own usage strings.
        if path.components().any(|c| c.as_os_str() == "Pods") {
            continue;
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ShipflowError::FileReadError {
            path: path.clone(),
            error: e.to_string(),
        })?;
        sources.push((path, content));
    }

    Ok(sources)
}

fn read_info_plist(target: &Path) -> ShipflowResult<Option<String>> {
    let pattern = target.join("**/Info.plist");
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let Ok(path) = entry else { continue };
        let content = std::fs::read_to_string(&path).map_err(|e| ShipflowError::FileReadError {
            path: path.clone(),
            error: e.to_string(),
        })?;
        return Ok(Some(content));
    }
    Ok(None)
}
