// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Project descriptor
//!
//! The on-disk version state of an Xcode project, read once at pipeline
//! start and written back in exactly one place (the bump step). No other
//! step edits project files.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::errors::{ShipflowError, ShipflowResult};

/// Versioning facts extracted from a project.pbxproj.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// Path to the project.pbxproj this descriptor was read from.
    pub pbxproj_path: PathBuf,
    /// Project name (the *.xcodeproj stem), used as the default scheme.
    pub name: String,
    /// MARKETING_VERSION, e.g. "1.4.2".
    pub marketing_version: String,
    /// CURRENT_PROJECT_VERSION, the monotonically increasing build number.
    pub build_number: u64,
    /// PRODUCT_BUNDLE_IDENTIFIER.
    pub bundle_id: String,
}

impl ProjectDescriptor {
    /// Locate and parse the project under a target directory.
    pub fn discover(target: &Path) -> ShipflowResult<Self> {
        let xcodeproj = find_xcodeproj(target)?;
        let pbxproj_path = xcodeproj.join("project.pbxproj");
        let name = xcodeproj
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "App".to_string());

        let content =
            std::fs::read_to_string(&pbxproj_path).map_err(|e| ShipflowError::FileReadError {
                path: pbxproj_path.clone(),
                error: e.to_string(),
            })?;

        let marketing_version = extract_field(&content, "MARKETING_VERSION").ok_or_else(|| {
            ShipflowError::ProjectFieldMissing {
                field: "MARKETING_VERSION".to_string(),
                path: pbxproj_path.clone(),
            }
        })?;

        let build_number: u64 = extract_field(&content, "CURRENT_PROJECT_VERSION")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ShipflowError::ProjectFieldMissing {
                field: "CURRENT_PROJECT_VERSION".to_string(),
                path: pbxproj_path.clone(),
            })?;

        let bundle_id = extract_field(&content, "PRODUCT_BUNDLE_IDENTIFIER").ok_or_else(|| {
            ShipflowError::ProjectFieldMissing {
                field: "PRODUCT_BUNDLE_IDENTIFIER".to_string(),
                path: pbxproj_path.clone(),
            }
        })?;

        Ok(Self {
            pbxproj_path,
            name,
            marketing_version,
            build_number,
            bundle_id,
        })
    }

    /// Write the current version fields back to the project file.
    ///
    /// Rewrites every occurrence; Xcode duplicates these settings per build
    /// configuration and they must stay in sync.
    pub fn store(&self) -> ShipflowResult<()> {
        let content = std::fs::read_to_string(&self.pbxproj_path).map_err(|e| {
            ShipflowError::FileReadError {
                path: self.pbxproj_path.clone(),
                error: e.to_string(),
            }
        })?;

        let content = replace_field(&content, "MARKETING_VERSION", &self.marketing_version);
        let content = replace_field(
            &content,
            "CURRENT_PROJECT_VERSION",
            &self.build_number.to_string(),
        );

        std::fs::write(&self.pbxproj_path, content).map_err(|e| ShipflowError::FileWriteError {
            path: self.pbxproj_path.clone(),
            error: e.to_string(),
        })
    }

    /// Next patch version, e.g. "1.4.2" -> "1.4.3".
    pub fn next_patch_version(&self) -> ShipflowResult<String> {
        let mut parts: Vec<u64> = Vec::new();
        for part in self.marketing_version.split('.') {
            parts.push(part.parse().map_err(|_| ShipflowError::InvalidVersion {
                version: self.marketing_version.clone(),
            })?);
        }
        if parts.is_empty() {
            return Err(ShipflowError::InvalidVersion {
                version: self.marketing_version.clone(),
            });
        }
        *parts.last_mut().unwrap() += 1;
        Ok(parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("."))
    }
}

/// Find the single *.xcodeproj directory under a target.
fn find_xcodeproj(target: &Path) -> ShipflowResult<PathBuf> {
    let entries = std::fs::read_dir(target).map_err(|e| ShipflowError::FileReadError {
        path: target.to_path_buf(),
        error: e.to_string(),
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e == "xcodeproj").unwrap_or(false) {
            return Ok(path);
        }
    }

    Err(ShipflowError::ProjectNotFound {
        path: target.to_path_buf(),
    })
}

fn field_regex(field: &str) -> Regex {
    // pbxproj lines look like: \t\tMARKETING_VERSION = 1.4.2;
    Regex::new(&format!(r#"{field}\s*=\s*"?([^";\n]+)"?\s*;"#)).expect("valid field regex")
}

fn extract_field(content: &str, field: &str) -> Option<String> {
    field_regex(field)
        .captures(content)
        .map(|c| c[1].trim().to_string())
}

fn replace_field(content: &str, field: &str, value: &str) -> String {
    field_regex(field)
        .replace_all(content, format!("{field} = {value};"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PBXPROJ: &str = r#"
		buildSettings = {
			CURRENT_PROJECT_VERSION = 42;
			MARKETING_VERSION = 1.4.2;
			PRODUCT_BUNDLE_IDENTIFIER = com.example.zephyr;
		};
		buildSettings = {
			CURRENT_PROJECT_VERSION = 42;
			MARKETING_VERSION = 1.4.2;
			PRODUCT_BUNDLE_IDENTIFIER = com.example.zephyr;
		};
"#;

    fn fixture_project() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let xcodeproj = dir.path().join("Zephyr.xcodeproj");
        std::fs::create_dir(&xcodeproj).unwrap();
        std::fs::write(xcodeproj.join("project.pbxproj"), PBXPROJ).unwrap();
        (dir, xcodeproj)
    }

    #[test]
    fn test_discover_reads_fields() {
        let (dir, _) = fixture_project();
        let descriptor = ProjectDescriptor::discover(dir.path()).unwrap();

        assert_eq!(descriptor.name, "Zephyr");
        assert_eq!(descriptor.marketing_version, "1.4.2");
        assert_eq!(descriptor.build_number, 42);
        assert_eq!(descriptor.bundle_id, "com.example.zephyr");
    }

    #[test]
    fn test_discover_without_project_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProjectDescriptor::discover(dir.path());
        assert!(matches!(err, Err(ShipflowError::ProjectNotFound { .. })));
    }

    #[test]
    fn test_store_rewrites_all_occurrences() {
        let (dir, xcodeproj) = fixture_project();
        let mut descriptor = ProjectDescriptor::discover(dir.path()).unwrap();

        descriptor.marketing_version = "1.5.0".to_string();
        descriptor.build_number = 43;
        descriptor.store().unwrap();

        let content = std::fs::read_to_string(xcodeproj.join("project.pbxproj")).unwrap();
        assert_eq!(content.matches("MARKETING_VERSION = 1.5.0;").count(), 2);
        assert_eq!(content.matches("CURRENT_PROJECT_VERSION = 43;").count(), 2);
        assert!(!content.contains("1.4.2"));
    }

    #[test]
    fn test_next_patch_version() {
        let (dir, _) = fixture_project();
        let descriptor = ProjectDescriptor::discover(dir.path()).unwrap();
        assert_eq!(descriptor.next_patch_version().unwrap(), "1.4.3");
    }

    #[test]
    fn test_next_patch_version_rejects_garbage() {
        let (dir, _) = fixture_project();
        let mut descriptor = ProjectDescriptor::discover(dir.path()).unwrap();
        descriptor.marketing_version = "1.x".to_string();
        assert!(descriptor.next_patch_version().is_err());
    }
}
