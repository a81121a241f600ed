// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Error types and the collaborator-failure taxonomy
//!
//! shipflow distinguishes invocation/configuration errors (this module's
//! `ShipflowError`) from step failures, which are classified into a small
//! set of `FailureKind`s that remediation logic branches on.

mod classify;

pub use classify::{classify_output, FailureKind};

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for shipflow operations
pub type ShipflowResult<T> = Result<T, ShipflowError>;

/// Main error type for shipflow
#[derive(Error, Debug, Diagnostic)]
pub enum ShipflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Tool Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Tool '{tool}' not found")]
    #[diagnostic(
        code(shipflow::tool_not_found),
        help("{suggestion}")
    )]
    ToolNotFound {
        tool: String,
        suggestion: String,
    },

    #[error("Tool '{tool}' invocation failed: {error}")]
    #[diagnostic(code(shipflow::tool_invocation_failed))]
    ToolInvocationFailed {
        tool: String,
        error: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Unknown resume step: '{name}'")]
    #[diagnostic(
        code(shipflow::unknown_resume_step),
        help("Valid steps: {available}")
    )]
    UnknownResumeStep { name: String, available: String },

    #[error("Pipeline has no steps")]
    #[diagnostic(code(shipflow::empty_pipeline))]
    EmptyPipeline,

    #[error("Step '{step}' halted the pipeline")]
    #[diagnostic(code(shipflow::pipeline_halted))]
    PipelineHalted {
        step: String,
        #[help]
        help: Option<String>,
    },

    #[error("Context key '{key}' was already set by an earlier step")]
    #[diagnostic(
        code(shipflow::context_overwrite),
        help("Context values are write-once per run; a step attempted to rediscover '{key}'")
    )]
    ContextOverwrite { key: String },

    #[error("Context key '{key}' has not been discovered yet")]
    #[diagnostic(
        code(shipflow::context_missing),
        help("A step that discovers '{key}' must run earlier in the pipeline")
    )]
    ContextMissing { key: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Project / Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("No Xcode project found under: {path}")]
    #[diagnostic(
        code(shipflow::project_not_found),
        help("Expected a *.xcodeproj directory inside the target path")
    )]
    ProjectNotFound { path: PathBuf },

    #[error("Project file is missing '{field}': {path}")]
    #[diagnostic(code(shipflow::project_field_missing))]
    ProjectFieldMissing { field: String, path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(shipflow::invalid_config))]
    InvalidConfig {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Invalid version string: '{version}'")]
    #[diagnostic(
        code(shipflow::invalid_version),
        help("Expected a dotted numeric version such as 1.4.2")
    )]
    InvalidVersion { version: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(shipflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(shipflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(shipflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(shipflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(shipflow::json_error))]
    Json { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(shipflow::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for ShipflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ShipflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ShipflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<glob::PatternError> for ShipflowError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl ShipflowError {
    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        let suggestion = match tool {
            "xcodebuild" => {
                "Install Xcode and the command-line tools (xcode-select --install)".to_string()
            }
            "swiftlint" => "Install SwiftLint: brew install swiftlint".to_string(),
            "asc" => "Install the App Store Connect CLI and ensure 'asc' is in your PATH".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", tool),
        };

        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion,
        }
    }
}
