// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Failure classification
//!
//! Collaborator tools report failures as free text. All recognition of that
//! text happens here, once, so remediation logic elsewhere branches on a
//! `FailureKind` instead of scattering substring matches across steps.

/// Recognized classes of step failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Code-signing / provisioning profile problems from the build tool.
    Signing,
    /// The remote service already has a build with this build number.
    DuplicateBuild,
    /// Transient network trouble talking to the remote service.
    TransientNetwork,
    /// A bounded poll elapsed before the remote state became ready.
    PollTimeout,
    /// A human must complete an action outside this tool's control.
    ManualAction,
    /// Anything we don't recognize; reported verbatim, never retried.
    Unrecognized,
}

impl FailureKind {
    /// Whether the executor may re-run the step's action after this failure.
    ///
    /// Transient classes get a bounded retry (the step's action applies its
    /// remediation first); everything else halts the pipeline on first sight.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::Signing | FailureKind::DuplicateBuild | FailureKind::TransientNetwork
        )
    }

    /// Short human label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Signing => "signing",
            FailureKind::DuplicateBuild => "duplicate build",
            FailureKind::TransientNetwork => "transient network",
            FailureKind::PollTimeout => "poll timeout",
            FailureKind::ManualAction => "manual action required",
            FailureKind::Unrecognized => "unrecognized",
        }
    }
}

/// Classify combined tool output into a `FailureKind`.
///
/// Patterns here mirror the diagnostics the Apple toolchain actually emits;
/// adding a new recognized failure means adding one arm here.
pub fn classify_output(output: &str) -> FailureKind {
    let lower = output.to_lowercase();

    if lower.contains("code signing")
        || lower.contains("codesign")
        || lower.contains("provisioning profile")
        || lower.contains("no signing certificate")
    {
        return FailureKind::Signing;
    }

    if lower.contains("bundle version must be higher")
        || lower.contains("previously uploaded")
        || lower.contains("redundant binary upload")
        || lower.contains("duplicate build number")
    {
        return FailureKind::DuplicateBuild;
    }

    if lower.contains("timed out")
        || lower.contains("connection reset")
        || lower.contains("could not connect")
        || lower.contains("network connection was lost")
        || lower.contains("temporarily unavailable")
    {
        return FailureKind::TransientNetwork;
    }

    FailureKind::Unrecognized
}
