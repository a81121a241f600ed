// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Small shared utilities

mod spinner;

pub use spinner::create_spinner;

/// Maximum diagnostic lines surfaced for a halted step.
pub const MAX_DIAGNOSTIC_LINES: usize = 20;

/// Keep at most `max` lines of text, noting how many were dropped.
pub fn truncate_lines(text: &str, max: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= max {
        return text.trim_end().to_string();
    }

    let mut kept: Vec<String> = lines[..max].iter().map(|l| l.to_string()).collect();
    kept.push(format!("... ({} more lines)", lines.len() - max));
    kept.join("\n")
}
