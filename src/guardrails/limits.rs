// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Store metadata field limits
//!
//! App Store Connect rejects writes over these lengths, so catching them
//! locally saves a round trip. Lengths are in characters, not bytes.

use super::Finding;

/// Maximum character count for a metadata field, if App Store Connect
/// enforces one.
pub fn limit_for(field: &str) -> Option<usize> {
    match field {
        "name" => Some(30),
        "subtitle" => Some(30),
        "keywords" => Some(100),
        "promotional_text" => Some(170),
        "description" => Some(4000),
        "whats_new" => Some(4000),
        _ => None,
    }
}

/// Check one field against its limit.
pub fn check_limit(field: &str, value: &str) -> Option<Finding> {
    let limit = limit_for(field)?;
    let length = value.chars().count();
    if length > limit {
        Some(Finding::error(
            "field-limits",
            format!("'{}' is {} characters; limit is {}", field, length, limit),
        ))
    } else {
        None
    }
}
