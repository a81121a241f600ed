// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Trademark-term scan
//!
//! Third-party metadata mentioning platform trademarks is a common review
//! rejection. Matches whole words, case-insensitively.

use regex::RegexBuilder;

use super::Finding;

/// Scan metadata texts for configured trademark terms.
pub fn scan_trademarks(metadata: &[(String, String)], terms: &[String]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for term in terms {
        let pattern = format!(r"\b{}\b", regex::escape(term));
        let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            continue;
        };

        for (field, text) in metadata {
            if re.is_match(text) {
                findings.push(Finding::error(
                    "trademarks",
                    format!("'{}' contains trademarked term '{}'", field, term),
                ));
            }
        }
    }

    findings
}
