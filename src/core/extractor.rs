// netintel - Query Extractor
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Trigger patterns that both recognize a handler's query syntax and pull out
//! its target identifier and optional qualifier.

use regex::Regex;

/// One dotted domain: alphanumeric labels with internal hyphens, at least two labels
pub const DOMAIN_PATTERN: &str =
    r"[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)+";

/// DNS record type qualifier
pub const RECORD_TYPE_PATTERN: &str = r"a|aaaa|cname|mx|ns|txt|all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Index of the trigger pattern that matched
    pub pattern: usize,
    pub identifier: Option<String>,
    pub qualifier: Option<String>,
}

/// Ordered, case-insensitive trigger patterns; first match wins.
///
/// Capture group 1 is the identifier, group 2 (if present) the qualifier.
#[derive(Debug, Clone)]
pub struct TriggerSet {
    patterns: Vec<Regex>,
}

impl TriggerSet {
    pub fn new(patterns: &[String]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.patterns.iter().any(|re| re.is_match(query))
    }

    pub fn extract(&self, query: &str) -> Option<Extraction> {
        let query = query.trim();
        self.patterns.iter().enumerate().find_map(|(index, re)| {
            let caps = re.captures(query)?;
            let group = |i: usize| {
                caps.get(i)
                    .map(|m| m.as_str().trim())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            Some(Extraction {
                pattern: index,
                identifier: group(1),
                qualifier: group(2),
            })
        })
    }
}
