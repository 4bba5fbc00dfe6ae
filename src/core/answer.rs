// netintel - Answer Model
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    Dns,
    Whois,
    Asn,
}

impl AnswerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerKind::Dns => "dns",
            AnswerKind::Whois => "whois",
            AnswerKind::Asn => "asn",
        }
    }
}

/// Result of a handler: display lines plus a machine-readable field map
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub kind: AnswerKind,
    pub query: String,
    pub title: String,
    pub display: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "sourceURL", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl Answer {
    pub fn new(kind: AnswerKind, query: &str, title: impl Into<String>) -> Self {
        Self {
            kind,
            query: query.to_string(),
            title: title.into(),
            display: Vec::new(),
            fields: None,
            source: None,
            source_url: None,
        }
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.display.push(line.into());
        self
    }

    /// Insert a field; `Value::Null` and empty strings/arrays are skipped
    pub fn field(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let empty = match &value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            _ => false,
        };
        if !empty {
            self.fields
                .get_or_insert_with(BTreeMap::new)
                .insert(key.to_string(), value);
        }
        self
    }

    pub fn with_source(mut self, source: impl Into<String>, url: Option<String>) -> Self {
        self.source = Some(source.into());
        self.source_url = url;
        self
    }

    pub fn get_field(&self, key: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|f| f.get(key))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in &self.display {
            writeln!(f, "{}", line)?;
        }
        if let Some(source) = &self.source {
            match &self.source_url {
                Some(url) => writeln!(f, "\nSource: {} ({})", source, url)?,
                None => writeln!(f, "\nSource: {}", source)?,
            }
        }
        Ok(())
    }
}
