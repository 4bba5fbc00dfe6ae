// netintel - Lookup Errors
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

/// Failure of a single external call (WHOIS socket, DoH request, registry request)
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("connect error: {server}: {source}")]
    Connect {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(#[source] std::io::Error),

    #[error("empty response from {0}")]
    EmptyResponse(String),

    #[error("HTTP status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("API status: {status} ({message})")]
    ApiStatus { status: String, message: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("lookup cancelled")]
    Cancelled,

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

impl LookupError {
    pub fn api_status(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiStatus {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Short note shown to the end user in place of the answer body
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "Could not connect to the server.",
            Self::Timeout(_) => "The server did not respond in time.",
            Self::Read(_) | Self::Write(_) | Self::EmptyResponse(_) => {
                "The server did not return a usable response."
            }
            Self::HttpStatus(_) | Self::ApiStatus { .. } | Self::Request(_) => {
                "The lookup service is unavailable."
            }
            Self::Decode(_) => "The lookup service returned an unexpected response.",
            Self::Cancelled => "The lookup was cancelled.",
            Self::InvalidIdentifier(_) => "The query is not a valid lookup target.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_detail() {
        let err = LookupError::Connect {
            server: "whois.example.net".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.to_string().contains("whois.example.net"));
        assert!(!err.user_message().contains("whois.example.net"));
    }

    #[test]
    fn test_api_status_display() {
        let err = LookupError::api_status("error", "Malformed input");
        assert_eq!(err.to_string(), "API status: error (Malformed input)");
    }
}
