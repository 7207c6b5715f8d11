// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

pub const FORMAT_ERROR_MESSAGE: &str = "unexpected API response format";

/// Why a detector list could not be loaded. The display string is exactly
/// what the dashboard shows after `Error: `.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("{0}")]
    Network(String),
    #[error("{}", http_message(.status, .message))]
    Http { status: u16, message: Option<String> },
    #[error("unexpected API response format")]
    Format,
}

impl LoadError {
    pub fn http(status: u16, message: Option<String>) -> Self {
        let message = message.filter(|text| !text.trim().is_empty());
        Self::Http { status, message }
    }
}

fn http_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("HTTP error {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{FORMAT_ERROR_MESSAGE, LoadError};

    #[test]
    fn http_error_prefers_server_message() {
        let error = LoadError::http(500, Some("db down".to_owned()));
        assert_eq!(error.to_string(), "db down");
        assert!(matches!(error, LoadError::Http { status: 500, .. }));
    }

    #[test]
    fn http_error_falls_back_to_status_code() {
        assert_eq!(LoadError::http(502, None).to_string(), "HTTP error 502");
        assert_eq!(
            LoadError::http(404, Some("  ".to_owned())).to_string(),
            "HTTP error 404"
        );
    }

    #[test]
    fn network_and_format_messages() {
        let network = LoadError::Network("connection refused".to_owned());
        assert_eq!(network.to_string(), "connection refused");
        assert_eq!(LoadError::Format.to_string(), FORMAT_ERROR_MESSAGE);
    }
}
