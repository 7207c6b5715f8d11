// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use intellioptics_app::{Detector, LoadError, detectors_from_value, error_message};
use log::{debug, info, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("intellioptics-dashboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("backend.base_url must not be empty");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn detectors_url(&self) -> String {
        format!("{}/api/detectors", self.base_url)
    }

    /// One request, no retry. Every failure maps onto the dashboard's
    /// network / HTTP / format taxonomy.
    pub fn list_detectors(&self) -> Result<Vec<Detector>, LoadError> {
        let url = self.detectors_url();
        debug!("GET {url}");

        let response = self.http.get(&url).send().map_err(|error| {
            warn!("detector request to {url} failed: {}", error_chain(&error));
            LoadError::Network(error_chain(&error))
        })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| LoadError::Network(error_chain(&error)))?;

        if !status.is_success() {
            let error = http_error(status, &body);
            warn!("detector request returned {}: {error}", status.as_u16());
            return Err(error);
        }

        let value: Value = serde_json::from_str(&body).map_err(|_| LoadError::Format)?;
        if value.get("results").is_none()
            && let Some(message) = error_message(&value)
        {
            warn!("backend reported an error with status {}: {message}", status.as_u16());
            return Err(LoadError::http(status.as_u16(), Some(message)));
        }

        let detectors = detectors_from_value(value)?;
        info!("loaded {} detectors from {url}", detectors.len());
        Ok(detectors)
    }
}

fn http_error(status: StatusCode, body: &str) -> LoadError {
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        error_message(&value).or_else(|| {
            value
                .get("detail")
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
    });
    LoadError::http(status.as_u16(), message)
}

fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::{Client, http_error};
    use intellioptics_app::LoadError;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn base_url_is_trimmed_and_required() {
        let client = Client::new("http://localhost:8000///", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(client.detectors_url(), "http://localhost:8000/api/detectors");

        let error = Client::new("///", Duration::from_secs(1)).expect_err("empty url");
        assert!(error.to_string().contains("must not be empty"));
    }

    #[test]
    fn http_error_reads_error_then_detail_fields() {
        assert_eq!(
            http_error(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"db down"}"#),
            LoadError::http(500, Some("db down".to_owned()))
        );
        assert_eq!(
            http_error(StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#),
            LoadError::http(404, Some("Not Found".to_owned()))
        );
        assert_eq!(
            http_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").to_string(),
            "HTTP error 502"
        );
    }
}
