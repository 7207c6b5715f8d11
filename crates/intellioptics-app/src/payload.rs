// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde_json::Value;

use crate::error::LoadError;
use crate::model::Detector;

/// Extracts the detector list from a `{"results": [...]}` document. The
/// same shape arrives from the REST endpoint and from push updates.
pub fn detectors_from_value(value: Value) -> Result<Vec<Detector>, LoadError> {
    let Value::Object(mut object) = value else {
        return Err(LoadError::Format);
    };

    match object.remove("results") {
        Some(results @ Value::Array(_)) => {
            serde_json::from_value(results).map_err(|_| LoadError::Format)
        }
        _ => Err(LoadError::Format),
    }
}

pub fn parse_detector_list(body: &str) -> Result<Vec<Detector>, LoadError> {
    let value: Value = serde_json::from_str(body).map_err(|_| LoadError::Format)?;
    detectors_from_value(value)
}

/// The backend reports failures as `{"error": "..."}`.
pub fn error_message(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}
