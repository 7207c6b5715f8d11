// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Server-assigned detector identifier. The backend sends either a string
/// (`det_...`) or a bare integer; both are held as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DetectorId(String);

impl DetectorId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DetectorId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for DetectorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for DetectorId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for DetectorId {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DetectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl<'de> Deserialize<'de> for DetectorId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(value) => value,
            RawId::Signed(value) => value.to_string(),
            RawId::Unsigned(value) => value.to_string(),
        };
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::DetectorId;

    #[test]
    fn accepts_string_and_integer_ids() {
        let text: DetectorId =
            serde_json::from_str("\"det_2x\"").expect("string id should decode");
        assert_eq!(text.as_str(), "det_2x");

        let number: DetectorId = serde_json::from_str("17").expect("integer id should decode");
        assert_eq!(number, DetectorId::from(17));
    }

    #[test]
    fn rejects_structured_ids() {
        assert!(serde_json::from_str::<DetectorId>("{\"id\":1}").is_err());
        assert!(serde_json::from_str::<DetectorId>("null").is_err());
    }
}
