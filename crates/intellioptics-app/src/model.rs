// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::DetectorId;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detector {
    pub id: DetectorId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_yes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_no: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patience_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_details: Option<Value>,
}

impl Detector {
    pub fn new(id: impl Into<DetectorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            query: None,
            group_name: None,
            confidence_threshold: None,
            status: None,
            projected_accuracy: None,
            accuracy_yes: None,
            accuracy_no: None,
            mode: None,
            patience_time: None,
            escalation_type: None,
            created_at: None,
            accuracy: None,
            accuracy_details: None,
        }
    }

    pub fn status_kind(&self) -> DetectorStatus {
        DetectorStatus::parse(self.status.as_deref())
    }

    pub fn status_label(&self) -> &str {
        text_or_na(self.status.as_deref())
    }

    pub fn query_label(&self) -> &str {
        text_or_na(self.query.as_deref())
    }

    pub fn group_label(&self) -> &str {
        text_or_na(self.group_name.as_deref())
    }

    pub fn confidence_label(&self) -> String {
        format_threshold(self.confidence_threshold)
    }

    /// Top-level fields win; `accuracy_details` and the legacy `accuracy`
    /// field only fill gaps.
    pub fn accuracy_breakdown(&self) -> AccuracyBreakdown {
        let detail = |key: &str| {
            self.accuracy_details
                .as_ref()
                .and_then(|details| details.get(key))
                .and_then(Value::as_f64)
        };

        AccuracyBreakdown {
            projected: self
                .projected_accuracy
                .or_else(|| detail("projected_accuracy"))
                .or(self.accuracy),
            yes: self.accuracy_yes.or_else(|| detail("accuracy_yes")),
            no: self.accuracy_no.or_else(|| detail("accuracy_no")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorStatus {
    On,
    Off,
}

impl DetectorStatus {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("ON") => Self::On,
            _ => Self::Off,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyMetric {
    Projected,
    Yes,
    No,
}

impl AccuracyMetric {
    pub const ALL: [Self; 3] = [Self::Projected, Self::Yes, Self::No];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Projected => "Projected Accuracy",
            Self::Yes => "ML Accuracy for \"YES\"",
            Self::No => "ML Accuracy for \"NO\"",
        }
    }

    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Projected => "PROJECTED",
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccuracyBreakdown {
    pub projected: Option<f64>,
    pub yes: Option<f64>,
    pub no: Option<f64>,
}

impl AccuracyBreakdown {
    pub fn get(&self, metric: AccuracyMetric) -> Option<f64> {
        match metric {
            AccuracyMetric::Projected => self.projected,
            AccuracyMetric::Yes => self.yes,
            AccuracyMetric::No => self.no,
        }
    }

    /// Metrics that carry a value, in chart order: YES, NO, projected.
    pub fn chart_values(&self) -> Vec<(AccuracyMetric, f64)> {
        [AccuracyMetric::Yes, AccuracyMetric::No, AccuracyMetric::Projected]
            .into_iter()
            .filter_map(|metric| self.get(metric).map(|value| (metric, value)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    #[default]
    Cards,
    Table,
}

impl LayoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cards" => Some(Self::Cards),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Cards => Self::Table,
            Self::Table => Self::Cards,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailKind {
    #[default]
    Bars,
    Gauges,
}

impl DetailKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bars => "bars",
            Self::Gauges => "gauges",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bars" => Some(Self::Bars),
            "gauges" => Some(Self::Gauges),
            _ => None,
        }
    }
}

pub fn text_or_na(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => NOT_AVAILABLE,
    }
}

/// Thresholds are fractions; rendered as a percentage with two decimals.
pub fn format_threshold(value: Option<f64>) -> String {
    match value {
        Some(fraction) => format!("{:.2}%", fraction * 100.0),
        None => NOT_AVAILABLE.to_owned(),
    }
}

/// Accuracies are already percentages.
pub fn format_accuracy(value: Option<f64>) -> String {
    match value {
        Some(percent) => format!("{percent}%"),
        None => NOT_AVAILABLE.to_owned(),
    }
}

pub fn format_patience(value: Option<f64>) -> String {
    match value {
        Some(seconds) => format!("{seconds}s"),
        None => NOT_AVAILABLE.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AccuracyMetric, Detector, DetectorStatus, LayoutKind, format_accuracy, format_threshold,
    };
    use serde_json::json;

    #[test]
    fn threshold_formats_as_two_decimal_percentage() {
        assert_eq!(format_threshold(Some(0.0)), "0.00%");
        assert_eq!(format_threshold(Some(0.9)), "90.00%");
        assert_eq!(format_threshold(Some(0.755)), "75.50%");
        assert_eq!(format_threshold(None), "N/A");
    }

    #[test]
    fn accuracy_keeps_zero_and_reports_missing_as_na() {
        assert_eq!(format_accuracy(Some(0.0)), "0%");
        assert_eq!(format_accuracy(Some(94.0)), "94%");
        assert_eq!(format_accuracy(Some(67.5)), "67.5%");
        assert_eq!(format_accuracy(None), "N/A");
    }

    #[test]
    fn only_exact_on_is_on() {
        assert_eq!(DetectorStatus::parse(Some("ON")), DetectorStatus::On);
        assert_eq!(DetectorStatus::parse(Some("OFF")), DetectorStatus::Off);
        assert_eq!(DetectorStatus::parse(Some("on")), DetectorStatus::Off);
        assert_eq!(DetectorStatus::parse(None), DetectorStatus::Off);
    }

    #[test]
    fn blank_optional_text_renders_na() {
        let mut detector = Detector::new("det_1", "Dock door");
        detector.query = Some("   ".to_owned());
        assert_eq!(detector.query_label(), "N/A");
        assert_eq!(detector.group_label(), "N/A");
        assert_eq!(detector.status_label(), "N/A");

        detector.group_name = Some("Loading bay".to_owned());
        assert_eq!(detector.group_label(), "Loading bay");
    }

    #[test]
    fn accuracy_breakdown_prefers_top_level_fields() {
        let detector: Detector = serde_json::from_value(json!({
            "id": "det_1",
            "name": "Forklift",
            "accuracy_yes": 91.0,
            "accuracy": 70.0,
            "accuracy_details": {
                "projected_accuracy": 88.0,
                "accuracy_yes": 10.0,
                "accuracy_no": 77.0
            }
        }))
        .expect("detector should decode");

        let breakdown = detector.accuracy_breakdown();
        assert_eq!(breakdown.projected, Some(88.0));
        assert_eq!(breakdown.yes, Some(91.0));
        assert_eq!(breakdown.no, Some(77.0));
    }

    #[test]
    fn accuracy_breakdown_falls_back_to_legacy_accuracy() {
        let mut detector = Detector::new("det_2", "Gate");
        detector.accuracy = Some(64.0);
        let breakdown = detector.accuracy_breakdown();
        assert_eq!(breakdown.projected, Some(64.0));
        assert_eq!(breakdown.yes, None);
        assert_eq!(
            breakdown.chart_values(),
            vec![(AccuracyMetric::Projected, 64.0)]
        );
    }

    #[test]
    fn layout_toggles_between_both_kinds() {
        assert_eq!(LayoutKind::Cards.toggled(), LayoutKind::Table);
        assert_eq!(LayoutKind::Table.toggled(), LayoutKind::Cards);
        assert_eq!(LayoutKind::parse("table"), Some(LayoutKind::Table));
        assert_eq!(LayoutKind::parse("grid"), None);
    }
}
