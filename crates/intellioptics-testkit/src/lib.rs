// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use intellioptics_app::{Detector, DetectorId};
use serde_json::{Value, json};

const DEMO_DETECTORS: [DemoDetector; 8] = [
    DemoDetector {
        name: "Loading Dock Door",
        query: "Is the loading dock door open?",
        group: "Warehouse",
        threshold: 0.9,
        on: true,
        accuracy: Some((92.0, 95.5, 88.0)),
    },
    DemoDetector {
        name: "Forklift in Aisle 3",
        query: "Is there a forklift in aisle 3?",
        group: "Warehouse",
        threshold: 0.75,
        on: true,
        accuracy: Some((84.0, 90.0, 71.0)),
    },
    DemoDetector {
        name: "Hard Hat Compliance",
        query: "Is every person wearing a hard hat?",
        group: "Safety",
        threshold: 0.85,
        on: true,
        accuracy: Some((80.0, 94.0, 67.0)),
    },
    DemoDetector {
        name: "Spill on Floor",
        query: "Is there liquid spilled on the floor?",
        group: "Safety",
        threshold: 0.8,
        on: false,
        accuracy: None,
    },
    DemoDetector {
        name: "Parking Lot Gate",
        query: "Is the parking lot gate closed?",
        group: "Perimeter",
        threshold: 0.95,
        on: true,
        accuracy: Some((97.0, 98.0, 96.5)),
    },
    DemoDetector {
        name: "Cam1 Shelf Stock",
        query: "Is the top shelf empty?",
        group: "Retail",
        threshold: 0.7,
        on: true,
        accuracy: Some((76.0, 81.0, 70.0)),
    },
    DemoDetector {
        name: "Smoke Near Oven",
        query: "Is there visible smoke near the oven?",
        group: "Kitchen",
        threshold: 0.99,
        on: false,
        accuracy: Some((68.0, 60.0, 74.0)),
    },
    DemoDetector {
        name: "Delivery Van Present",
        query: "Is a delivery van parked at the curb?",
        group: "",
        threshold: 0.5,
        on: true,
        accuracy: None,
    },
];

struct DemoDetector {
    name: &'static str,
    query: &'static str,
    group: &'static str,
    threshold: f64,
    on: bool,
    accuracy: Option<(f64, f64, f64)>,
}

/// A detector shaped like the backend's list payload: enabled, with a
/// query, a group and a 90% threshold, but no accuracy numbers.
pub fn detector(id: impl Into<DetectorId>, name: &str) -> Detector {
    let mut detector = Detector::new(id, name);
    detector.query = Some(format!("Is {name} active?"));
    detector.group_name = Some("Default".to_owned());
    detector.confidence_threshold = Some(0.9);
    detector.status = Some("ON".to_owned());
    detector
}

pub fn detector_with_accuracy(
    id: impl Into<DetectorId>,
    name: &str,
    projected: f64,
    yes: f64,
    no: f64,
) -> Detector {
    let mut detector = detector(id, name);
    detector.projected_accuracy = Some(projected);
    detector.accuracy_yes = Some(yes);
    detector.accuracy_no = Some(no);
    detector
}

pub fn results_json(detectors: &[Detector]) -> Value {
    json!({ "results": detectors })
}

pub fn results_body(detectors: &[Detector]) -> String {
    results_json(detectors).to_string()
}

pub fn error_body(message: &str) -> String {
    json!({ "error": message }).to_string()
}

/// Seed data for offline demo runs.
pub fn demo_detectors() -> Vec<Detector> {
    DEMO_DETECTORS
        .iter()
        .enumerate()
        .map(|(index, demo)| {
            let mut detector = Detector::new(format!("det_demo{:02}", index + 1), demo.name);
            detector.query = Some(demo.query.to_owned());
            detector.group_name = (!demo.group.is_empty()).then(|| demo.group.to_owned());
            detector.confidence_threshold = Some(demo.threshold);
            detector.status = Some(if demo.on { "ON" } else { "OFF" }.to_owned());
            detector.mode = Some("BINARY".to_owned());
            detector.patience_time = Some(30.0);
            detector.escalation_type = Some("STANDARD".to_owned());
            if let Some((projected, yes, no)) = demo.accuracy {
                detector.projected_accuracy = Some(projected);
                detector.accuracy_yes = Some(yes);
                detector.accuracy_no = Some(no);
            }
            detector
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{demo_detectors, detector, error_body, results_body};
    use intellioptics_app::parse_detector_list;
    use std::collections::BTreeSet;

    #[test]
    fn results_body_parses_back_into_the_same_list() {
        let list = vec![detector(1, "Cam1"), detector("det_x", "Sensor2")];
        let parsed = parse_detector_list(&results_body(&list)).expect("body should parse");
        assert_eq!(parsed, list);
    }

    #[test]
    fn error_body_carries_message() {
        assert_eq!(error_body("db down"), r#"{"error":"db down"}"#);
    }

    #[test]
    fn demo_detectors_have_unique_ids() {
        let demo = demo_detectors();
        let ids = demo
            .iter()
            .map(|detector| detector.id.clone())
            .collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), demo.len());
        assert!(demo.iter().any(|detector| detector.accuracy_yes.is_none()));
    }
}
