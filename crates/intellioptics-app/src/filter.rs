// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::Detector;

/// Case-insensitive substring match on `name`. An empty query keeps every
/// detector in its original order.
pub fn filter_detectors<'a>(detectors: &'a [Detector], search: &str) -> Vec<&'a Detector> {
    if search.is_empty() {
        return detectors.iter().collect();
    }

    let needle = search.to_lowercase();
    detectors
        .iter()
        .filter(|detector| detector.name.to_lowercase().contains(&needle))
        .collect()
}
