use std::fmt;

use serde::{Deserialize, Serialize};

/// How an edge's PM2.5 level moves relative to the reference threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Below the threshold before and after.
    RemainsBelow,
    /// At or above the threshold before, below after.
    Improved,
    /// At or above the threshold before and after.
    RemainsAbove,
    /// Below before, at or above after. Flagged rather than trusted.
    #[serde(rename = "missing/anomalous")]
    Anomalous,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [Outcome::RemainsBelow, Outcome::Improved, Outcome::RemainsAbove, Outcome::Anomalous];

    /// Classify a baseline/simulated pair. Depends on nothing else.
    pub fn classify(initial: f64, simulated: f64, threshold: f64) -> Self {
        if simulated < threshold && initial < threshold {
            Outcome::RemainsBelow
        } else if simulated < threshold && initial >= threshold {
            Outcome::Improved
        } else if simulated >= threshold && initial >= threshold {
            Outcome::RemainsAbove
        } else {
            Outcome::Anomalous
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::RemainsBelow => "remains-below",
            Outcome::Improved => "improved",
            Outcome::RemainsAbove => "remains-above",
            Outcome::Anomalous => "missing/anomalous",
        }
    }

    /// Legend text for maps.
    pub fn legend(&self) -> &'static str {
        match self {
            Outcome::RemainsBelow => "PM2.5 Remain Below Threshold",
            Outcome::Improved => "PM2.5 Improved",
            Outcome::RemainsAbove => "PM2.5 Remain Above Threshold",
            Outcome::Anomalous => "Missing Data",
        }
    }

    /// Map colour (hex).
    pub fn color(&self) -> &'static str {
        match self {
            Outcome::RemainsBelow => "#1a9641",
            Outcome::Improved => "#d7191c",
            Outcome::RemainsAbove => "#fdae61",
            Outcome::Anomalous => "#ffffbf",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_way_table() {
        assert_eq!(Outcome::classify(10.0, 11.0, 12.0), Outcome::RemainsBelow);
        assert_eq!(Outcome::classify(13.0, 11.0, 12.0), Outcome::Improved);
        assert_eq!(Outcome::classify(13.0, 14.0, 12.0), Outcome::RemainsAbove);
        assert_eq!(Outcome::classify(11.9, 12.1, 12.0), Outcome::Anomalous);
    }

    #[test]
    fn threshold_itself_counts_as_above() {
        assert_eq!(Outcome::classify(12.0, 12.0, 12.0), Outcome::RemainsAbove);
        assert_eq!(Outcome::classify(12.0, 11.999, 12.0), Outcome::Improved);
        assert_eq!(Outcome::classify(11.999, 12.0, 12.0), Outcome::Anomalous);
    }

    #[test]
    fn exactly_one_class_over_a_grid() {
        let values = [0.0, 5.0, 11.99, 12.0, 12.01, 30.0];
        for &initial in &values {
            for &simulated in &values {
                let outcome = Outcome::classify(initial, simulated, 12.0);
                let matches = [
                    initial < 12.0 && simulated < 12.0,
                    initial >= 12.0 && simulated < 12.0,
                    initial >= 12.0 && simulated >= 12.0,
                    initial < 12.0 && simulated >= 12.0,
                ];
                assert_eq!(matches.iter().filter(|&&m| m).count(), 1);
                let idx = Outcome::ALL.iter().position(|&o| o == outcome).unwrap();
                assert!(matches[idx], "{initial} -> {simulated} classified as {outcome}");
            }
        }
    }

    #[test]
    fn labels_and_colors() {
        assert_eq!(Outcome::Anomalous.to_string(), "missing/anomalous");
        assert_eq!(Outcome::Improved.color(), "#d7191c");
        assert_eq!(serde_json::to_string(&Outcome::RemainsAbove).unwrap(), "\"remains-above\"");
        assert_eq!(serde_json::to_string(&Outcome::Anomalous).unwrap(), "\"missing/anomalous\"");
    }
}
