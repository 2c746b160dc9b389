use std::fmt;

use serde::Serialize;

use super::effect::EffectTerms;

/// The named effect sequences collected per simulated edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    #[serde(rename = "income_effect")]
    Income,
    #[serde(rename = "density_effect")]
    Density,
    #[serde(rename = "ev_effect")]
    Ev,
    #[serde(rename = "transit_effect")]
    Transit,
    #[serde(rename = "drive_effect")]
    Drive,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [EffectKind::Income, EffectKind::Density, EffectKind::Ev, EffectKind::Transit, EffectKind::Drive];

    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Income => "income_effect",
            EffectKind::Density => "density_effect",
            EffectKind::Ev => "ev_effect",
            EffectKind::Transit => "transit_effect",
            EffectKind::Drive => "drive_effect",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Mean of one effect sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EffectMean {
    pub effect: EffectKind,
    pub mean: f64,
}

/// Append-only record of effect terms, one entry per simulated edge in
/// processing order. Only used for reporting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectSummary {
    income: Vec<f64>,
    density: Vec<f64>,
    ev: Vec<f64>,
    transit: Vec<f64>,
    drive: Vec<f64>,
}

impl EffectSummary {
    pub fn new() -> Self { Self::default() }

    /// Record the terms of one edge.
    pub fn push(&mut self, terms: &EffectTerms) {
        self.income.push(terms.income_effect());
        self.density.push(terms.active_travel);
        self.ev.push(terms.ev);
        self.transit.push(terms.transit);
        self.drive.push(terms.solo_drive);
    }

    /// Number of recorded edges.
    #[inline] pub fn len(&self) -> usize { self.income.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.income.is_empty() }

    /// The recorded values of one sequence.
    pub fn values(&self, kind: EffectKind) -> &[f64] {
        match kind {
            EffectKind::Income => &self.income,
            EffectKind::Density => &self.density,
            EffectKind::Ev => &self.ev,
            EffectKind::Transit => &self.transit,
            EffectKind::Drive => &self.drive,
        }
    }

    /// Mean of each non-empty sequence, sorted ascending by magnitude.
    /// Ordered by `|mean|`, not by signed value: a large negative effect sorts last.
    /// Ties keep the fixed sequence order.
    pub fn means(&self) -> Vec<EffectMean> {
        let mut means = EffectKind::ALL.iter()
            .filter_map(|&effect| {
                let values = self.values(effect);
                (!values.is_empty()).then(|| EffectMean { effect, mean: values.iter().sum::<f64>() / values.len() as f64 })
            })
            .collect::<Vec<_>>();

        means.sort_by(|a, b| a.mean.abs().total_cmp(&b.mean.abs()));
        means
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(transit: f64, ev: f64, active_travel: f64, solo_drive: f64) -> EffectTerms {
        EffectTerms { transit, ev, active_travel, solo_drive, short_commute: 0.5 }
    }

    #[test]
    fn push_routes_terms_to_named_sequences() {
        let mut summary = EffectSummary::new();
        summary.push(&terms(-0.03, 0.07, 0.04, -0.06));

        assert_eq!(summary.len(), 1);
        assert!((summary.values(EffectKind::Income)[0] - -0.02).abs() < 1e-12);
        assert_eq!(summary.values(EffectKind::Density), &[0.04]);
        assert_eq!(summary.values(EffectKind::Ev), &[0.07]);
        assert_eq!(summary.values(EffectKind::Transit), &[-0.03]);
        assert_eq!(summary.values(EffectKind::Drive), &[-0.06]);
    }

    #[test]
    fn sequences_preserve_processing_order() {
        let mut summary = EffectSummary::new();
        summary.push(&terms(0.0, 1.0, 0.0, 0.0));
        summary.push(&terms(0.0, 2.0, 0.0, 0.0));
        summary.push(&terms(0.0, 3.0, 0.0, 0.0));
        assert_eq!(summary.values(EffectKind::Ev), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn means_are_sorted_by_magnitude() {
        let mut summary = EffectSummary::new();
        summary.push(&terms(-0.03, 0.07, 0.04, -0.06));
        summary.push(&terms(-0.01, 0.05, 0.02, -0.04));

        let means = summary.means();
        let order = means.iter().map(|m| m.effect).collect::<Vec<_>>();
        // |income| = 0.01, |transit| = 0.02, |density| = 0.03, |drive| = 0.05, |ev| = 0.06
        assert_eq!(order, vec![EffectKind::Income, EffectKind::Transit, EffectKind::Density, EffectKind::Drive, EffectKind::Ev]);
        assert!((means[4].mean - 0.06).abs() < 1e-12);
        assert!((means[3].mean - -0.05).abs() < 1e-12);
    }

    #[test]
    fn empty_summary_has_no_means() {
        assert!(EffectSummary::new().means().is_empty());
    }

    #[test]
    fn means_serialize_with_sequence_names() {
        let mut summary = EffectSummary::new();
        summary.push(&terms(0.0, 0.0, 0.0, 0.0));
        let json = serde_json::to_string(&summary.means()[0]).unwrap();
        assert!(json.contains("\"effect\":\"income_effect\""), "{json}");
    }
}
