use serde::Serialize;

use super::config::SimulationConfig;

/// `ln(1 + income / scale)`: grows with income but flattens out for outliers.
#[inline]
pub fn income_modifier(mean_income: f64, scale: f64) -> f64 {
    (mean_income / scale).ln_1p()
}

/// `ln(1 + density / scale)`.
#[inline]
pub fn density_modifier(mean_density: f64, scale: f64) -> f64 {
    (mean_density / scale).ln_1p()
}

/// The five additive effect terms for one edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EffectTerms {
    pub transit: f64,
    pub ev: f64,
    pub active_travel: f64,
    pub solo_drive: f64,
    pub short_commute: f64,
}

impl EffectTerms {
    /// Compute the terms from the two modifiers and the mean transit share.
    /// A missing transit share never satisfies the short-commute condition.
    pub fn compute(income_mod: f64, density_mod: f64, transit_share: Option<f64>, config: &SimulationConfig) -> Self {
        let c = &config.coefficients;
        let transit_is_common = transit_share.is_some_and(|share| share > config.transit_share_cutoff);

        Self {
            transit: c.transit * income_mod,
            ev: c.ev * income_mod,
            active_travel: c.active_travel * density_mod,
            solo_drive: c.solo_drive * income_mod,
            short_commute: if transit_is_common { c.short_commute * density_mod } else { 0.0 },
        }
    }

    /// Sum of all five terms.
    #[inline]
    pub fn total(&self) -> f64 {
        self.transit + self.ev + self.active_travel + self.solo_drive + self.short_commute
    }

    /// The income-driven share of the total (transit + EV + solo driving).
    #[inline]
    pub fn income_effect(&self) -> f64 {
        self.transit + self.ev + self.solo_drive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn modifiers_are_log_one_plus_ratio() {
        assert!((income_modifier(125_000.0, 100_000.0) - 2.25f64.ln()).abs() < EPS);
        assert!((density_modifier(1_250.0, 1_000.0) - 2.25f64.ln()).abs() < EPS);
        assert_eq!(income_modifier(0.0, 100_000.0), 0.0);
    }

    #[test]
    fn modifiers_grow_monotonically() {
        let mut prev = 0.0;
        for income in [10_000.0, 50_000.0, 100_000.0, 250_000.0, 1_000_000.0] {
            let m = income_modifier(income, 100_000.0);
            assert!(m > prev);
            prev = m;
        }
    }

    #[test]
    fn short_commute_needs_common_transit() {
        let config = SimulationConfig::default();
        let with = EffectTerms::compute(1.0, 2.0, Some(0.2), &config);
        let at_cutoff = EffectTerms::compute(1.0, 2.0, Some(0.1), &config);
        let missing = EffectTerms::compute(1.0, 2.0, None, &config);

        assert!((with.short_commute - 0.1).abs() < EPS);
        assert_eq!(at_cutoff.short_commute, 0.0);
        assert_eq!(missing.short_commute, 0.0);
    }

    #[test]
    fn terms_scale_with_their_modifier() {
        let terms = EffectTerms::compute(2.0, 3.0, Some(0.5), &SimulationConfig::default());
        assert!((terms.transit - -0.06).abs() < EPS);
        assert!((terms.ev - 0.14).abs() < EPS);
        assert!((terms.active_travel - 0.12).abs() < EPS);
        assert!((terms.solo_drive - -0.12).abs() < EPS);
        assert!((terms.short_commute - 0.15).abs() < EPS);
        assert!((terms.total() - 0.23).abs() < EPS);
        assert!((terms.income_effect() - -0.04).abs() < EPS);
    }
}
