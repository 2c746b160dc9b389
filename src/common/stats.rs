/// Arithmetic mean of the values that are present, or `None` if there are none.
/// Absent values are skipped, never counted as zero.
pub(crate) fn mean_present<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values.into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Round to a fixed number of decimal places (half away from zero).
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_absent_values() {
        assert_eq!(mean_present([Some(1.0), None, Some(3.0)]), Some(2.0));
    }

    #[test]
    fn mean_skips_nan() {
        assert_eq!(mean_present([Some(f64::NAN), Some(4.0)]), Some(4.0));
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean_present(Vec::<Option<f64>>::new()), None);
        assert_eq!(mean_present([None, None]), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(0.876, 2), 0.88);
        assert_eq!(round_to(1.0 - 0.93, 2), 0.07);
    }
}
