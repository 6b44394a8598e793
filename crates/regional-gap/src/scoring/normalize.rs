//! Numeric helpers shared by the scorer and the unemployment rules.

/// Score given to every member of a peer group whose values are all equal.
pub const DEGENERATE_SCORE: f64 = 50.0;

/// Min-max rescaling of `value` into `0..=100`, inverted when lower is better.
pub fn min_max_score(value: f64, min: f64, max: f64, lower_is_better: bool) -> f64 {
    if max == min {
        return DEGENERATE_SCORE;
    }

    // Halved terms keep `max - min` finite for values near f64::MAX.
    let mut fraction = (value / 2.0 - min / 2.0) / (max / 2.0 - min / 2.0);
    if !fraction.is_finite() {
        return DEGENERATE_SCORE;
    }
    if lower_is_better {
        fraction = 1.0 - fraction;
    }

    (fraction * 100.0).clamp(0.0, 100.0)
}

/// Smallest and largest value, `None` for an empty slice.
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let (first, rest) = values.split_first()?;
    Some(rest.iter().fold((*first, *first), |(min, max), value| {
        (min.min(*value), max.max(*value))
    }))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[middle - 1] + sorted[middle]) / 2.0)
    } else {
        Some(sorted[middle])
    }
}

/// Sample standard deviation (n - 1 denominator); 0 for fewer than two values.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let Some(average) = mean(values) else {
        return 0.0;
    };
    let variance = values
        .iter()
        .map(|value| (value - average).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}
