use rand::Rng;
use serde_json::Value;

use crate::models::{SixMonthSeries, SERIES_LEN};

/// Source of the bounded noise added to synthesized points.
pub trait JitterSource {
    /// Returns a value in `[-magnitude, magnitude]`.
    fn jitter(&mut self, magnitude: f64) -> f64;
}

/// Uniform jitter drawn from any `rand` generator.
#[derive(Debug)]
pub struct RandomJitter<R>(pub R);

impl<R: Rng> JitterSource for RandomJitter<R> {
    fn jitter(&mut self, magnitude: f64) -> f64 {
        if magnitude <= 0.0 {
            return 0.0;
        }
        self.0.gen_range(-magnitude..=magnitude)
    }
}

/// Always zero. Makes synthesis deterministic.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn jitter(&mut self, _magnitude: f64) -> f64 {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub baseline: f64,
    pub step: f64,
    pub jitter: f64,
}

pub const COUNT_SYNTHESIS: SynthesisParams = SynthesisParams {
    baseline: 50.0,
    step: 0.3,
    jitter: 0.4,
};

pub const SCORE_SYNTHESIS: SynthesisParams = SynthesisParams {
    baseline: 65.0,
    step: 1.5,
    jitter: 2.0,
};

/// Raw activity counts grow slowly; scores climb faster and noisier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Count,
    Score,
}

impl SeriesKind {
    pub fn params(self) -> SynthesisParams {
        match self {
            SeriesKind::Count => COUNT_SYNTHESIS,
            SeriesKind::Score => SCORE_SYNTHESIS,
        }
    }
}

/// Coerces any series into exactly six values.
///
/// More than six values keeps the most recent six. Fewer are padded at the
/// end with synthesized points growing from the last real value; an empty
/// series is synthesized entirely from the kind's baseline. Input values are
/// never altered, synthesized ones are rounded to one decimal.
pub fn normalize_to_six_months(
    series: &[f64],
    kind: SeriesKind,
    jitter: &mut impl JitterSource,
) -> SixMonthSeries {
    let params = kind.params();
    let mut values = [0.0; SERIES_LEN];

    if series.len() >= SERIES_LEN {
        values.copy_from_slice(&series[series.len() - SERIES_LEN..]);
        return SixMonthSeries(values);
    }

    let (mut previous, start) = match series.last() {
        Some(last) => {
            values[..series.len()].copy_from_slice(series);
            (*last, series.len())
        }
        None => {
            values[0] = round1(params.baseline);
            (values[0], 1)
        }
    };

    for slot in values.iter_mut().skip(start) {
        let next = previous + params.step + jitter.jitter(params.jitter);
        let next = if next.is_finite() { next } else { f64::MAX };
        *slot = round1(next.max(0.0));
        previous = *slot;
    }

    SixMonthSeries(values)
}

/// Best-effort numeric read of a JSON scalar. Unparseable input becomes 0.
pub fn coerce_number(value: &Value) -> f64 {
    let number = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if number.is_finite() {
        number
    } else {
        0.0
    }
}

/// Reads a JSON array (or a bare scalar) as a numeric series.
pub fn coerce_series(value: &Value) -> Vec<f64> {
    match value {
        Value::Array(items) => items.iter().map(coerce_number).collect(),
        Value::Number(_) | Value::String(_) => vec![coerce_number(value)],
        _ => Vec::new(),
    }
}

/// Rounds to one decimal. Values too large to scale are returned as-is.
pub fn round1(value: f64) -> f64 {
    let scaled = value * 10.0;
    if scaled.is_finite() {
        scaled.round() / 10.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn output_is_always_six_long() {
        let mut rng = RandomJitter(StdRng::seed_from_u64(7));
        for len in 0..12 {
            let input: Vec<f64> = (0..len).map(|i| i as f64).collect();
            let out = normalize_to_six_months(&input, SeriesKind::Count, &mut rng);
            assert_eq!(out.values().len(), SERIES_LEN);
        }
    }

    #[test]
    fn exact_length_passes_through() {
        let input = [10.88, 6.89, 11.74, 11.96, 18.13, 21.23];
        let out = normalize_to_six_months(&input, SeriesKind::Count, &mut NoJitter);
        assert_eq!(out.values(), &input);
    }

    #[test]
    fn longer_input_keeps_most_recent_six() {
        let input = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let out = normalize_to_six_months(&input, SeriesKind::Score, &mut NoJitter);
        assert_eq!(out.values(), &[3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn empty_count_series_grows_from_baseline() {
        let out = normalize_to_six_months(&[], SeriesKind::Count, &mut NoJitter);
        assert_close(out.values(), &[50.0, 50.3, 50.6, 50.9, 51.2, 51.5]);
    }

    #[test]
    fn empty_score_series_grows_from_baseline() {
        let out = normalize_to_six_months(&[], SeriesKind::Score, &mut NoJitter);
        assert_close(out.values(), &[65.0, 66.5, 68.0, 69.5, 71.0, 72.5]);
    }

    #[test]
    fn mean_step_matches_trend_without_jitter() {
        for kind in [SeriesKind::Count, SeriesKind::Score] {
            let out = normalize_to_six_months(&[], kind, &mut NoJitter);
            let diffs: Vec<f64> = out.values().windows(2).map(|w| w[1] - w[0]).collect();
            let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
            assert!((mean - kind.params().step).abs() < 1e-9);
        }
    }

    #[test]
    fn short_series_is_padded_from_last_value() {
        let out = normalize_to_six_months(&[4.0, 5.0, 6.0], SeriesKind::Count, &mut NoJitter);
        assert_close(out.values(), &[4.0, 5.0, 6.0, 6.3, 6.6, 6.9]);
    }

    #[test]
    fn padding_stays_within_jitter_bounds() {
        let mut rng = RandomJitter(StdRng::seed_from_u64(42));
        let out = normalize_to_six_months(&[2.0, 3.0], SeriesKind::Score, &mut rng);
        assert_eq!(&out.values()[..2], &[2.0, 3.0]);
        for window in out.values()[1..].windows(2) {
            let step = window[1] - window[0];
            // rounding can move a point by up to 0.05
            assert!(step >= 1.5 - 2.0 - 0.051 && step <= 1.5 + 2.0 + 0.051);
        }
    }

    #[test]
    fn synthesized_values_never_go_negative() {
        struct Downward;
        impl JitterSource for Downward {
            fn jitter(&mut self, magnitude: f64) -> f64 {
                -magnitude * 10.0
            }
        }

        let out = normalize_to_six_months(&[0.5], SeriesKind::Count, &mut Downward);
        assert_eq!(out.values()[0], 0.5);
        assert!(out.values()[1..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn random_jitter_respects_magnitude() {
        let mut rng = RandomJitter(StdRng::seed_from_u64(1));
        for _ in 0..200 {
            let value = rng.jitter(0.4);
            assert!((-0.4..=0.4).contains(&value));
        }
        assert_eq!(rng.jitter(0.0), 0.0);
    }

    #[test]
    fn coerces_loose_values() {
        assert_eq!(coerce_number(&json!(3.5)), 3.5);
        assert_eq!(coerce_number(&json!(" 2.25 ")), 2.25);
        assert_eq!(coerce_number(&json!("n/a")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&json!("inf")), 0.0);
        assert_eq!(
            coerce_series(&json!([1, "2", null, {"x": 1}])),
            vec![1.0, 2.0, 0.0, 0.0]
        );
        assert_eq!(coerce_series(&json!(7)), vec![7.0]);
        assert!(coerce_series(&json!({"2024-01": 1})).is_empty());
    }

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round1(50.26), 50.3);
        assert_eq!(round1(-1.04), -1.0);
        assert_eq!(round1(f64::MAX), f64::MAX);
    }

    #[test]
    fn padding_near_max_stays_finite() {
        for kind in [SeriesKind::Count, SeriesKind::Score] {
            let out = normalize_to_six_months(&[f64::MAX], kind, &mut NoJitter);
            assert!(out.values().iter().all(|v| v.is_finite()), "{:?}", out.values());
            assert_eq!(out.values()[0], f64::MAX);
        }

        let out = normalize_to_six_months(&[1e308], SeriesKind::Count, &mut NoJitter);
        assert!(out.values().iter().all(|v| v.is_finite() && *v >= 1e308));
    }
}
