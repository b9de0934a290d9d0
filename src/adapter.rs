use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use serde_json::Value;
use thiserror::Error;

use crate::config::AdapterConfig;
use crate::models::{ActivitySource, DashboardData, RawAnalysisResult, SixMonthSeries, SERIES_LEN};
use crate::series::{self, JitterSource, SeriesKind};
use crate::trends;

#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("analysis payload is missing")]
    MissingPayload,

    #[error("analysis payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("analysis payload could not be read: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdaptError>;

impl RawAnalysisResult {
    /// Rejects a null or non-object payload; anything inside an object is
    /// accepted and defaulted.
    pub fn from_json(value: Value) -> Result<Self> {
        match &value {
            Value::Null => return Err(AdaptError::MissingPayload),
            Value::Object(_) => {}
            other => return Err(AdaptError::NotAnObject(json_type(other))),
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turns raw backend payloads into chart-ready dashboard data.
#[derive(Debug, Clone, Default)]
pub struct Adapter {
    config: AdapterConfig,
}

impl Adapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    /// Parses and adapts a payload in one step.
    pub fn adapt_json(
        &self,
        payload: Value,
        as_of: NaiveDate,
        jitter: &mut impl JitterSource,
    ) -> Result<DashboardData> {
        let raw = RawAnalysisResult::from_json(payload)?;
        Ok(self.adapt(&raw, as_of, jitter))
    }

    pub fn adapt(
        &self,
        raw: &RawAnalysisResult,
        as_of: NaiveDate,
        jitter: &mut impl JitterSource,
    ) -> DashboardData {
        let (activity, activity_source) = self.select_activity(raw);
        let monthly_activity =
            series::normalize_to_six_months(&activity, SeriesKind::Count, jitter);

        let potential = series::coerce_number(&raw.potential);
        let monthly_potential = self.potential_series(raw, potential, jitter);

        let raw_trends = trends::extract_trend_dimensions(&raw.averaged_data);
        let trend_configs = trends::build_trend_configs(&raw_trends);

        let detailed_data: BTreeMap<String, Vec<f64>> = raw
            .detailed_data
            .iter()
            .map(|(key, value)| (key.clone(), series::coerce_series(value)))
            .collect();

        tracing::debug!(
            repo = %raw.repo,
            potential,
            metrics = detailed_data.len(),
            "adapted analysis payload"
        );

        DashboardData {
            repo: raw.repo.clone(),
            potential,
            months: month_labels(as_of),
            monthly_activity,
            monthly_potential,
            activity_source,
            raw_trends,
            trend_configs,
            detailed_data,
        }
    }

    /// Picks the first configured field holding a non-empty series. Counts
    /// are magnitudes, so values are taken by absolute value.
    fn select_activity(&self, raw: &RawAnalysisResult) -> (Vec<f64>, ActivitySource) {
        for (rank, field) in self.config.activity_fields.iter().enumerate() {
            let Some(value) = raw.detailed_data.get(field) else {
                continue;
            };
            let values: Vec<f64> = series::coerce_series(value)
                .into_iter()
                .map(f64::abs)
                .collect();
            if values.is_empty() {
                continue;
            }

            let fallback = rank > 0;
            if fallback {
                tracing::warn!(
                    repo = %raw.repo,
                    field = %field,
                    preferred = %self.config.activity_fields[0],
                    "activity series taken from fallback field"
                );
            }
            return (
                values,
                ActivitySource::Field {
                    field: field.clone(),
                    fallback,
                },
            );
        }

        tracing::warn!(
            repo = %raw.repo,
            fields = ?self.config.activity_fields,
            "no activity series found, synthesizing"
        );
        (Vec::new(), ActivitySource::Synthesized)
    }

    fn potential_series(
        &self,
        raw: &RawAnalysisResult,
        current: f64,
        jitter: &mut impl JitterSource,
    ) -> SixMonthSeries {
        if let Some(value) = raw.detailed_data.get(&self.config.potential_field) {
            let history = series::coerce_series(value);
            if !history.is_empty() {
                return series::normalize_to_six_months(&history, SeriesKind::Score, jitter);
            }
        }
        interpolate_potential(current, self.config.potential_start_ratio, jitter)
    }
}

/// Linear ramp from `ratio * current` up to `current`. The last point is
/// exactly `current`.
pub fn interpolate_potential(
    current: f64,
    ratio: f64,
    jitter: &mut impl JitterSource,
) -> SixMonthSeries {
    let noise = SeriesKind::Score.params().jitter;
    let start = current * ratio;
    let steps = (SERIES_LEN - 1) as f64;
    let mut values = [0.0; SERIES_LEN];

    for (index, slot) in values.iter_mut().enumerate().take(SERIES_LEN - 1) {
        let point = start + (current - start) * index as f64 / steps + jitter.jitter(noise);
        *slot = series::round1(point.max(0.0));
    }
    values[SERIES_LEN - 1] = current;

    SixMonthSeries(values)
}

/// Six `YYYY-MM` labels ending with the month of `as_of`, oldest first.
pub fn month_labels(as_of: NaiveDate) -> [String; SERIES_LEN] {
    let first_of_month = as_of.with_day(1).unwrap_or(as_of);
    std::array::from_fn(|index| {
        let back = (SERIES_LEN - 1 - index) as u32;
        first_of_month
            .checked_sub_months(Months::new(back))
            .unwrap_or(first_of_month)
            .format("%Y-%m")
            .to_string()
    })
}
