use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{TrendConfig, TrendDimension, TrendValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendFormat {
    /// Growth ratio shown as a percentage.
    Percent,
    /// Categorical: zero reads as no risk.
    Risk,
    /// Signed percentage where a negative value is an improvement.
    SignedPercent,
}

impl TrendFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            TrendFormat::Percent => format!("{:.1}%", value * 100.0),
            TrendFormat::Risk => {
                if value == 0.0 {
                    "No risk".to_string()
                } else {
                    format!("Risk index {value:.2}")
                }
            }
            TrendFormat::SignedPercent => {
                let percent = value * 100.0;
                if percent.abs() < 0.05 {
                    "0.0% (steady)".to_string()
                } else if percent < 0.0 {
                    format!("{percent:.1}% (improving)")
                } else {
                    format!("+{percent:.1}% (worsening)")
                }
            }
        }
    }
}

/// Static display metadata for one dimension.
#[derive(Debug, Clone, Copy)]
pub struct TrendMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub range: (f64, f64),
    pub format: TrendFormat,
}

pub fn trend_meta(dimension: TrendDimension) -> TrendMeta {
    match dimension {
        TrendDimension::ActivityTrend => TrendMeta {
            name: "Activity Trend",
            description: "Change in overall repository activity over the window",
            range: (-1.0, 1.0),
            format: TrendFormat::Percent,
        },
        TrendDimension::BusFactorJump => TrendMeta {
            name: "Bus Factor Risk",
            description: "Shift in how concentrated the work is among a few contributors",
            range: (0.0, 1.0),
            format: TrendFormat::Risk,
        },
        TrendDimension::ContributorsJump => TrendMeta {
            name: "Contributor Growth",
            description: "Change in the number of active contributors",
            range: (-1.0, 1.0),
            format: TrendFormat::Percent,
        },
        TrendDimension::IssueResponseTimeTrend => TrendMeta {
            name: "Issue Response Trend",
            description: "Change in time to first response on issues; negative is faster",
            range: (-1.0, 1.0),
            format: TrendFormat::SignedPercent,
        },
        TrendDimension::OpenrankTrend => TrendMeta {
            name: "OpenRank Trend",
            description: "Change in the OpenRank influence score",
            range: (-1.0, 1.0),
            format: TrendFormat::Percent,
        },
        TrendDimension::ParticipantsTrend => TrendMeta {
            name: "Participant Growth",
            description: "Change in the number of people taking part in discussions",
            range: (-1.0, 1.0),
            format: TrendFormat::Percent,
        },
    }
}

/// Reads the six trend scalars. Missing or non-numeric entries are 0.
pub fn extract_trend_dimensions(averaged_data: &Map<String, Value>) -> TrendValues {
    TrendValues::from_fn(|dimension| {
        match averaged_data.get(dimension.field()).and_then(Value::as_f64) {
            Some(value) if value.is_finite() => value,
            Some(_) | None => {
                tracing::debug!(field = dimension.field(), "trend missing, using 0");
                0.0
            }
        }
    })
}

pub fn build_trend_configs(raw_trends: &TrendValues) -> [TrendConfig; 6] {
    TrendDimension::ALL.map(|dimension| {
        let meta = trend_meta(dimension);
        let value = raw_trends[dimension];
        TrendConfig {
            dimension,
            name: meta.name,
            description: meta.description,
            range: meta.range,
            format: meta.format,
            value,
            display: meta.format.format(value),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn in_order(trends: &TrendValues) -> [f64; 6] {
        TrendDimension::ALL.map(|dimension| trends[dimension])
    }

    #[test]
    fn empty_averaged_data_yields_zeros() {
        let trends = extract_trend_dimensions(&Map::new());
        assert_eq!(in_order(&trends), [0.0; 6]);
    }

    #[test]
    fn values_follow_fixed_order_regardless_of_input_order() {
        let averaged = object(json!({
            "participants_trend": 0.333,
            "openrank_trend": 0.42,
            "issue_response_time_trend": -0.761,
            "contributors_jump": 0.1,
            "bus_factor_jump": 0.5,
            "activity_trend": 0.95
        }));
        let trends = extract_trend_dimensions(&averaged);
        assert_eq!(in_order(&trends), [0.95, 0.5, 0.1, -0.761, 0.42, 0.333]);
        assert_eq!(trends[TrendDimension::OpenrankTrend], 0.42);
    }

    #[test]
    fn non_numeric_trends_become_zero() {
        let averaged = object(json!({
            "activity_trend": "0.9",
            "bus_factor_jump": null,
            "openrank_trend": 0.2,
            "unrelated": 5
        }));
        let trends = extract_trend_dimensions(&averaged);
        assert_eq!(in_order(&trends), [0.0, 0.0, 0.0, 0.0, 0.2, 0.0]);
    }

    #[test]
    fn configs_pair_values_with_metadata() {
        let trends = TrendValues::from_fn(|dimension| match dimension {
            TrendDimension::ActivityTrend => 0.951,
            TrendDimension::IssueResponseTimeTrend => -0.761,
            _ => 0.0,
        });
        let configs = build_trend_configs(&trends);

        for (config, dimension) in configs.iter().zip(TrendDimension::ALL) {
            assert_eq!(config.dimension, dimension);
        }
        assert_eq!(configs[0].name, "Activity Trend");
        assert_eq!(configs[0].display, "95.1%");
        assert_eq!(configs[1].display, "No risk");
        assert_eq!(configs[3].display, "-76.1% (improving)");
        assert_eq!(configs[3].format, TrendFormat::SignedPercent);
    }

    #[test]
    fn formatters_cover_each_style() {
        assert_eq!(TrendFormat::Percent.format(-0.25), "-25.0%");
        assert_eq!(TrendFormat::Risk.format(0.5), "Risk index 0.50");
        assert_eq!(TrendFormat::SignedPercent.format(0.12), "+12.0% (worsening)");
        assert_eq!(TrendFormat::SignedPercent.format(0.0), "0.0% (steady)");
    }
}
