use std::collections::BTreeMap;
use std::ops::Index;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::trends::TrendFormat;

/// Number of periods every normalized series carries.
pub const SERIES_LEN: usize = 6;

/// Payload returned by the analytics backend for one repository.
///
/// Every field is optional on the wire. A field of the wrong JSON type is
/// treated as missing; values inside the maps are coerced later by the adapter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalysisResult {
    #[serde(default, deserialize_with = "lenient")]
    pub repo: String,
    #[serde(default)]
    pub potential: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub averaged_data: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub detailed_data: Map<String, Value>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Exactly six values, oldest period first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SixMonthSeries(pub [f64; SERIES_LEN]);

impl SixMonthSeries {
    pub fn values(&self) -> &[f64; SERIES_LEN] {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDimension {
    ActivityTrend,
    BusFactorJump,
    ContributorsJump,
    IssueResponseTimeTrend,
    OpenrankTrend,
    ParticipantsTrend,
}

impl TrendDimension {
    /// Chart axes are keyed to this order.
    pub const ALL: [TrendDimension; SERIES_LEN] = [
        TrendDimension::ActivityTrend,
        TrendDimension::BusFactorJump,
        TrendDimension::ContributorsJump,
        TrendDimension::IssueResponseTimeTrend,
        TrendDimension::OpenrankTrend,
        TrendDimension::ParticipantsTrend,
    ];

    /// Key under `averaged_data`.
    pub fn field(self) -> &'static str {
        match self {
            TrendDimension::ActivityTrend => "activity_trend",
            TrendDimension::BusFactorJump => "bus_factor_jump",
            TrendDimension::ContributorsJump => "contributors_jump",
            TrendDimension::IssueResponseTimeTrend => "issue_response_time_trend",
            TrendDimension::OpenrankTrend => "openrank_trend",
            TrendDimension::ParticipantsTrend => "participants_trend",
        }
    }

    pub fn position(self) -> usize {
        match self {
            TrendDimension::ActivityTrend => 0,
            TrendDimension::BusFactorJump => 1,
            TrendDimension::ContributorsJump => 2,
            TrendDimension::IssueResponseTimeTrend => 3,
            TrendDimension::OpenrankTrend => 4,
            TrendDimension::ParticipantsTrend => 5,
        }
    }
}

/// Trend scalars keyed by dimension. Serializes as a bare array in
/// [`TrendDimension::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TrendValues([f64; SERIES_LEN]);

impl TrendValues {
    pub fn from_fn(value_of: impl FnMut(TrendDimension) -> f64) -> Self {
        Self(TrendDimension::ALL.map(value_of))
    }
}

impl Index<TrendDimension> for TrendValues {
    type Output = f64;

    fn index(&self, dimension: TrendDimension) -> &f64 {
        &self.0[dimension.position()]
    }
}

/// A trend scalar paired with its display metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendConfig {
    pub dimension: TrendDimension,
    pub name: &'static str,
    pub description: &'static str,
    pub range: (f64, f64),
    pub format: TrendFormat,
    pub value: f64,
    pub display: String,
}

/// Where the activity series came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivitySource {
    Field { field: String, fallback: bool },
    Synthesized,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub repo: String,
    pub potential: f64,
    pub months: [String; SERIES_LEN],
    pub monthly_activity: SixMonthSeries,
    pub monthly_potential: SixMonthSeries,
    pub activity_source: ActivitySource,
    pub raw_trends: TrendValues,
    pub trend_configs: [TrendConfig; SERIES_LEN],
    pub detailed_data: BTreeMap<String, Vec<f64>>,
}
