use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// `detailed_data` keys tried, in order, for the activity series.
pub const DEFAULT_ACTIVITY_FIELDS: [&str; 4] = ["activity", "openrank", "contributors", "participants"];
pub const DEFAULT_POTENTIAL_FIELD: &str = "potential";

/// Share of the current potential the interpolated history starts from.
pub const POTENTIAL_START_RATIO: f64 = 0.85;

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    pub activity_fields: Vec<String>,
    pub potential_field: String,
    pub potential_start_ratio: f64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            activity_fields: DEFAULT_ACTIVITY_FIELDS
                .iter()
                .map(|field| field.to_string())
                .collect(),
            potential_field: DEFAULT_POTENTIAL_FIELD.to_string(),
            potential_start_ratio: POTENTIAL_START_RATIO,
        }
    }
}

impl AdapterConfig {
    /// Overrides the defaults with whatever the command line supplied.
    pub fn with_overrides(activity_fields: Vec<String>, potential_field: Option<String>) -> Self {
        let mut config = Self::default();
        if !activity_fields.is_empty() {
            config.activity_fields = activity_fields;
        }
        if let Some(field) = potential_field {
            config.potential_field = field;
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_secs.max(1)),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS)
    }
}
