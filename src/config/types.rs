use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::store::StoreBackend;
use crate::summary::TimeWindow;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub store_path: Option<String>,
    pub backend: Option<StoreBackend>,
    pub capacity: Option<usize>,
    pub session_ttl: Option<DurationValue>,
    pub poll_interval: Option<DurationValue>,
    pub window: Option<TimeWindow>,
    pub export_dir: Option<String>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
}

/// Either a bare number of seconds or a string such as `"500ms"` or `"2m"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self, field: &'static str) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ConfigError::FieldMustBePositive { field })
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => {
                crate::args::parse_duration_value(text).map_err(|err| ConfigError::InvalidField {
                    field,
                    message: err.to_string(),
                })
            }
        }
    }
}
