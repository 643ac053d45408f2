use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One day's summarized weather from the forecast API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    /// Unix timestamp (seconds, UTC) of the forecast day.
    pub timestamp_seconds: i64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    /// Relative humidity in percent, within [0, 100].
    pub humidity_percent: f64,
    pub condition_description: String,
    pub icon_id: String,
}

impl DayForecast {
    /// The forecast day as a UTC date-time, if the timestamp is representable.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp_seconds, 0)
    }
}

/// Ordered sequence of per-day summaries for one queried location.
///
/// Owned exclusively by the controller and replaced wholesale on every
/// successful fetch; a failed fetch leaves the previous value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    days: Vec<DayForecast>,
}

impl Forecast {
    pub fn from_days(days: Vec<DayForecast>) -> Self {
        Self { days }
    }

    /// The days in chronological order, as returned by the API.
    pub fn days(&self) -> &[DayForecast] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
