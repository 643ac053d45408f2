//! Decoding of the forecast API's JSON into domain types.

use serde::Deserialize;
use tracing::warn;

use crate::{error::FetchFailure, model::DayForecast};

/// Top-level response shape: the per-day entries live in `list`.
#[derive(Debug, Deserialize)]
struct ApiForecast {
    list: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    dt: i64,
    temp: ApiTemperature,
    humidity: f64,
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiTemperature {
    min: f64,
    max: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    icon: String,
}

impl ApiDay {
    fn into_day_forecast(self) -> Option<DayForecast> {
        // The first weather element supplies description and icon.
        let condition = self.weather.into_iter().next()?;

        Some(DayForecast {
            timestamp_seconds: self.dt,
            min_temperature_c: self.temp.min,
            max_temperature_c: self.temp.max,
            humidity_percent: self.humidity.clamp(0.0, 100.0),
            condition_description: condition.description,
            icon_id: condition.icon,
        })
    }
}

/// Decode a forecast response body into ordered per-day summaries.
///
/// The whole response fails with [`FetchFailure::Decode`] when the body is
/// not JSON or the `list` array is missing. An individual day entry missing
/// a required sub-field is skipped with a warning; the remaining days are
/// kept in input order. Pure and synchronous.
pub fn parse(body: &str) -> Result<Vec<DayForecast>, FetchFailure> {
    let forecast: ApiForecast = serde_json::from_str(body)?;

    let mut days = Vec::with_capacity(forecast.list.len());
    for (index, entry) in forecast.list.into_iter().enumerate() {
        match serde_json::from_value::<ApiDay>(entry) {
            Ok(day) => match day.into_day_forecast() {
                Some(day) => days.push(day),
                None => warn!(index, "skipping day entry with no weather conditions"),
            },
            Err(error) => warn!(index, %error, "skipping malformed day entry"),
        }
    }

    Ok(days)
}
