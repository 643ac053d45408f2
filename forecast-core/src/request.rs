use anyhow::Result;
use url::Url;

use crate::{config::Config, error::FetchFailure};

/// Unit system requested from the API.
const UNITS: &str = "metric";

/// Number of forecast days requested per fetch.
const DAY_COUNT: u32 = 16;

/// A fully-encoded forecast request plus the parameters it was built from.
///
/// Constructed only by [`RequestBuilder::build`], so the city segment is
/// always percent-encoded before it reaches the wire.
#[derive(Debug, Clone)]
pub struct ForecastRequest {
    url: Url,
    city: String,
    units: &'static str,
    day_count: u32,
    api_key: String,
}

impl ForecastRequest {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The city exactly as the user entered it.
    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn units(&self) -> &str {
        self.units
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Builds well-formed API requests from untrusted city text.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    api_key: String,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Construct from on-disk configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured.\n\
                 Hint: run `forecast configure` and enter your OpenWeatherMap API key."
            )
        })?;

        Ok(Self::new(config.api_base_url(), api_key))
    }

    /// Encode `city` and assemble the request URL.
    ///
    /// `city` may be empty, contain whitespace, or arbitrary Unicode;
    /// reserved characters are percent-encoded so the segment round-trips
    /// through standard URL decoding. Fails with
    /// [`FetchFailure::MalformedRequest`] when the assembled string is not a
    /// syntactically valid URL. No I/O happens here.
    pub fn build(&self, city: &str) -> Result<ForecastRequest, FetchFailure> {
        let encoded = urlencoding::encode(city);
        let raw = format!(
            "{}{}&units={}&cnt={}&APPID={}",
            self.base_url, encoded, UNITS, DAY_COUNT, self.api_key
        );
        let url = Url::parse(&raw)?;

        Ok(ForecastRequest {
            url,
            city: city.to_owned(),
            units: UNITS,
            day_count: DAY_COUNT,
            api_key: self.api_key.clone(),
        })
    }
}
