use reqwest::StatusCode;
use thiserror::Error;

/// Classified outcome of a failed forecast fetch.
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// The city text could not be turned into a syntactically valid URL.
    #[error("could not build a valid request URL: {0}")]
    MalformedRequest(#[from] url::ParseError),

    /// Connection establishment or body read failed; transient, worth a retry.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered outside the success class. The body is discarded.
    #[error("forecast request failed with HTTP status {0}")]
    Http(StatusCode),

    /// The response body was not the expected forecast shape.
    #[error("could not decode forecast response: {0}")]
    Decode(#[from] serde_json::Error),
}
