//! Core library for the `forecast` viewer.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The forecast retrieval pipeline: request building, HTTP transport,
//!   response decoding
//! - The controller that owns the current forecast and drives presentation
//!   callbacks
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or
//! services.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod parser;
pub mod request;

pub use client::{ForecastClient, ForecastTransport};
pub use config::Config;
pub use controller::{ForecastController, ForecastView};
pub use error::FetchFailure;
pub use model::{DayForecast, Forecast};
pub use request::{ForecastRequest, RequestBuilder};
