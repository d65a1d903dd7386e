//! Core library for the `weathernow` CLI.
//!
//! This crate defines:
//! - Location search and disambiguation against the geocoding API
//! - Forecast retrieval and hourly week bucketing
//! - Shared domain models, unit handling, and configuration
//!
//! It is used by `weathernow-cli`, but can also be reused by other binaries or services.

pub mod bucket;
pub mod config;
pub mod error;
pub mod forecast;
pub mod geocoding;
pub mod model;
pub mod resolver;
pub mod session;
pub mod units;

pub use bucket::{LengthPolicy, WeekGrid, bucketize};
pub use config::Config;
pub use error::WeatherNowError;
pub use forecast::ForecastClient;
pub use geocoding::{GeocodingBackend, OpenMeteoGeocoder};
pub use model::{Forecast, Place, WeatherCondition};
pub use resolver::{LocationResolver, SearchQuery};
pub use session::{FetchKey, ForecastGate, SearchSession};
pub use units::Units;
