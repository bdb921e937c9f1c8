#[macro_use]
extern crate diesel;

pub mod api_client;
pub mod common;
pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod reading;
pub mod rest_api;
pub mod schema;

pub use config::{api_url, Config};
pub use error::{ApiError, ClientError, NormalizeError, ReadingError, StoreError};
pub use normalize::{normalize, NormalizedSensorData, RawSensorData};
pub use reading::{ReadingForm, SensorReading};
pub use rest_api::rest_config;
