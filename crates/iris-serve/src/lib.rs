//! HTTP front end for the iris classifier.
//!
//! `GET /predict` classifies one flower from query parameters and appends the
//! result to the result log under a gapless counter key. `POST /predict_file`
//! classifies every row of an uploaded CSV without touching the log. The
//! route document is served at `/apispec_1.json`.

pub mod api;
pub mod cli;
pub mod config;
pub mod counter;
pub mod docs;
pub mod error;
pub mod logging;
pub mod result_log;
pub mod state;

pub use api::routes;
pub use config::{ConfigError, ServeConfig};
pub use counter::PredictionCounter;
pub use error::ServeError;
pub use result_log::{MemoryResultLog, RedisResultLog, ResultLog, ResultLogError};
pub use state::{ServeState, SharedState};
