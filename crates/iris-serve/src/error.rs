use iris_model::{FeatureError, ModelStoreError};
use thiserror::Error;
use warp::http::StatusCode;

use crate::result_log::ResultLogError;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error("Missing upload field '{0}'")]
    MissingUpload(String),
    #[error("Failed to read upload: {0}")]
    Upload(String),
    #[error(transparent)]
    Model(#[from] ModelStoreError),
    #[error(transparent)]
    ResultLog(#[from] ResultLogError),
    #[error("Prediction task failed: {0}")]
    Task(String),
}

impl ServeError {
    /// Bad input is the caller's fault; everything past parsing is ours.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::Feature(_) | ServeError::MissingUpload(_) | ServeError::Upload(_) => {
                StatusCode::BAD_REQUEST
            }
            ServeError::Model(_) | ServeError::ResultLog(_) | ServeError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
