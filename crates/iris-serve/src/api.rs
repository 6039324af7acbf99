//! HTTP routes: single-record and file predictions plus the API document.
//!
//! Response bodies are the plain-text rendering of the prediction
//! (`[0]`, `[0, 1, 2]`), not JSON.

use std::collections::HashMap;
use std::convert::Infallible;

use burn::prelude::Backend;
use bytes::BufMut;
use futures::TryStreamExt;
use iris_model::{FeatureTable, FeatureVector, Prediction};
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::docs::{self, UPLOAD_FIELD};
use crate::error::ServeError;
use crate::state::SharedState;

// =============================================================================
// Routes
// =============================================================================

/// Builds the complete route tree.
pub fn routes<B: Backend>(
    state: SharedState<B>,
    max_upload_bytes: u64,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let predict = warp::path("predict")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(handle_predict::<B>);

    let predict_file = warp::path("predict_file")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(max_upload_bytes))
        .and(with_state(state))
        .and_then(handle_predict_file::<B>);

    let spec = docs::api_spec();
    let api_docs = warp::path(docs::SPEC_PATH)
        .and(warp::path::end())
        .and(warp::get())
        .map(move || warp::reply::json(&spec));

    predict
        .or(predict_file)
        .or(api_docs)
        .recover(handle_rejection)
        .with(warp::log("iris_serve::access"))
}

fn with_state<B: Backend>(
    state: SharedState<B>,
) -> impl Filter<Extract = (SharedState<B>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

// =============================================================================
// Handlers
// =============================================================================

async fn handle_predict<B: Backend>(
    query: HashMap<String, String>,
    state: SharedState<B>,
) -> Result<Response, Infallible> {
    Ok(into_response(predict_single(&query, &state).await))
}

async fn handle_predict_file<B: Backend>(
    form: FormData,
    state: SharedState<B>,
) -> Result<Response, Infallible> {
    Ok(into_response(predict_upload(form, &state).await))
}

async fn predict_single<B: Backend>(
    query: &HashMap<String, String>,
    state: &SharedState<B>,
) -> Result<String, ServeError> {
    let features = FeatureVector::from_query(query)?;

    log::info!("Predicting!");
    let prediction = run_prediction(state, FeatureTable::from(features)).await?;
    let body = prediction.to_string();

    let key = state
        .counter
        .record(state.result_log.as_ref(), &body)
        .await?;
    log::debug!("Logged {body} under key {key}");

    log::info!("Returning prediction");
    Ok(body)
}

// No result log entry for file predictions.
async fn predict_upload<B: Backend>(
    form: FormData,
    state: &SharedState<B>,
) -> Result<String, ServeError> {
    let upload = read_field(form, UPLOAD_FIELD)
        .await?
        .ok_or_else(|| ServeError::MissingUpload(UPLOAD_FIELD.to_string()))?;
    let table = FeatureTable::from_csv(upload.as_slice())?;

    log::info!("Predicting {} rows", table.len());
    let prediction = run_prediction(state, table).await?;
    Ok(prediction.to_string())
}

async fn run_prediction<B: Backend>(
    state: &SharedState<B>,
    table: FeatureTable,
) -> Result<Prediction, ServeError> {
    let model = state.model.clone();
    let prediction = tokio::task::spawn_blocking(move || model.predict(&table))
        .await
        .map_err(|e| ServeError::Task(e.to_string()))??;
    Ok(prediction)
}

async fn read_field(form: FormData, name: &str) -> Result<Option<Vec<u8>>, ServeError> {
    let mut parts = std::pin::pin!(form);
    while let Some(mut part) = parts
        .try_next()
        .await
        .map_err(|e| ServeError::Upload(e.to_string()))?
    {
        if part.name() != name {
            continue;
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = part.data().await {
            let chunk = chunk.map_err(|e| ServeError::Upload(e.to_string()))?;
            bytes.put(chunk);
        }
        return Ok(Some(bytes));
    }
    Ok(None)
}

// =============================================================================
// Responses
// =============================================================================

fn into_response(result: Result<String, ServeError>) -> Response {
    match result {
        Ok(body) => warp::reply::with_status(body, StatusCode::OK).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(error: ServeError) -> Response {
    let status = error.status();
    if status.is_server_error() {
        log::error!("Request failed: {error}");
    } else {
        log::warn!("Rejected request: {error}");
    }
    warp::reply::with_status(error.to_string(), status).into_response()
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::MethodNotAllowed>() {
        (StatusCode::METHOD_NOT_ALLOWED, e.to_string())
    } else if err.find::<warp::reject::MissingHeader>().is_some()
        || err.find::<warp::reject::InvalidHeader>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        let e = ServeError::MissingUpload(UPLOAD_FIELD.to_string());
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        log::warn!("Unhandled rejection: {err:?}");
        (StatusCode::BAD_REQUEST, "Bad request".to_string())
    };

    Ok(warp::reply::with_status(message, status).into_response())
}
