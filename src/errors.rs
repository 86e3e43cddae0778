use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Struct that's used to deserialize API errors returned by the server
#[derive(Debug, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

/// Every failure the store can surface to its caller
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server responded with {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("resource id '{id}' is not a valid integer")]
    MalformedId { id: String },

    #[error("unable to load config at '{path}': {message}")]
    Config { path: String, message: String },
}

/// Builds a StoreError::Api from a non-2xx response.
///
/// # Arguments
///
/// * `status` - The HTTP status code of the response
/// * `error_response` - String that contains the body returned by the server
pub fn api_error(status: u16, error_response: String) -> StoreError {
    let message = match serde_json::from_str::<ApiErrorBody>(error_response.as_str()) {
        Ok(body) => body.message,
        Err(_) => error_response,
    };
    StoreError::Api { status, message }
}
