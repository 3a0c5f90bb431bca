use thiserror::Error;

use crate::model::ErrorResp;
use crate::response::{json_response, GatewayResponse};
use crate::store::StoreError;

/// Every way a request can fail, with the status it is reported under.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Short code not found.")]
    NotFound,
    #[error("Store internal error: {0}")]
    StoreUnavailable(String),
    #[error("Could not generate a unique code.")]
    GenerationExhausted,
    #[error("Internal error: {0}")]
    Render(String),
}

impl AppError {
    pub fn status(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::NotFound => 404,
            AppError::StoreUnavailable(_)
            | AppError::GenerationExhausted
            | AppError::Render(_) => 500,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreUnavailable(e.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Render(e.to_string())
    }
}

impl From<AppError> for GatewayResponse {
    fn from(e: AppError) -> Self {
        let status = e.status();
        json_response(status, &ErrorResp { error: e.to_string() })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
}
