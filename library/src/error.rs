use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Rejections of a submitted reading. All of these map to a client error and
/// none of them reach the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    #[error("missing field `{0}`")]
    Missing(&'static str),

    #[error("field `{0}` is not a finite decimal number")]
    NotNumeric(&'static str),

    #[error("field `{0}` must not be empty")]
    Empty(&'static str),

    #[error("field `{field}` is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

/// A stored field that could not be turned into a finite number.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("field `{field}` holds non-numeric value {value:?}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field `{0}` is not a finite number")]
    NotFinite(&'static str),

    #[error("field `{0}` is null")]
    Null(&'static str),
}

/// Failures while setting up the store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("running migrations: {0}")]
    Migration(String),
}

/// Errors surfaced by the HTTP handlers.
///
/// `Display` keeps the internal detail for the logs; the response body only
/// ever carries [`ApiError::public_message`].
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Reading(#[from] ReadingError),

    #[error("invalid query parameter `{0}`")]
    BadQuery(&'static str),

    #[error("store unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("store query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("blocking task was cancelled")]
    Blocking,
}

impl ApiError {
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Reading(e) => e.to_string(),
            ApiError::BadQuery(_) => self.to_string(),
            ApiError::Pool(_) => "sensor store unavailable, retry later".to_owned(),
            ApiError::Query(_) | ApiError::Blocking => "sensor store request failed".to_owned(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Reading(_) | ApiError::BadQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Query(_) | ApiError::Blocking => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.public_message() }))
    }
}

/// Errors from fetching readings off a remote query API.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Send(String),

    #[error("server answered {0}")]
    Status(u16),

    #[error("undecodable response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_do_not_leak_detail() {
        let err = ApiError::Query(diesel::result::Error::QueryBuilderError(
            "no such table: iaq at /srv/data/iaq.db".into(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("iaq.db"));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn reading_errors_are_client_errors() {
        let err = ApiError::from(ReadingError::Missing("temp"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "missing field `temp`");
    }
}
