use axum::{http::StatusCode, Json};
use serde_json::{json, Value};
use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("environment error")]
    Env(#[from] std::env::VarError),
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("http error: {0}")]
    Http(#[from] hyper::Error),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("password hash error")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    TooManyRequests(String),
}

impl Error {
    pub fn bad_request<E: ToString>(msg: E) -> Self {
        Self::BadRequest(msg.to_string())
    }

    pub fn forbidden<E: ToString>(msg: E) -> Self {
        Self::Forbidden(msg.to_string())
    }

    pub fn not_found<E: ToString>(msg: E) -> Self {
        Self::NotFound(msg.to_string())
    }

    pub fn conflict<E: ToString>(msg: E) -> Self {
        Self::Conflict(msg.to_string())
    }
}

impl From<Error> for (StatusCode, Json<Value>) {
    fn from(err: Error) -> Self {
        let status = match err {
            Error::BadRequest(_) | Error::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": err.to_string() })))
    }
}
