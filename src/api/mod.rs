pub mod account;
pub mod admin;
pub mod server;
pub mod stats;
pub mod submit;

use crate::Error;
use axum::{
    async_trait,
    extract::{Extension, FromRequest, RequestParts},
    http::StatusCode,
    Json,
};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::postgres::PgPool;

/// The error shape every handler responds with: a status code and an
/// `{"error": <message>}` body.
pub type ApiError = (StatusCode, Json<Value>);

/// Utility function for mapping any error into an api error
pub fn api_error<E>(err: E) -> ApiError
where
    E: std::error::Error,
    Error: From<E>,
{
    Error::from(err).into()
}

/// Utility function for mapping any error into a `500 Internal Server Error`
/// response.
pub fn internal_error<E>(err: E) -> ApiError
where
    E: std::error::Error,
{
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}

// A custom extractor that grabs a connection from the pool
pub struct DatabaseConnection(pub sqlx::pool::PoolConnection<sqlx::Postgres>);

#[async_trait]
impl<B> FromRequest<B> for DatabaseConnection
where
    B: Send,
{
    type Rejection = ApiError;

    async fn from_request(req: &mut RequestParts<B>) -> std::result::Result<Self, Self::Rejection> {
        let Extension(pool) = Extension::<PgPool>::from_request(req)
            .await
            .map_err(internal_error)?;

        let conn = pool.acquire().await.map_err(api_error)?;

        Ok(Self(conn))
    }
}

/// Common query parameters of the range-filtered aggregation endpoints.
#[derive(Deserialize)]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub device_id: Option<String>,
}

impl RangeParams {
    /// Range for the admin summaries; both dates required.
    pub fn range(&self) -> std::result::Result<(NaiveDateTime, NaiveDateTime), ApiError> {
        let (Some(start), Some(end)) = (&self.start_date, &self.end_date) else {
            return Err(api_error(Error::bad_request("start and end dates required")));
        };
        Ok((
            crate::parse_iso_datetime(start).map_err(api_error)?,
            crate::parse_iso_datetime(end).map_err(api_error)?,
        ))
    }

    /// Range for the user-scoped stats; dates and device id all required.
    pub fn device_range(
        &self,
    ) -> std::result::Result<(NaiveDateTime, NaiveDateTime, &str), ApiError> {
        let Some(device_id) = self.device_id.as_deref() else {
            return Err(api_error(Error::bad_request(
                "start date, end date, and device_id required",
            )));
        };
        let (Some(start), Some(end)) = (&self.start_date, &self.end_date) else {
            return Err(api_error(Error::bad_request(
                "start date, end date, and device_id required",
            )));
        };
        Ok((
            crate::parse_iso_datetime(start).map_err(api_error)?,
            crate::parse_iso_datetime(end).map_err(api_error)?,
            device_id,
        ))
    }
}
