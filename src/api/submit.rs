use crate::{
    api::{api_error, ApiError, DatabaseConnection},
    auth::AuthUser,
    CellRecord, Error,
};
use axum::{extract::ConnectInfo, http::StatusCode, Json};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;

/// Timestamp format the devices report, e.g. "15 Jan 2024 03:45 PM".
const DEVICE_TIMESTAMP_FORMAT: &str = "%d %b %Y %I:%M %p";

#[derive(Deserialize)]
pub struct CellMeasurement {
    pub operator: String,
    pub signal_power: f64,
    pub sinr: f64,
    pub network_type: String,
    pub frequency_band: String,
    pub cell_id: String,
    pub timestamp: String,
    pub device_mac: String,
    pub device_id: Option<String>,
}

pub async fn submit_data(
    AuthUser(user): AuthUser,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(measurement): Json<CellMeasurement>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(device_id) = measurement.device_id else {
        return Err(api_error(Error::bad_request(
            "invalid data or missing device_id",
        )));
    };
    let timestamp = parse_device_timestamp(&measurement.timestamp).map_err(api_error)?;

    let record = CellRecord {
        operator: measurement.operator,
        signal_power: measurement.signal_power,
        sinr: measurement.sinr,
        network_type: measurement.network_type,
        frequency_band: measurement.frequency_band,
        cell_id: measurement.cell_id,
        timestamp,
        // taken from the connection, never from the payload
        device_ip: peer.ip().to_string(),
        device_mac: measurement.device_mac,
        device_id,
        // taken from the authenticated identity, never from the payload
        username: user.username,
    };

    let id = record.insert_into(&mut *conn).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

fn parse_device_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, DEVICE_TIMESTAMP_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_timestamp_format() {
        let parsed = parse_device_timestamp("15 Jan 2024 03:45 PM").unwrap();
        assert_eq!(parsed, "2024-01-15T15:45:00".parse().unwrap());

        let parsed = parse_device_timestamp("01 Dec 2023 12:00 AM").unwrap();
        assert_eq!(parsed, "2023-12-01T00:00:00".parse().unwrap());

        assert!(parse_device_timestamp("2024-01-15 15:45").is_err());
        assert!(parse_device_timestamp("15 Janvier 2024 03:45 PM").is_err());
    }
}
