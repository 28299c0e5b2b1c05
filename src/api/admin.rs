use crate::{
    aggregate,
    api::{api_error, internal_error, ApiError, DatabaseConnection, RangeParams},
    auth::AdminUser,
    cell_record::{CellRecord, NETWORK_TYPES, OPERATORS},
    Error,
};
use axum::{extract::Query, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

/// A device counts as currently connected if it reported within this window.
const CONNECTED_WINDOW_MINUTES: i64 = 5;

pub async fn operator_summary(
    AdminUser(_): AdminUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = params.range()?;
    let records = CellRecord::in_range(&mut conn, start, end)
        .await
        .map_err(api_error)?;
    let stats = aggregate::percentage_by(&records, OPERATORS, |r| &r.operator);
    Ok(Json(json!(stats)))
}

pub async fn network_type_summary(
    AdminUser(_): AdminUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = params.range()?;
    let records = CellRecord::in_range(&mut conn, start, end)
        .await
        .map_err(api_error)?;
    let stats = aggregate::percentage_by(&records, NETWORK_TYPES, |r| &r.network_type);
    Ok(Json(json!(stats)))
}

pub async fn signal_power_summary(
    AdminUser(_): AdminUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = params.range()?;
    let records = CellRecord::in_range(&mut conn, start, end)
        .await
        .map_err(api_error)?;
    let stats =
        aggregate::average_by(&records, NETWORK_TYPES, |r| &r.network_type, |r| r.signal_power);
    Ok(Json(json!(stats)))
}

pub async fn sinr_summary(
    AdminUser(_): AdminUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = params.range()?;
    let records = CellRecord::in_range(&mut conn, start, end)
        .await
        .map_err(api_error)?;
    let stats = aggregate::average_by(&records, NETWORK_TYPES, |r| &r.network_type, |r| r.sinr);
    Ok(Json(json!(stats)))
}

pub async fn device_activity_trend(
    AdminUser(_): AdminUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = params.range()?;
    let records = CellRecord::in_range(&mut conn, start, end)
        .await
        .map_err(api_error)?;
    let (timestamps, counts) = aggregate::hourly_trend(&records);
    Ok(Json(json!({
        "timestamps": timestamps,
        "counts": counts,
    })))
}

pub async fn connected_devices_count(
    AdminUser(_): AdminUser,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let count = CellRecord::distinct_device_count(&mut conn)
        .await
        .map_err(api_error)?;
    Ok(Json(json!({ "connected_devices": count })))
}

pub async fn previously_connected_devices(
    AdminUser(_): AdminUser,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let sightings = CellRecord::device_sightings(&mut conn, None)
        .await
        .map_err(api_error)?;
    serde_json::to_value(sightings)
        .map(Json)
        .map_err(internal_error)
}

pub async fn currently_connected_devices(
    AdminUser(_): AdminUser,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let cutoff = Utc::now().naive_utc() - Duration::minutes(CONNECTED_WINDOW_MINUTES);
    let sightings = CellRecord::device_sightings(&mut conn, Some(cutoff))
        .await
        .map_err(api_error)?;
    serde_json::to_value(sightings)
        .map(Json)
        .map_err(internal_error)
}

#[derive(Deserialize)]
pub struct DeviceParams {
    pub username: Option<String>,
    pub device_id: Option<String>,
}

pub async fn device_statistics(
    AdminUser(_): AdminUser,
    Query(params): Query<DeviceParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (Some(username), Some(device_id)) = (params.username, params.device_id) else {
        return Err(api_error(Error::bad_request(
            "username and device_id are required",
        )));
    };

    let records = CellRecord::for_device(&mut conn, &username, &device_id)
        .await
        .map_err(api_error)?;
    let stats = aggregate::device_stats(&records)
        .ok_or_else(|| api_error(Error::not_found("no data found for this user/device")))?;

    Ok(Json(json!({
        "username": username,
        "device_id": device_id,
        "records_count": stats.records_count,
        "average_signal_power": stats.average_signal_power,
        "average_sinr": stats.average_sinr,
        "connected_network_types": stats.connected_network_types,
        "last_seen": stats.last_seen,
    })))
}
