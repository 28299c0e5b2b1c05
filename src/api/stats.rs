use crate::{
    aggregate,
    api::{api_error, ApiError, DatabaseConnection, RangeParams},
    auth::AuthUser,
    cell_record::{CellRecord, NETWORK_TYPES, OPERATORS},
};
use axum::{extract::Query, Json};
use serde_json::{json, Value};

pub async fn operator_stats(
    AuthUser(user): AuthUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end, device_id) = params.device_range()?;
    let records = CellRecord::for_user_device(&mut conn, &user.username, device_id, start, end)
        .await
        .map_err(api_error)?;
    let stats = aggregate::percentage_by(&records, OPERATORS, |r| &r.operator);
    Ok(Json(json!(stats)))
}

pub async fn network_type_stats(
    AuthUser(user): AuthUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end, device_id) = params.device_range()?;
    let records = CellRecord::for_user_device(&mut conn, &user.username, device_id, start, end)
        .await
        .map_err(api_error)?;
    let stats = aggregate::percentage_by(&records, NETWORK_TYPES, |r| &r.network_type);
    Ok(Json(json!(stats)))
}

pub async fn signal_power_per_network(
    AuthUser(user): AuthUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end, device_id) = params.device_range()?;
    let records = CellRecord::for_user_device(&mut conn, &user.username, device_id, start, end)
        .await
        .map_err(api_error)?;
    let stats =
        aggregate::average_by(&records, NETWORK_TYPES, |r| &r.network_type, |r| r.signal_power);
    Ok(Json(json!(stats)))
}

pub async fn signal_power_per_device(
    AuthUser(user): AuthUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end, device_id) = params.device_range()?;
    let records = CellRecord::for_user_device(&mut conn, &user.username, device_id, start, end)
        .await
        .map_err(api_error)?;
    let average = aggregate::mean(records.iter().map(|r| r.signal_power));
    Ok(Json(json!({
        "device_id": device_id,
        "average_signal_power": average,
    })))
}

pub async fn sinr_per_network(
    AuthUser(user): AuthUser,
    Query(params): Query<RangeParams>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (start, end, device_id) = params.device_range()?;
    let records = CellRecord::for_user_device(&mut conn, &user.username, device_id, start, end)
        .await
        .map_err(api_error)?;
    let stats = aggregate::average_by(&records, NETWORK_TYPES, |r| &r.network_type, |r| r.sinr);
    Ok(Json(json!(stats)))
}
