use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// Operators emitted by the percentage breakdowns.
pub const OPERATORS: &[&str] = &["Alfa", "Touch"];
/// Network types emitted by the percentage and average breakdowns.
pub const NETWORK_TYPES: &[&str] = &["2G", "3G", "4G"];

/// A single telemetry measurement. Records are append-only: they are never
/// updated or deleted, and ids assigned by the store increase monotonically.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct CellRecord {
    pub operator: String,
    pub signal_power: f64,
    pub sinr: f64,
    pub network_type: String,
    pub frequency_band: String,
    pub cell_id: String,
    pub timestamp: NaiveDateTime,
    pub device_ip: String,
    pub device_mac: String,
    pub device_id: String,
    pub username: String,
}

/// One row per distinct (username, device, ip, mac) tuple seen in the log.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct DeviceSighting {
    pub username: String,
    pub device_id: String,
    #[serde(rename = "ip")]
    pub device_ip: String,
    #[serde(rename = "mac")]
    pub device_mac: String,
}

impl CellRecord {
    pub async fn insert_into<'e, 'c, E>(&self, executor: E) -> Result<i64>
    where
        E: 'e + sqlx::Executor<'c, Database = sqlx::Postgres>,
    {
        sqlx::query_scalar(
            r#"
        insert into cell_records (
            operator,
            signal_power,
            sinr,
            network_type,
            frequency_band,
            cell_id,
            timestamp,
            device_ip,
            device_mac,
            device_id,
            username
        ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        returning id
            "#,
        )
        .bind(&self.operator)
        .bind(self.signal_power)
        .bind(self.sinr)
        .bind(&self.network_type)
        .bind(&self.frequency_band)
        .bind(&self.cell_id)
        .bind(self.timestamp)
        .bind(&self.device_ip)
        .bind(&self.device_mac)
        .bind(&self.device_id)
        .bind(&self.username)
        .fetch_one(executor)
        .await
        .map_err(Error::from)
    }

    /// Global scan for the admin summaries. Both range ends are inclusive.
    pub async fn in_range(
        conn: &mut PgConnection,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            select * from cell_records
            where timestamp between $1 and $2
            order by id asc
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(conn)
        .await
        .map_err(Error::from)
    }

    /// Scoped scan for the user-facing stats endpoints.
    pub async fn for_user_device(
        conn: &mut PgConnection,
        username: &str,
        device_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            select * from cell_records
            where timestamp between $1 and $2
              and username = $3
              and device_id = $4
            order by id asc
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(username)
        .bind(device_id)
        .fetch_all(conn)
        .await
        .map_err(Error::from)
    }

    /// Everything a given (user, device) pair ever reported.
    pub async fn for_device(
        conn: &mut PgConnection,
        username: &str,
        device_id: &str,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            select * from cell_records
            where username = $1 and device_id = $2
            order by id asc
            "#,
        )
        .bind(username)
        .bind(device_id)
        .fetch_all(conn)
        .await
        .map_err(Error::from)
    }

    pub async fn distinct_device_count(conn: &mut PgConnection) -> Result<i64> {
        sqlx::query_scalar(
            r#"
            select count(distinct device_id) from cell_records
            "#,
        )
        .fetch_one(conn)
        .await
        .map_err(Error::from)
    }

    /// Distinct device sightings, optionally restricted to records at or
    /// after the given cutoff. No ordering is promised.
    pub async fn device_sightings(
        conn: &mut PgConnection,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<DeviceSighting>> {
        match since {
            Some(cutoff) => {
                sqlx::query_as::<_, DeviceSighting>(
                    r#"
                    select distinct username, device_id, device_ip, device_mac
                    from cell_records
                    where timestamp >= $1
                    "#,
                )
                .bind(cutoff)
                .fetch_all(conn)
                .await
            }
            None => {
                sqlx::query_as::<_, DeviceSighting>(
                    r#"
                    select distinct username, device_id, device_ip, device_mac
                    from cell_records
                    "#,
                )
                .fetch_all(conn)
                .await
            }
        }
        .map_err(Error::from)
    }
}
