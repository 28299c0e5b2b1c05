use crate::{Error, Result};
use serde::Serialize;
use sqlx::PgConnection;

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: String,
}

impl User {
    /// Inserts a new account, hashing the password before it is stored.
    pub async fn insert<'c, E>(executor: E, username: &str, password: &str, role: &str) -> Result<Self>
    where
        E: sqlx::Executor<'c, Database = sqlx::Postgres>,
    {
        let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        sqlx::query_as::<_, Self>(
            r#"
            insert into users (username, hashed_password, role)
            values ($1, $2, $3)
            returning *
            "#,
        )
        .bind(username)
        .bind(&hashed_password)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(Error::from)
    }

    pub async fn get<'c, E>(executor: E, id: i64) -> Result<Option<Self>>
    where
        E: sqlx::Executor<'c, Database = sqlx::Postgres>,
    {
        sqlx::query_as::<_, Self>(
            r#"
            select * from users
            where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(Error::from)
    }

    pub async fn by_username(conn: &mut PgConnection, username: &str) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            select * from users
            where username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(Error::from)
    }

    /// Role-scoped lookup. Login uses the "user" scope, admin login the
    /// "admin" scope, so a correct password against the wrong role never
    /// yields a token.
    pub async fn by_username_and_role(
        conn: &mut PgConnection,
        username: &str,
        role: &str,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            select * from users
            where username = $1 and role = $2
            "#,
        )
        .bind(username)
        .bind(role)
        .fetch_optional(conn)
        .await
        .map_err(Error::from)
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        bcrypt::verify(password, &self.hashed_password).map_err(Error::from)
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}
