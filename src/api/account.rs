use crate::{
    api::{api_error, internal_error, ApiError, DatabaseConnection},
    auth::{AuthError, TokenAuth},
    user::{self, User},
    Error,
};
use axum::{extract::Extension, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    fn required(self) -> Result<(String, String), ApiError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            }
            _ => Err(api_error(Error::bad_request(
                "username and password are required",
            ))),
        }
    }
}

pub async fn register(
    Json(credentials): Json<Credentials>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (username, password) = credentials.required()?;

    if User::by_username(&mut conn, &username)
        .await
        .map_err(api_error)?
        .is_some()
    {
        return Err(api_error(Error::conflict("username already exists")));
    }

    // registration can never mint an admin account
    let user = User::insert(&mut *conn, &username, &password, user::ROLE_USER)
        .await
        .map_err(api_error)?;
    let json = serde_json::to_value(&user).map_err(internal_error)?;
    Ok((StatusCode::CREATED, Json(json)))
}

pub async fn login(
    Json(credentials): Json<Credentials>,
    Extension(token_auth): Extension<TokenAuth>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (username, password) = credentials.required()?;

    let user = match User::by_username_and_role(&mut conn, &username, user::ROLE_USER)
        .await
        .map_err(api_error)?
    {
        // same rejection for a bad username and a bad password
        Some(user) if user.verify_password(&password).map_err(api_error)? => user,
        _ => return Err(api_error(AuthError::InvalidCredentials)),
    };

    let token = token_auth.issue(user.id).map_err(internal_error)?;
    Ok(Json(json!({ "token": token })))
}

pub async fn admin_login(
    Json(credentials): Json<Credentials>,
    Extension(token_auth): Extension<TokenAuth>,
    DatabaseConnection(mut conn): DatabaseConnection,
) -> Result<Json<Value>, ApiError> {
    let (username, password) = credentials.required()?;

    // role-scoped lookup: a user-role account is refused here even with a
    // correct password
    let Some(user) = User::by_username_and_role(&mut conn, &username, user::ROLE_ADMIN)
        .await
        .map_err(api_error)?
    else {
        return Err(api_error(Error::forbidden("admin account not found")));
    };
    if !user.verify_password(&password).map_err(api_error)? {
        return Err(api_error(Error::forbidden("incorrect password")));
    }

    let token = token_auth.issue(user.id).map_err(internal_error)?;
    Ok(Json(json!({ "admin_token": token })))
}
