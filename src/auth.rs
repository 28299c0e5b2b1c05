use crate::{
    api::{api_error, internal_error, ApiError},
    user::User,
    Error,
};
use axum::{
    async_trait,
    extract::{Extension, FromRequest, RequestParts},
    http::{header::AUTHORIZATION, HeaderMap},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPool;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid token")]
    MalformedToken,
    #[error("token has expired")]
    ExpiredToken,
    #[error("invalid user")]
    UnknownUser,
    #[error("admin access required")]
    InsufficientRole,
    #[error("invalid username or password")]
    InvalidCredentials,
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Forbidden(err.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and validates the signed bearer tokens carried by every
/// authenticated request. One signing secret per process, no rotation.
#[derive(Clone)]
pub struct TokenAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenAuth {
    pub fn new(secret: &str, lifetime: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::seconds(lifetime.as_secs() as i64),
        }
    }

    /// Signs a token for the given account. Touches no storage.
    pub fn issue(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Verifies signature and expiry and returns the subject account id.
    pub fn decode(&self, token: &str) -> Result<i64, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::MalformedToken,
        })?;
        data.claims.sub.parse().map_err(|_| AuthError::MalformedToken)
    }
}

/// Pulls the token out of an "Authorization: Bearer <token>" header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

async fn authenticate<B: Send>(req: &mut RequestParts<B>) -> Result<User, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| api_error(AuthError::MissingToken))?
        .to_string();
    let Extension(token_auth) = Extension::<TokenAuth>::from_request(req)
        .await
        .map_err(internal_error)?;
    let user_id = token_auth.decode(&token).map_err(api_error)?;

    let Extension(pool) = Extension::<PgPool>::from_request(req)
        .await
        .map_err(internal_error)?;
    User::get(&pool, user_id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| api_error(AuthError::UnknownUser))
}

/// Extractor for endpoints open to any authenticated account. A token issued
/// to an admin account passes here too; only [`AdminUser`] restricts by role.
pub struct AuthUser(pub User);

#[async_trait]
impl<B> FromRequest<B> for AuthUser
where
    B: Send,
{
    type Rejection = ApiError;

    async fn from_request(req: &mut RequestParts<B>) -> std::result::Result<Self, Self::Rejection> {
        authenticate(req).await.map(Self)
    }
}

/// Extractor for admin-only endpoints.
pub struct AdminUser(pub User);

#[async_trait]
impl<B> FromRequest<B> for AdminUser
where
    B: Send,
{
    type Rejection = ApiError;

    async fn from_request(req: &mut RequestParts<B>) -> std::result::Result<Self, Self::Rejection> {
        let user = authenticate(req).await?;
        if !user.is_admin() {
            return Err(api_error(AuthError::InsufficientRole));
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn token_auth() -> TokenAuth {
        TokenAuth::new("test-secret", std::time::Duration::from_secs(4 * 24 * 3600))
    }

    #[test]
    fn token_round_trip() {
        let auth = token_auth();
        let token = auth.issue(42).unwrap();
        assert_eq!(auth.decode(&token).unwrap(), 42);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = token_auth();
        let now = Utc::now();
        let claims = Claims {
            sub: "42".to_string(),
            iat: (now - Duration::days(5)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &auth.encoding).unwrap();
        assert_eq!(auth.decode(&token), Err(AuthError::ExpiredToken));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let auth = token_auth();
        assert_eq!(auth.decode("not-a-token"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn non_numeric_subject_is_malformed() {
        let auth = token_auth();
        let now = Utc::now();
        let claims = Claims {
            sub: "nobody".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(1)).timestamp(),
        };
        let token =
            jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &auth.encoding).unwrap();
        assert_eq!(auth.decode(&token), Err(AuthError::MalformedToken));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let auth = token_auth();
        let other = TokenAuth::new("other-secret", std::time::Duration::from_secs(3600));
        let token = other.issue(42).unwrap();
        assert_eq!(auth.decode(&token), Err(AuthError::MalformedToken));
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);
    }
}
