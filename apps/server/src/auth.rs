use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use givebox_core::errors::ValidationError;
use givebox_core::users::{NewUser, User};
use givebox_core::Principal;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::main_lib::AppState;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    code: u16,
    message: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    exp: usize,
    iat: usize,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
    #[serde(flatten)]
    pub token: LoginResponse,
}

impl AuthManager {
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            validation,
            token_ttl,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(&self, password_hash: &str, candidate: &str) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::Internal(format!("Stored password hash is invalid: {e}")))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials,
                other => AuthError::Internal(format!("Password verification failed: {other}")),
            })
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.token_ttl;
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Decodes a bearer token into the principal it was issued for.
    pub fn validate_token(&self, token: &str) -> Result<Principal, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| Principal::new(data.claims.sub, data.claims.username))
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_)
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    AuthError::Unauthorized
                }
                other => AuthError::Internal(format!("Failed to validate token: {other:?}")),
            })
    }

    pub fn expires_in(&self) -> Duration {
        self.token_ttl
    }

    fn login_response(&self, user: &User) -> Result<LoginResponse, AuthError> {
        Ok(LoginResponse {
            access_token: self.issue_token(user)?,
            token_type: "Bearer".to_string(),
            expires_in: self.expires_in().as_secs(),
        })
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "authentication failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(AuthErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(msg) => ApiError::Internal(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

/// The caller attached by [`attach_principal`]; `None` for anonymous requests.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Principal>);

impl CurrentUser {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<Principal>().cloned()))
    }
}

/// Resolves the bearer token, if any, into a [`Principal`] extension.
///
/// Requests without an `Authorization` header continue anonymously; a
/// malformed, forged or expired token is rejected with 401.
pub async fn attach_principal(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };
    let header = header.to_str().map_err(|_| AuthError::Unauthorized)?;

    let mut parts = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(AuthError::Unauthorized);
    };

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Unauthorized);
    }

    let principal = state.auth.validate_token(token)?;
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Core(
            ValidationError::field(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            )
            .into(),
        ));
    }
    let password_hash = state.auth.hash_password(&payload.password)?;
    let user = state
        .user_service
        .register(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
        })
        .await?;
    let token = state.auth.login_response(&user)?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user, token })))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let credentials = state
        .user_service
        .find_credentials(&payload.username)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;
    state
        .auth
        .verify_password(&credentials.password_hash, &payload.password)?;
    tracing::info!(user = %credentials.user.username, "login succeeded");
    Ok(Json(state.auth.login_response(&credentials.user)?))
}

async fn me(State(state): State<Arc<AppState>>, user: CurrentUser) -> ApiResult<Json<User>> {
    let principal = user.principal().ok_or(AuthError::Unauthorized)?;
    let user = state.user_service.get_user(&principal.user_id)?;
    Ok(Json(user))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manager(ttl: Duration) -> AuthManager {
        AuthManager::new(&[7u8; 32], ttl)
    }

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            username: "ana".to_string(),
            email: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn token_round_trips_to_principal() {
        let auth = manager(Duration::from_secs(600));
        let token = auth.issue_token(&user()).unwrap();
        let principal = auth.validate_token(&token).unwrap();
        assert_eq!(principal, Principal::new("u-1", "ana"));
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let token = manager(Duration::from_secs(600)).issue_token(&user()).unwrap();
        let other = AuthManager::new(&[9u8; 32], Duration::from_secs(600));
        assert!(matches!(
            other.validate_token(&token),
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            other.validate_token("not-a-jwt"),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let auth = manager(Duration::from_secs(60));
        let hash = auth.hash_password("correct horse").unwrap();
        assert!(auth.verify_password(&hash, "correct horse").is_ok());
        assert!(matches!(
            auth.verify_password(&hash, "wrong horse"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn secret_key_formats() {
        let b64 = BASE64.encode([1u8; 32]);
        assert_eq!(decode_secret_key(&b64).unwrap(), vec![1u8; 32]);
        assert_eq!(
            decode_secret_key("abcdefghijklmnopqrstuvwxyz!@#$%^").unwrap().len(),
            32
        );
        assert!(decode_secret_key("   ").is_err());
        assert!(decode_secret_key(&BASE64.encode([1u8; 16])).is_err());
    }
}
