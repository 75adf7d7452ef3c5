use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use jsonwebtoken::{Header, encode};
use password_hash::rand_core::OsRng;

use crate::{
    audit::{AuditAction, record},
    db::DbPool,
    dto::auth::{AuthResponse, Claims, LoginRequest, RegisterRequest},
    error::{AppError, AppResult},
    models::{PublicUser, User},
    response::{ApiResponse, Meta},
    state::{AppState, JwtKeys},
    validation::{self, MIN_PASSWORD_LEN},
};

const INVALID_CREDENTIALS: &str = "Invalid username/email or password";

/// Registration input after boundary checks.
#[derive(Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

pub fn validate_registration(payload: RegisterRequest) -> AppResult<NewUser> {
    let username = validation::required("username", payload.username)?;
    let email = validation::email("email", payload.email)?;
    let password = payload.password.filter(|p| !p.is_empty()).ok_or_else(|| {
        AppError::BadRequest("password is required".into())
    })?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    Ok(NewUser {
        username,
        email,
        password,
        display_name: validation::optional(payload.display_name),
    })
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let new_user = validate_registration(payload)?;

    let exist: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2")
            .bind(&new_user.username)
            .bind(&new_user.email)
            .fetch_optional(&state.pool)
            .await?;

    if exist.is_some() {
        return Err(AppError::Conflict("Username or email is already taken".into()));
    }

    let password_hash = hash_password(&new_user.password)?;

    let user: User = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, display_name) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&new_user.username)
    .bind(&new_user.email)
    .bind(password_hash)
    .bind(&new_user.display_name)
    .fetch_one(&state.pool)
    .await
    .map_err(|err| match err {
        // lost a race with a concurrent registration
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("Username or email is already taken".into())
        }
        other => AppError::DbError(other),
    })?;

    let token = issue_token(&state.jwt, &user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    record(
        &state.orm,
        Some(user.id),
        AuditAction::UserRegister,
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        AuthResponse {
            user: user.into(),
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<AuthResponse>> {
    let identifier = validation::required("identifier", payload.identifier)?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("password is required".into()))?;

    // An exact username match wins over another account's email.
    let user: Option<User> = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 OR email = LOWER($1) \
         ORDER BY (username = $1) DESC LIMIT 1",
    )
    .bind(&identifier)
    .fetch_optional(&state.pool)
    .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into())),
    };

    if !verify_password(&password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let token = issue_token(&state.jwt, &user)?;
    record(
        &state.orm,
        Some(user.id),
        AuditAction::UserLogin,
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        AuthResponse {
            user: user.into(),
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn verify_user(pool: &DbPool, username: &str) -> AppResult<ApiResponse<PublicUser>> {
    let user = find_public_user(pool, username).await?;
    Ok(ApiResponse::success("User found", user, Some(Meta::empty())))
}

pub async fn find_public_user(pool: &DbPool, username: &str) -> AppResult<PublicUser> {
    sqlx::query_as::<_, PublicUser>(
        "SELECT id, username, email, display_name, created_at FROM users WHERE username = $1",
    )
    .bind(username.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("User not found"))
}

pub fn issue_token(keys: &JwtKeys, user: &User) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(keys.ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        exp: expiration.timestamp() as usize,
    };

    encode(&Header::default(), &claims, &keys.encoding)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
