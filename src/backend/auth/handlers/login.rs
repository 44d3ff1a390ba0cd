/**
 * Login Handler
 *
 * This module implements the user authentication handler for POST /api/auth/login.
 *
 * # Authentication Process
 *
 * 1. Look up user by username, or by email when the identifier contains `@`
 * 2. Verify password using bcrypt
 * 3. Generate JWT token
 * 4. Return token and user info
 *
 * # Security
 *
 * Unknown users and wrong passwords produce the same 401 response.
 */

use axum::{extract::State, response::Json};
use bcrypt::verify;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Login handler
///
/// # Errors
///
/// * `401 Unauthorized` - If user is not found or password is incorrect
/// * `500 Internal Server Error` - If database query or token generation fails
///
/// # Example Request
///
/// ```http
/// POST /api/auth/login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "username": "maya_sings",
///   "password": "securepassword123"
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let identifier = request.username.trim();
    tracing::info!("Login request for: {}", identifier);

    let user = if identifier.contains('@') {
        get_user_by_email(&state.db, identifier).await?
    } else {
        get_user_by_username(&state.db, identifier).await?
    };

    let user = user.ok_or_else(|| {
        tracing::warn!("User not found: {}", identifier);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    if !verify(&request.password, &user.password_hash)? {
        tracing::warn!("Invalid password for user: {}", user.username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = create_token(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )?;

    tracing::info!("User logged in successfully: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
