/**
 * Signup Handler
 *
 * This module implements the user registration handler for POST /api/auth/signup.
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Check if username or email is already taken
 * 3. Hash password using bcrypt at the configured cost
 * 4. Create user in database
 * 5. Generate JWT token
 * 6. Return token and user info
 *
 * # Security
 *
 * - Passwords are never returned in responses
 * - A concurrent signup that wins the race still yields 409 through the
 *   unique constraints on `users`
 */

use axum::{extract::State, response::Json};
use bcrypt::hash;

use crate::backend::auth::handlers::types::{AuthResponse, SignupRequest};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{create_user, get_user_by_email, get_user_by_username};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::validation::{is_valid_email, is_valid_username, MIN_PASSWORD_LEN};

/// Sign up handler
///
/// # Errors
///
/// * `400 Bad Request` - Invalid username, email or password
/// * `409 Conflict` - Username or email already taken
/// * `500 Internal Server Error` - Hashing, database or token failure
///
/// # Example Request
///
/// ```http
/// POST /api/auth/signup HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "username": "maya_sings",
///   "email": "maya@example.com",
///   "password": "securepassword123"
/// }
/// ```
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, BackendError> {
    let username = request.username.trim();
    let email = request.email.trim();
    tracing::info!("Signup request for username: {}", username);

    if !is_valid_username(username) {
        tracing::warn!("Invalid username format: {}", username);
        return Err(BackendError::validation(
            "username",
            "must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if !is_valid_email(email) {
        tracing::warn!("Invalid email format: {}", email);
        return Err(BackendError::validation("email", "invalid email format"));
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BackendError::validation(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }

    if get_user_by_username(&state.db, username).await?.is_some() {
        tracing::warn!("Username already exists: {}", username);
        return Err(BackendError::conflict("Username already taken"));
    }

    if get_user_by_email(&state.db, email).await?.is_some() {
        tracing::warn!("Email already exists: {}", email);
        return Err(BackendError::conflict("Email already registered"));
    }

    let password_hash = hash(&request.password, state.config.bcrypt_cost)?;
    let user = create_user(&state.db, username, email, &password_hash).await?;
    let token = create_token(
        user.id,
        &user.username,
        &state.config.jwt_secret,
        state.config.token_ttl_days,
    )?;

    tracing::info!("User created successfully: {} ({})", user.username, user.id);

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}
