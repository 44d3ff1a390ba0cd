//! Authentication Module
//!
//! This module handles user authentication, registration, and session management.
//! It provides HTTP handlers for authentication endpoints and manages user data
//! and JWT tokens.
//!
//! # Architecture
//!
//! - **`users`** - User data model and database operations
//! - **`sessions`** - JWT token generation and validation
//! - **`handlers`** - HTTP handlers for authentication endpoints
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── users.rs        - User model and database operations
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Signup**: username, email and password → user created → JWT returned
//! 2. **Login**: username (or email) and password → verified → JWT returned
//! 3. **Get Me**: bearer token → verified by middleware → account returned
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt before storage
//! - JWT tokens are used for stateless authentication
//! - Tokens expire after `token_ttl_days`
//! - Invalid credentials return 401 (no information leakage)

/// User data model and database operations
pub mod users;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::types::{SignupRequest, LoginRequest, AuthResponse, UserResponse};
pub use handlers::{signup, login, get_me};
pub use users::User;
