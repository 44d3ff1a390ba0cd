/**
 * API Route Handlers
 *
 * This module wires the `/api` endpoints to their handlers.
 *
 * # Public Routes
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login
 *
 * # Protected Routes
 *
 * Everything else requires `Authorization: Bearer <token>`; the
 * `auth_middleware` is attached with `route_layer`, so unknown paths still
 * fall through to the fallback instead of answering 401.
 */

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::backend::auth::{get_me, login, signup};
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::notifications_stream;
use crate::backend::server::state::AppState;
use crate::backend::{challenges, feed, follows, ledger, live, notifications, profiles};

/// Configure routes reachable without a session
pub fn configure_public_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}

/// Build the authenticated `/api` routes
///
/// `/api/users/search` and `/api/users/me` are registered next to
/// `/api/users/{id}`; axum prefers the static segments.
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Auth
        .route("/api/auth/me", get(get_me))
        // Profiles and follows
        .route("/api/users/search", get(profiles::search_users))
        .route("/api/users/me", patch(profiles::update_me))
        .route("/api/users/{id}", get(profiles::get_profile))
        .route(
            "/api/users/{id}/follow",
            post(follows::follow_user).delete(follows::unfollow_user),
        )
        .route("/api/users/{id}/followers", get(follows::list_followers))
        .route("/api/users/{id}/following", get(follows::list_following))
        .route("/api/users/{id}/posts", get(feed::list_user_posts))
        // Feed
        .route("/api/posts", get(feed::list_feed).post(feed::create_post))
        .route("/api/posts/{id}", get(feed::get_post).delete(feed::delete_post))
        .route("/api/posts/{id}/like", post(feed::toggle_like))
        .route(
            "/api/posts/{id}/comments",
            get(feed::list_comments).post(feed::create_comment),
        )
        .route(
            "/api/posts/{id}/comments/{comment_id}",
            axum::routing::delete(feed::delete_comment),
        )
        // Ledger
        .route("/api/posts/{id}/donations", post(ledger::donate))
        .route("/api/balance", get(ledger::get_balance))
        .route("/api/balance/supporters", get(ledger::list_supporters))
        .route(
            "/api/withdrawals",
            get(ledger::list_withdrawals).post(ledger::create_withdrawal),
        )
        // Notifications
        .route("/api/notifications", get(notifications::list_notifications))
        .route("/api/notifications/unread-count", get(notifications::unread_count))
        .route("/api/notifications/read-all", post(notifications::mark_all_read))
        .route("/api/notifications/stream", get(notifications_stream))
        .route("/api/notifications/{id}/read", patch(notifications::mark_read))
        // Challenges
        .route(
            "/api/challenges",
            get(challenges::list_challenges).post(challenges::create_challenge),
        )
        .route("/api/challenges/{id}", get(challenges::get_challenge))
        // Live streams
        .route("/api/live", get(live::list_streams).post(live::start_stream))
        .route("/api/live/{id}", get(live::get_stream))
        .route("/api/live/{id}/end", post(live::end_stream))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
