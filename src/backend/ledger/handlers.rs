//! Ledger HTTP Handlers
//!
//! Donations, balances, supporters and withdrawals. All amounts are cents.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::db::{self, WithdrawalOutcome};
use crate::backend::error::BackendError;
use crate::backend::feed::db::post_author;
use crate::backend::middleware::AuthUser;
use crate::backend::notifications::{notify, NewNotification};
use crate::backend::server::state::AppState;
use crate::shared::social::{
    BalanceResponse, DonateRequest, DonationResponse, NotificationKind, SupportersResponse,
    WithdrawalRequest, WithdrawalResponse,
};
use crate::shared::validation::{check_amount, check_text};

/// Maximum length of a donation message
pub const MAX_DONATION_MESSAGE_LEN: usize = 280;

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// POST /api/posts/{id}/donations
///
/// # Errors
///
/// * `400 Bad Request` - Non-positive amount, or donating to your own post
/// * `404 Not Found` - Unknown post
pub async fn donate(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<DonateRequest>,
) -> Result<(StatusCode, Json<DonationResponse>), BackendError> {
    check_amount("amount_cents", request.amount_cents)?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    if let Some(message) = message {
        check_text("message", message, 1, MAX_DONATION_MESSAGE_LEN)?;
    }

    let creator_id = post_author(&state.db, post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    if creator_id == auth.user_id {
        return Err(BackendError::validation("post_id", "you cannot donate to your own post"));
    }

    let donation = db::create_donation(
        &state.db,
        post_id,
        creator_id,
        auth.user_id,
        request.amount_cents,
        message,
    )
    .await?
    .ok_or_else(|| BackendError::not_found("Post not found"))?;

    tracing::info!(
        "Donation {} of {} cents from {} to {}",
        donation.id,
        donation.amount_cents,
        auth.user_id,
        creator_id
    );

    let text = format!("{} donated ${} to your post", auth.username, format_cents(request.amount_cents));
    notify(
        &state.db,
        &state.rooms,
        NewNotification {
            recipient_id: creator_id,
            actor_id: Some(auth.user_id),
            kind: NotificationKind::Donation,
            post_id: Some(post_id),
            message: &text,
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(donation)))
}

/// GET /api/balance
pub async fn get_balance(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<BalanceResponse>, BackendError> {
    Ok(Json(db::get_balance(&state.db, auth.user_id).await?))
}

/// GET /api/balance/supporters
pub async fn list_supporters(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<SupportersResponse>, BackendError> {
    let supporters = db::list_supporters(&state.db, auth.user_id).await?;
    let total_cents = supporters.iter().map(|s| s.total_cents).sum();
    Ok(Json(SupportersResponse {
        supporters,
        total_cents,
    }))
}

/// POST /api/withdrawals
///
/// # Errors
///
/// * `400 Bad Request` - Amount below the configured minimum, above the
///   available balance, or missing payout details
pub async fn create_withdrawal(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
    Json(request): Json<WithdrawalRequest>,
) -> Result<(StatusCode, Json<WithdrawalResponse>), BackendError> {
    check_amount("amount_cents", request.amount_cents)?;

    let minimum = state.config.min_withdrawal_cents;
    if request.amount_cents < minimum {
        return Err(BackendError::validation(
            "amount_cents",
            format!("minimum withdrawal is {} cents", minimum),
        ));
    }

    let method = request.method.trim();
    let destination = request.destination.trim();
    check_text("method", method, 1, 50)?;
    check_text("destination", destination, 1, 200)?;

    let withdrawal = match db::create_withdrawal(&state.db, auth.user_id, request.amount_cents, method, destination)
        .await?
    {
        WithdrawalOutcome::Completed(withdrawal) => withdrawal,
        WithdrawalOutcome::InsufficientFunds { available_cents } => {
            return Err(BackendError::validation(
                "amount_cents",
                format!("insufficient funds: {} cents available", available_cents),
            ));
        }
    };

    tracing::info!(
        "Withdrawal {} of {} cents by {} via {}",
        withdrawal.id,
        withdrawal.amount_cents,
        auth.username,
        method
    );

    let text = format!("Your withdrawal of ${} via {} was completed", format_cents(withdrawal.amount_cents), method);
    notify(
        &state.db,
        &state.rooms,
        NewNotification {
            recipient_id: auth.user_id,
            actor_id: None,
            kind: NotificationKind::Withdrawal,
            post_id: None,
            message: &text,
        },
    )
    .await;

    Ok((StatusCode::CREATED, Json(withdrawal)))
}

/// GET /api/withdrawals
pub async fn list_withdrawals(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> Result<Json<Vec<WithdrawalResponse>>, BackendError> {
    Ok(Json(db::list_withdrawals(&state.db, auth.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1_250), "12.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(100), "1.00");
    }
}
