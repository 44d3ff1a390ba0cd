//! Monetization Ledger Types
//!
//! Amounts are integer cents. A creator's balance is the sum of donations
//! received minus the sum of withdrawals.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::social::user::UserSummary;
use crate::shared::SharedError;

/// Request to donate to the author of a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonateRequest {
    pub amount_cents: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// A recorded donation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationResponse {
    pub id: Uuid,
    /// `None` once the post has been deleted
    pub post_id: Option<Uuid>,
    pub creator_id: Uuid,
    pub donor_id: Uuid,
    pub amount_cents: i64,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creator balance summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceResponse {
    pub total_received_cents: i64,
    pub total_withdrawn_cents: i64,
    pub available_cents: i64,
    pub donation_count: i64,
}

impl BalanceResponse {
    pub fn new(total_received_cents: i64, total_withdrawn_cents: i64, donation_count: i64) -> Self {
        Self {
            total_received_cents,
            total_withdrawn_cents,
            available_cents: total_received_cents - total_withdrawn_cents,
            donation_count,
        }
    }
}

/// A donor aggregated over all their donations to one creator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supporter {
    pub user: UserSummary,
    pub total_cents: i64,
    pub donation_count: i64,
    pub last_donated_at: DateTime<Utc>,
}

/// Supporters ranked by total donated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportersResponse {
    pub supporters: Vec<Supporter>,
    pub total_cents: i64,
}

/// Request to withdraw from the available balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub amount_cents: i64,
    /// Payout method label, e.g. `bank_transfer` or `paypal`
    pub method: String,
    /// Account identifier for the payout method
    pub destination: String,
}

/// Status of a withdrawal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Completed => "completed",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for WithdrawalStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(WithdrawalStatus::Pending),
            "completed" => Ok(WithdrawalStatus::Completed),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            _ => Err(SharedError::validation("status", format!("unknown withdrawal status '{}'", s))),
        }
    }
}

/// A recorded withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalResponse {
    pub id: Uuid,
    pub amount_cents: i64,
    pub method: String,
    pub destination: String,
    pub status: WithdrawalStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_available() {
        let balance = BalanceResponse::new(5_000, 1_250, 4);
        assert_eq!(balance.available_cents, 3_750);
        assert_eq!(balance.donation_count, 4);
    }

    #[test]
    fn test_withdrawal_status_strings() {
        assert_eq!("Completed".parse::<WithdrawalStatus>(), Ok(WithdrawalStatus::Completed));
        assert_eq!(WithdrawalStatus::Rejected.as_str(), "rejected");
        assert!("refunded".parse::<WithdrawalStatus>().is_err());
    }
}
