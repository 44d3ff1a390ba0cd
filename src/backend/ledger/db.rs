//! Database operations for the monetization ledger
//!
//! Balances are never stored: they are summed from `donations` and
//! `withdrawals` on every read, so the ledger cannot drift.

use chrono::Utc;
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::backend::auth::users::{summary_columns, summary_from_row};
use crate::shared::social::{
    BalanceResponse, DonationResponse, Supporter, WithdrawalResponse, WithdrawalStatus,
};
use crate::shared::SharedError;

/// Result of a withdrawal attempt
#[derive(Debug)]
pub enum WithdrawalOutcome {
    Completed(WithdrawalResponse),
    /// The balance did not cover the amount; nothing was recorded
    InsufficientFunds { available_cents: i64 },
}

/// Record a donation from `donor_id` to the author of `post_id`
///
/// Returns `None` when the post (or either user) was deleted after the caller
/// looked it up.
pub async fn create_donation(
    pool: &SqlitePool,
    post_id: Uuid,
    creator_id: Uuid,
    donor_id: Uuid,
    amount_cents: i64,
    message: Option<&str>,
) -> Result<Option<DonationResponse>, sqlx::Error> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    let inserted = sqlx::query(
        r#"
        INSERT INTO donations (id, post_id, creator_id, donor_id, amount_cents, message, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(post_id)
    .bind(creator_id)
    .bind(donor_id)
    .bind(amount_cents)
    .bind(message)
    .bind(created_at)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => Ok(Some(DonationResponse {
            id,
            post_id: Some(post_id),
            creator_id,
            donor_id,
            amount_cents,
            message: message.map(str::to_string),
            created_at,
        })),
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Ok(None),
        Err(e) => Err(e),
    }
}

async fn balance_on(conn: &mut SqliteConnection, user_id: Uuid) -> Result<BalanceResponse, sqlx::Error> {
    let (received, donation_count): (i64, i64) = sqlx::query_as(
        "SELECT COALESCE(SUM(amount_cents), 0), COUNT(*) FROM donations WHERE creator_id = ?",
    )
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    let withdrawn: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount_cents), 0) FROM withdrawals WHERE user_id = ? AND status <> ?",
    )
    .bind(user_id)
    .bind(WithdrawalStatus::Rejected.as_str())
    .fetch_one(&mut *conn)
    .await?;

    Ok(BalanceResponse::new(received, withdrawn, donation_count))
}

/// Current balance of a creator
pub async fn get_balance(pool: &SqlitePool, user_id: Uuid) -> Result<BalanceResponse, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    balance_on(&mut conn, user_id).await
}

/// Donors of `creator_id` aggregated per donor, largest total first
pub async fn list_supporters(pool: &SqlitePool, creator_id: Uuid) -> Result<Vec<Supporter>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {}, SUM(d.amount_cents) AS total_cents, COUNT(*) AS donation_count, \
         MAX(d.created_at) AS last_donated_at \
         FROM donations d JOIN users u ON u.id = d.donor_id \
         WHERE d.creator_id = ? \
         GROUP BY d.donor_id \
         ORDER BY total_cents DESC, last_donated_at DESC",
        summary_columns("u", "donor")
    ))
    .bind(creator_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(supporter_from_row).collect()
}

fn supporter_from_row(row: &SqliteRow) -> Result<Supporter, sqlx::Error> {
    Ok(Supporter {
        user: summary_from_row(row, "donor")?,
        total_cents: row.try_get("total_cents")?,
        donation_count: row.try_get("donation_count")?,
        last_donated_at: row.try_get("last_donated_at")?,
    })
}

/// Withdraw from the available balance
///
/// The balance check and the insert share one `BEGIN IMMEDIATE` transaction:
/// the write lock is taken before the balance is read, so concurrent
/// withdrawals queue behind each other (up to the pool's busy timeout)
/// instead of failing when they try to upgrade a read lock.
pub async fn create_withdrawal(
    pool: &SqlitePool,
    user_id: Uuid,
    amount_cents: i64,
    method: &str,
    destination: &str,
) -> Result<WithdrawalOutcome, sqlx::Error> {
    let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;

    let balance = balance_on(&mut tx, user_id).await?;
    if amount_cents > balance.available_cents {
        tx.rollback().await?;
        return Ok(WithdrawalOutcome::InsufficientFunds {
            available_cents: balance.available_cents,
        });
    }

    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let status = WithdrawalStatus::Completed;

    sqlx::query(
        r#"
        INSERT INTO withdrawals (id, user_id, amount_cents, method, destination, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(amount_cents)
    .bind(method)
    .bind(destination)
    .bind(status.as_str())
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(WithdrawalOutcome::Completed(WithdrawalResponse {
        id,
        amount_cents,
        method: method.to_string(),
        destination: destination.to_string(),
        status,
        created_at,
    }))
}

fn withdrawal_from_row(row: &SqliteRow) -> Result<WithdrawalResponse, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status: WithdrawalStatus = status.parse().map_err(|e: SharedError| sqlx::Error::Decode(e.into()))?;

    Ok(WithdrawalResponse {
        id: row.try_get("id")?,
        amount_cents: row.try_get("amount_cents")?,
        method: row.try_get("method")?,
        destination: row.try_get("destination")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

/// Withdrawals of `user_id`, newest first
pub async fn list_withdrawals(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<WithdrawalResponse>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT id, amount_cents, method, destination, status, created_at
        FROM withdrawals
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(withdrawal_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::users::create_user;
    use crate::backend::feed::db::{create_post, delete_post};
    use crate::backend::server::config::load_database;
    use crate::shared::social::MediaType;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_balance_and_supporters() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let creator = create_user(&pool, "creator", "creator@example.com", "hash").await.unwrap();
        let fan = create_user(&pool, "fan", "fan@example.com", "hash").await.unwrap();
        let superfan = create_user(&pool, "superfan", "superfan@example.com", "hash").await.unwrap();

        let post = create_post(&pool, creator.id, MediaType::Text, None, "hello", None).await.unwrap();

        let donation = create_donation(&pool, post, creator.id, fan.id, 500, Some("nice")).await.unwrap();
        assert_eq!(donation.map(|d| d.amount_cents), Some(500));
        create_donation(&pool, post, creator.id, superfan.id, 700, None).await.unwrap();
        create_donation(&pool, post, creator.id, superfan.id, 300, None).await.unwrap();

        let balance = get_balance(&pool, creator.id).await.unwrap();
        assert_eq!(balance, BalanceResponse::new(1_500, 0, 3));

        let supporters = list_supporters(&pool, creator.id).await.unwrap();
        assert_eq!(supporters.len(), 2);
        assert_eq!(supporters[0].user.username, "superfan");
        assert_eq!(supporters[0].total_cents, 1_000);
        assert_eq!(supporters[0].donation_count, 2);
        assert_eq!(supporters[1].user.username, "fan");
    }

    #[tokio::test]
    async fn test_withdrawal_cannot_overdraw() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let creator = create_user(&pool, "creator", "creator@example.com", "hash").await.unwrap();
        let fan = create_user(&pool, "fan", "fan@example.com", "hash").await.unwrap();
        let post = create_post(&pool, creator.id, MediaType::Text, None, "hello", None).await.unwrap();
        create_donation(&pool, post, creator.id, fan.id, 2_000, None).await.unwrap();

        let outcome = create_withdrawal(&pool, creator.id, 1_500, "paypal", "creator@example.com")
            .await
            .unwrap();
        assert!(matches!(outcome, WithdrawalOutcome::Completed(ref w) if w.status == WithdrawalStatus::Completed));

        let outcome = create_withdrawal(&pool, creator.id, 600, "paypal", "creator@example.com")
            .await
            .unwrap();
        assert!(matches!(outcome, WithdrawalOutcome::InsufficientFunds { available_cents: 500 }));

        let balance = get_balance(&pool, creator.id).await.unwrap();
        assert_eq!(balance.total_withdrawn_cents, 1_500);
        assert_eq!(balance.available_cents, 500);
        assert_eq!(list_withdrawals(&pool, creator.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_donations_survive_post_deletion() {
        let pool = load_database("sqlite::memory:").await.unwrap();
        let creator = create_user(&pool, "creator", "creator@example.com", "hash").await.unwrap();
        let fan = create_user(&pool, "fan", "fan@example.com", "hash").await.unwrap();
        let post = create_post(&pool, creator.id, MediaType::Text, None, "hello", None).await.unwrap();
        create_donation(&pool, post, creator.id, fan.id, 250, None).await.unwrap();

        assert!(delete_post(&pool, post).await.unwrap());

        let balance = get_balance(&pool, creator.id).await.unwrap();
        assert_eq!(balance.total_received_cents, 250);

        // a donation racing the delete finds the post gone
        let late = create_donation(&pool, post, creator.id, fan.id, 100, None).await.unwrap();
        assert!(late.is_none());
        assert_eq!(get_balance(&pool, creator.id).await.unwrap().donation_count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_withdrawals_settle_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
        let pool = load_database(&url).await.unwrap();

        let creator = create_user(&pool, "creator", "creator@example.com", "hash").await.unwrap();
        let fan = create_user(&pool, "fan", "fan@example.com", "hash").await.unwrap();
        let post = create_post(&pool, creator.id, MediaType::Text, None, "hello", None).await.unwrap();
        create_donation(&pool, post, creator.id, fan.id, 10_000, None).await.unwrap();

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move {
                    create_withdrawal(&pool, creator.id, 1_000, "paypal", "creator@example.com").await
                })
            })
            .collect();

        let mut completed = 0;
        let mut refused = 0;
        for attempt in attempts {
            match attempt.await.unwrap().unwrap() {
                WithdrawalOutcome::Completed(_) => completed += 1,
                WithdrawalOutcome::InsufficientFunds { available_cents } => {
                    assert_eq!(available_cents, 0);
                    refused += 1;
                }
            }
        }

        assert_eq!((completed, refused), (10, 6));
        let balance = get_balance(&pool, creator.id).await.unwrap();
        assert_eq!(balance.total_withdrawn_cents, 10_000);
        assert_eq!(balance.available_cents, 0);
    }
}
