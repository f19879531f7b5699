//! Phone call repository implementation
//!
//! Provides PostgreSQL-backed storage for phone calls with the staleness
//! query and the optimistic conditional state transition used by the expiry
//! workflows. The transition is guarded by the expected previous state so a
//! call concurrently advanced by the live call-handling path is never
//! overwritten.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use telapi_core::{
    models::{CallState, PhoneCall},
    traits::PhoneCallRepository,
    AppError, AppResult,
};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of PhoneCallRepository
pub struct PgPhoneCallRepository {
    pool: PgPool,
}

impl PgPhoneCallRepository {
    /// Create a new phone call repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Parse call state from string
    fn parse_state(s: &str) -> CallState {
        CallState::from_str(s).unwrap_or(CallState::Failed)
    }
}

const PHONE_CALL_COLUMNS: &str = r#"
    id, sid, account_sid, parent_call_sid, to_number, from_number,
    phone_number_sid, state, direction, start_time, end_time, duration,
    price, price_unit, date_created, date_updated, created_at, updated_at
"#;

#[async_trait]
impl PhoneCallRepository for PgPhoneCallRepository {
    #[instrument(skip(self, call))]
    async fn create(&self, call: &PhoneCall) -> AppResult<PhoneCall> {
        debug!("Creating phone call {}", call.sid);

        let row = sqlx::query_as::<sqlx::Postgres, PhoneCallRow>(&format!(
            r#"
            INSERT INTO phone_calls (
                sid, account_sid, parent_call_sid, to_number, from_number,
                phone_number_sid, state, direction, start_time, end_time,
                duration, price, price_unit, date_created, date_updated
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {PHONE_CALL_COLUMNS}
            "#
        ))
        .bind(&call.sid)
        .bind(&call.account_sid)
        .bind(&call.parent_call_sid)
        .bind(&call.to)
        .bind(&call.from)
        .bind(&call.phone_number_sid)
        .bind(call.state.to_string())
        .bind(&call.direction)
        .bind(call.start_time)
        .bind(call.end_time)
        .bind(call.duration)
        .bind(call.price)
        .bind(&call.price_unit)
        .bind(call.date_created)
        .bind(call.date_updated)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error creating call {}: {}", call.sid, e);
            AppError::Database(format!("Failed to create call: {}", e))
        })?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn find_by_sid(&self, sid: &str) -> AppResult<Option<PhoneCall>> {
        debug!("Finding call by sid: {}", sid);

        let result = sqlx::query_as::<sqlx::Postgres, PhoneCallRow>(&format!(
            r#"
            SELECT {PHONE_CALL_COLUMNS}
            FROM phone_calls
            WHERE sid = $1
            "#
        ))
        .bind(sid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding call {}: {}", sid, e);
            AppError::Database(format!("Failed to find call: {}", e))
        })?;

        Ok(result.map(Into::into))
    }

    #[instrument(skip(self))]
    async fn list_by_account(
        &self,
        account_sid: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PhoneCall>> {
        debug!(
            "Listing calls for account {} with limit {} offset {}",
            account_sid, limit, offset
        );

        let rows = sqlx::query_as::<sqlx::Postgres, PhoneCallRow>(&format!(
            r#"
            SELECT {PHONE_CALL_COLUMNS}
            FROM phone_calls
            WHERE account_sid = $1
            ORDER BY date_created DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(account_sid)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing calls: {}", e);
            AppError::Database(format!("Failed to list calls: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn find_stale(
        &self,
        state: CallState,
        older_than: Duration,
    ) -> AppResult<Vec<PhoneCall>> {
        let cutoff = Utc::now() - older_than;
        debug!("Finding calls in state {} updated before {}", state, cutoff);

        let rows = sqlx::query_as::<sqlx::Postgres, PhoneCallRow>(&format!(
            r#"
            SELECT {PHONE_CALL_COLUMNS}
            FROM phone_calls
            WHERE state = $1
                AND date_updated <= $2
            ORDER BY date_updated ASC
            "#
        ))
        .bind(state.to_string())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding stale calls: {}", e);
            AppError::Database(format!("Failed to find stale calls: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    async fn transition_state(
        &self,
        id: i64,
        expected_state: CallState,
        new_state: CallState,
        new_date_updated: DateTime<Utc>,
    ) -> AppResult<bool> {
        debug!(
            "Transitioning call {} from {} to {}",
            id, expected_state, new_state
        );

        // Conditional update: zero rows affected means the call left the
        // expected state concurrently, which the caller treats as a skip.
        let result = sqlx::query(
            r#"
            UPDATE phone_calls
            SET state = $3,
                date_updated = $4,
                updated_at = NOW()
            WHERE id = $1
                AND state = $2
            "#,
        )
        .bind(id)
        .bind(expected_state.to_string())
        .bind(new_state.to_string())
        .bind(new_date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error transitioning call {}: {}", id, e);
            AppError::Database(format!("Failed to transition call: {}", e))
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_in_state(&self, state: CallState) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM phone_calls
            WHERE state = $1
            "#,
        )
        .bind(state.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error counting calls in state {}: {}", state, e);
            AppError::Database(format!("Failed to count calls: {}", e))
        })?;

        Ok(result.0)
    }
}

/// Helper struct for mapping database rows
#[derive(Debug, sqlx::FromRow)]
struct PhoneCallRow {
    id: i64,
    sid: String,
    account_sid: String,
    parent_call_sid: Option<String>,
    to_number: String,
    from_number: String,
    phone_number_sid: Option<String>,
    state: String,
    direction: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    duration: Option<i32>,
    price: Option<Decimal>,
    price_unit: Option<String>,
    date_created: DateTime<Utc>,
    date_updated: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PhoneCallRow> for PhoneCall {
    fn from(row: PhoneCallRow) -> Self {
        Self {
            id: row.id,
            sid: row.sid,
            account_sid: row.account_sid,
            parent_call_sid: row.parent_call_sid,
            to: row.to_number,
            from: row.from_number,
            phone_number_sid: row.phone_number_sid,
            state: PgPhoneCallRepository::parse_state(&row.state),
            direction: row.direction,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration,
            price: row.price,
            price_unit: row.price_unit,
            date_created: row.date_created,
            date_updated: row.date_updated,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
