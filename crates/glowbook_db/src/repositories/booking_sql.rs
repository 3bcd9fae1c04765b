//! SQL implementation of the booking repository
//!
//! Timestamps and metadata are stored as TEXT (RFC 3339 / JSON) because the
//! `Any` driver only moves primitive types.

use crate::error::DbError;
use crate::repositories::booking::{
    Booking, BookingRepository, BookingStatus, NewBooking, PaymentStatus,
};
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info};

const BOOKING_COLUMNS: &str = "id, service_id, service_name, client_name, client_email, \
     client_phone, booking_date, payment_status, payment_intent_id, external_booking_uid, \
     status, amount_paid, currency, metadata, created_at, updated_at";

/// SQL implementation of the booking repository
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    pub fn db_client(&self) -> &DbClient {
        &self.db_client
    }
}

fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("{column}: {e}")))
}

fn row_to_booking(row: &AnyRow) -> Result<Booking, DbError> {
    let booking_date: String = row.try_get("booking_date")?;
    let payment_status: String = row.try_get("payment_status")?;
    let status: String = row.try_get("status")?;
    let metadata: String = row.try_get("metadata")?;
    let created_at: Option<String> = row.try_get("created_at")?;
    let updated_at: Option<String> = row.try_get("updated_at")?;

    Ok(Booking {
        id: row.try_get("id")?,
        service_id: row.try_get("service_id")?,
        service_name: row.try_get("service_name")?,
        client_name: row.try_get("client_name")?,
        client_email: row.try_get("client_email")?,
        client_phone: row.try_get("client_phone")?,
        booking_date: parse_timestamp("booking_date", &booking_date)?,
        payment_status: payment_status.parse()?,
        payment_intent_id: row.try_get("payment_intent_id")?,
        external_booking_uid: row.try_get("external_booking_uid")?,
        status: status.parse()?,
        amount_paid: row.try_get("amount_paid")?,
        currency: row.try_get("currency")?,
        metadata: serde_json::from_str(&metadata)
            .map_err(|e| DbError::DecodeError(format!("metadata: {e}")))?,
        created_at: created_at
            .map(|raw| parse_timestamp("created_at", &raw))
            .transpose()?,
        updated_at: updated_at
            .map(|raw| parse_timestamp("updated_at", &raw))
            .transpose()?,
    })
}

impl SqlBookingRepository {
    /// Inserts a row and returns its id. Constraint violations stay
    /// `DbError::SqlxError` so callers can tell a duplicate payment apart.
    async fn insert(&self, booking: &NewBooking, status: BookingStatus) -> Result<String, DbError> {
        debug!(
            "Recording {} booking for {} at {}",
            status.as_str(),
            booking.client_email,
            booking.booking_date
        );

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let metadata = serde_json::to_string(&booking.metadata)
            .map_err(|e| DbError::DecodeError(format!("metadata: {e}")))?;

        let query = r#"
            INSERT INTO bookings (
                id, service_id, service_name, client_name, client_email, client_phone,
                booking_date, payment_status, payment_intent_id, external_booking_uid,
                status, amount_paid, currency, metadata, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#;

        sqlx::query(query)
            .bind(&id)
            .bind(&booking.service_id)
            .bind(&booking.service_name)
            .bind(&booking.client_name)
            .bind(&booking.client_email)
            .bind(booking.client_phone.clone())
            .bind(booking.booking_date.to_rfc3339())
            .bind(booking.payment_status.as_str())
            .bind(booking.payment_intent_id.clone())
            .bind(booking.external_booking_uid.clone())
            .bind(status.as_str())
            .bind(booking.amount_paid)
            .bind(&booking.currency)
            .bind(metadata)
            .bind(&now)
            .bind(&now)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert booking: {}", e);
                DbError::SqlxError(e)
            })?;
        Ok(id)
    }

    async fn fetch_one_where(&self, column: &str, value: &str) -> Result<Option<Booking>, DbError> {
        let query = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE {column} = $1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find booking by {}: {}", column, e);
                DbError::QueryError(e.to_string())
            })?;
        row.as_ref().map(row_to_booking).transpose()
    }
}

impl BookingRepository for SqlBookingRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing booking schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                service_id TEXT NOT NULL,
                service_name TEXT NOT NULL,
                client_name TEXT NOT NULL,
                client_email TEXT NOT NULL,
                client_phone TEXT,
                booking_date TEXT NOT NULL,
                payment_status TEXT NOT NULL,
                payment_intent_id TEXT UNIQUE,
                external_booking_uid TEXT,
                status TEXT NOT NULL,
                amount_paid BIGINT NOT NULL DEFAULT 0,
                currency TEXT NOT NULL,
                metadata TEXT NOT NULL,
                cancellation_reason TEXT,
                created_at TEXT,
                updated_at TEXT
            )
        "#;
        self.db_client.execute(query).await?;

        info!("Booking schema initialized successfully");
        Ok(())
    }

    async fn create(&self, booking: NewBooking) -> Result<Booking, DbError> {
        let id = self.insert(&booking, BookingStatus::Confirmed).await?;
        info!("Booking {} created", id);
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DbError::QueryError(format!("booking {id} vanished after insert")))
    }

    async fn claim(&self, booking: NewBooking) -> Result<Option<Booking>, DbError> {
        let payment_intent_id = booking.payment_intent_id.clone().unwrap_or_default();
        match self.insert(&booking, BookingStatus::Pending).await {
            Ok(id) => {
                info!("Booking {} claimed payment {}", id, payment_intent_id);
                self.find_by_id(&id).await
            }
            Err(DbError::SqlxError(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                info!("Payment {} is already claimed", payment_intent_id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn confirm_claim(
        &self,
        payment_intent_id: &str,
        external_booking_uid: &str,
        booking_date: DateTime<Utc>,
        metadata: serde_json::Value,
    ) -> Result<Option<Booking>, DbError> {
        let metadata = serde_json::to_string(&metadata)
            .map_err(|e| DbError::DecodeError(format!("metadata: {e}")))?;
        let query = r#"
            UPDATE bookings
            SET status = $1,
                external_booking_uid = $2,
                booking_date = $3,
                metadata = $4,
                updated_at = $5
            WHERE payment_intent_id = $6 AND status = $7
        "#;
        let result = sqlx::query(query)
            .bind(BookingStatus::Confirmed.as_str())
            .bind(external_booking_uid)
            .bind(booking_date.to_rfc3339())
            .bind(metadata)
            .bind(Utc::now().to_rfc3339())
            .bind(payment_intent_id)
            .bind(BookingStatus::Pending.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to confirm booking for {}: {}", payment_intent_id, e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_payment_intent(payment_intent_id).await
    }

    async fn release_claim(&self, payment_intent_id: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM bookings WHERE payment_intent_id = $1 AND status = $2")
            .bind(payment_intent_id)
            .bind(BookingStatus::Pending.as_str())
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to release claim on {}: {}", payment_intent_id, e);
                DbError::QueryError(e.to_string())
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, DbError> {
        self.fetch_one_where("id", id).await
    }

    async fn find_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Booking>, DbError> {
        self.fetch_one_where("payment_intent_id", payment_intent_id)
            .await
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Booking>, DbError> {
        let query = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_date DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list bookings: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn cancel(&self, id: &str, reason: Option<&str>) -> Result<Option<Booking>, DbError> {
        debug!("Cancelling booking {}", id);
        let query = r#"
            UPDATE bookings
            SET status = $1, cancellation_reason = $2, updated_at = $3
            WHERE id = $4
        "#;
        let result = sqlx::query(query)
            .bind(BookingStatus::Cancelled.as_str())
            .bind(reason.map(str::to_string))
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to cancel booking {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn reschedule(
        &self,
        id: &str,
        new_date: DateTime<Utc>,
        external_booking_uid: Option<&str>,
    ) -> Result<Option<Booking>, DbError> {
        debug!("Rescheduling booking {} to {}", id, new_date);
        let query = r#"
            UPDATE bookings
            SET booking_date = $1,
                external_booking_uid = COALESCE($2, external_booking_uid),
                status = $3,
                updated_at = $4
            WHERE id = $5
        "#;
        let result = sqlx::query(query)
            .bind(new_date.to_rfc3339())
            .bind(external_booking_uid.map(str::to_string))
            .bind(BookingStatus::Rescheduled.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to reschedule booking {}: {}", id, e);
                DbError::QueryError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn update_payment_status(
        &self,
        payment_intent_id: &str,
        status: PaymentStatus,
    ) -> Result<bool, DbError> {
        let query = r#"
            UPDATE bookings
            SET payment_status = $1, updated_at = $2
            WHERE payment_intent_id = $3
        "#;
        let result = sqlx::query(query)
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(payment_intent_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to update payment status for {}: {}", payment_intent_id, e);
                DbError::QueryError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    async fn repository() -> SqlBookingRepository {
        let client = DbClient::from_url("sqlite::memory:").await.unwrap();
        let repo = SqlBookingRepository::new(client);
        repo.init_schema().await.unwrap();
        repo
    }

    fn new_booking(payment_intent_id: &str, day: u32) -> NewBooking {
        NewBooking {
            service_id: "svc_hydrafacial".into(),
            service_name: "HydraFacial".into(),
            client_name: "Dana Reyes".into(),
            client_email: "dana@example.com".into(),
            client_phone: Some("+14155550134".into()),
            booking_date: Utc.with_ymd_and_hms(2025, 7, day, 17, 0, 0).unwrap(),
            payment_status: PaymentStatus::Paid,
            payment_intent_id: Some(payment_intent_id.into()),
            external_booking_uid: Some(format!("cal_{payment_intent_id}")),
            amount_paid: 12000,
            currency: "usd".into(),
            metadata: json!({ "payment_option": "full" }),
        }
    }

    #[tokio::test]
    async fn create_and_find_round_trip() {
        let repo = repository().await;
        let created = repo.create(new_booking("pi_1", 15)).await.unwrap();
        assert_eq!(created.status, BookingStatus::Confirmed);
        assert_eq!(created.metadata["payment_option"], "full");

        let by_intent = repo.find_by_payment_intent("pi_1").await.unwrap().unwrap();
        assert_eq!(by_intent.id, created.id);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_payment_intent_is_rejected() {
        let repo = repository().await;
        repo.create(new_booking("pi_dup", 15)).await.unwrap();
        assert!(repo.create(new_booking("pi_dup", 16)).await.is_err());
    }

    #[tokio::test]
    async fn payment_intent_is_claimed_once() {
        let repo = repository().await;
        let mut pending = new_booking("pi_claim", 15);
        pending.external_booking_uid = None;

        let claimed = repo.claim(pending.clone()).await.unwrap().unwrap();
        assert_eq!(claimed.status, BookingStatus::Pending);
        assert!(repo.claim(pending.clone()).await.unwrap().is_none());

        let confirmed = repo
            .confirm_claim(
                "pi_claim",
                "cal_claim",
                claimed.booking_date,
                json!({ "end_time": "2025-07-15T18:00:00+00:00" }),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmed.id, claimed.id);
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert_eq!(confirmed.external_booking_uid.as_deref(), Some("cal_claim"));

        // Confirmed bookings are neither re-confirmed nor released
        assert!(repo
            .confirm_claim("pi_claim", "cal_other", claimed.booking_date, json!({}))
            .await
            .unwrap()
            .is_none());
        assert!(!repo.release_claim("pi_claim").await.unwrap());
        assert!(repo.claim(pending).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn released_claim_can_be_claimed_again() {
        let repo = repository().await;
        let pending = new_booking("pi_retry", 15);
        repo.claim(pending.clone()).await.unwrap().unwrap();
        assert!(repo.release_claim("pi_retry").await.unwrap());
        assert!(repo.find_by_payment_intent("pi_retry").await.unwrap().is_none());
        assert!(repo.claim(pending).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_orders_by_booking_date_desc() {
        let repo = repository().await;
        repo.create(new_booking("pi_a", 10)).await.unwrap();
        repo.create(new_booking("pi_b", 20)).await.unwrap();
        let listed = repo.list(10, 0).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].payment_intent_id.as_deref(), Some("pi_b"));
    }

    #[tokio::test]
    async fn cancel_and_reschedule_update_status() {
        let repo = repository().await;
        let created = repo.create(new_booking("pi_c", 15)).await.unwrap();

        let moved_to = created.booking_date + Duration::days(2);
        let rescheduled = repo
            .reschedule(&created.id, moved_to, Some("cal_new"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rescheduled.booking_date, moved_to);
        assert_eq!(rescheduled.status, BookingStatus::Rescheduled);
        assert_eq!(rescheduled.external_booking_uid.as_deref(), Some("cal_new"));

        let cancelled = repo
            .cancel(&created.id, Some("client request"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert!(repo.cancel("missing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn payment_status_updates_by_intent() {
        let repo = repository().await;
        repo.create(new_booking("pi_d", 15)).await.unwrap();
        assert!(repo
            .update_payment_status("pi_d", PaymentStatus::Refunded)
            .await
            .unwrap());
        assert!(!repo
            .update_payment_status("pi_unknown", PaymentStatus::Refunded)
            .await
            .unwrap());
        let booking = repo.find_by_payment_intent("pi_d").await.unwrap().unwrap();
        assert_eq!(booking.payment_status, PaymentStatus::Refunded);
    }
}
