// --- File: crates/glowbook_admin/src/bookings.rs ---
//! Booking management: the local record is kept in step with Cal.com.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use glowbook_common::services::SchedulingService;
use glowbook_db::{Booking, BookingRepository, BookingStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

use crate::error::AdminError;
use crate::handlers::{to_response, AdminState};

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 200;

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(IntoParams))]
pub struct ListBookingsQuery {
    /// Page size, at most 200
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CancelBookingRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RescheduleBookingRequest {
    pub new_start: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
}

fn reason_of(reason: &Option<String>) -> Option<&str> {
    reason.as_deref().map(str::trim).filter(|r| !r.is_empty())
}

async fn load(state: &AdminState, id: &str) -> Result<Booking, AdminError> {
    state
        .bookings()?
        .find_by_id(id)
        .await?
        .ok_or_else(|| AdminError::BookingNotFound(id.to_string()))
}

pub async fn cancel_booking(
    state: &AdminState,
    id: &str,
    request: CancelBookingRequest,
) -> Result<Booking, AdminError> {
    let booking = load(state, id).await?;
    if booking.status == BookingStatus::Cancelled {
        return Err(AdminError::AlreadyCancelled(id.to_string()));
    }
    let reason = reason_of(&request.reason);

    if let Some(uid) = &booking.external_booking_uid {
        state.scheduler()?.cancel_booking(uid, reason).await?;
        info!(booking_id = %id, "[Admin] Cancelled Cal.com booking {}", uid);
    }

    state
        .bookings()?
        .cancel(id, reason)
        .await?
        .ok_or_else(|| AdminError::BookingNotFound(id.to_string()))
}

pub async fn reschedule_booking(
    state: &AdminState,
    id: &str,
    request: RescheduleBookingRequest,
    now: DateTime<Utc>,
) -> Result<Booking, AdminError> {
    let booking = load(state, id).await?;
    if booking.status == BookingStatus::Cancelled {
        return Err(AdminError::InvalidRequest(
            "Cancelled bookings cannot be rescheduled.".to_string(),
        ));
    }
    if request.new_start <= now {
        return Err(AdminError::InvalidRequest(
            "The new time must be in the future.".to_string(),
        ));
    }

    // Cal.com issues a new uid for the moved booking
    let (new_date, new_uid) = match &booking.external_booking_uid {
        Some(uid) => {
            let result = state
                .scheduler()?
                .reschedule_booking(uid, request.new_start, reason_of(&request.reason))
                .await?;
            info!(booking_id = %id, "[Admin] Rescheduled Cal.com booking {} as {}", uid, result.uid);
            (result.start_time, Some(result.uid))
        }
        None => (request.new_start, None),
    };

    state
        .bookings()?
        .reschedule(id, new_date, new_uid.as_deref())
        .await?
        .ok_or_else(|| AdminError::BookingNotFound(id.to_string()))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Most recent appointments first", body = [Booking]),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Database not configured")
    ),
    tag = "Admin"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<AdminState>>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<Booking>>, (StatusCode, String)> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let offset = query.offset.unwrap_or(0).max(0);
    let repository = state.bookings().map_err(to_response)?;
    let bookings = repository
        .list(limit, offset)
        .await
        .map_err(|e| to_response(e.into()))?;
    Ok(Json(bookings))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/bookings/{id}/cancel",
    params(("id" = String, Path, description = "Booking id")),
    request_body = CancelBookingRequest,
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 404, description = "Unknown booking"),
        (status = 409, description = "Already cancelled"),
        (status = 502, description = "Cal.com unavailable")
    ),
    tag = "Admin"
))]
pub async fn cancel_booking_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<Json<Booking>, (StatusCode, String)> {
    cancel_booking(&state, &id, payload)
        .await
        .map(Json)
        .map_err(to_response)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/bookings/{id}/reschedule",
    params(("id" = String, Path, description = "Booking id")),
    request_body = RescheduleBookingRequest,
    responses(
        (status = 200, description = "Booking moved", body = Booking),
        (status = 400, description = "Time in the past or booking cancelled"),
        (status = 404, description = "Unknown booking"),
        (status = 409, description = "Slot unavailable at Cal.com")
    ),
    tag = "Admin"
))]
pub async fn reschedule_booking_handler(
    State(state): State<Arc<AdminState>>,
    Path(id): Path<String>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<Json<Booking>, (StatusCode, String)> {
    reschedule_booking(&state, &id, payload, Utc::now())
        .await
        .map(Json)
        .map_err(to_response)
}
