// --- File: crates/glowbook_cal/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{Duration, Utc};
use chrono_tz::Tz;
use glowbook_common::services::SchedulingService;
use glowbook_common::{HttpStatusCode, Reservation, SlotSelection};
use glowbook_config::AppConfig;
use glowbook_hapio::ServiceCatalog;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::availability::{
    group_slots_by_day, resolve_window, AvailabilityQuery, AvailabilityResponse,
};
use crate::error::CalError;

pub type Scheduler = Arc<dyn SchedulingService<Error = CalError>>;

// Shared state for the Cal.com handlers
#[derive(Clone)]
pub struct CalState {
    pub config: Arc<AppConfig>,
    pub scheduler: Option<Scheduler>,
    /// Resolves catalog slugs to event types
    pub catalog: Option<Arc<dyn ServiceCatalog>>,
}

fn scheduler_of(state: &CalState) -> Result<&Scheduler, (StatusCode, String)> {
    if !state.config.use_cal {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Scheduling service is disabled.".to_string(),
        ));
    }
    state.scheduler.as_ref().ok_or_else(|| {
        error!("Cal.com configuration missing in AppConfig.");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error: Cal.com config missing.".to_string(),
        )
    })
}

pub(crate) fn to_response(err: CalError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
    let message = match &err {
        CalError::SlotUnavailable(_) => "That time is no longer available.".to_string(),
        CalError::ReservationExpired(_) => "Your hold on this time has expired.".to_string(),
        CalError::ReservationNotFound(_) => "Reservation not found.".to_string(),
        CalError::InvalidRequest(msg) => msg.clone(),
        CalError::UnknownService(slug) => format!("Service '{}' not found.", slug),
        _ => "The scheduling service is unavailable. Please try again.".to_string(),
    };
    if status.is_server_error() {
        error!("[Cal] {}", err);
    } else {
        info!("[Cal] {}", err);
    }
    (status, message)
}

/// Open slots grouped by day in the studio timezone.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cal/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Slots grouped by day", body = AvailabilityResponse),
        (status = 400, description = "Bad request (e.g., invalid start date)"),
        (status = 404, description = "Unknown service slug"),
        (status = 502, description = "Cal.com unavailable")
    ),
    tag = "Cal"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<CalState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, (StatusCode, String)> {
    let scheduler = scheduler_of(&state)?;

    let (event_type_id, duration) = match (&query.slug, query.event_type_id) {
        (Some(slug), _) => {
            let catalog = state.catalog.as_ref().ok_or_else(|| {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Services catalog is unavailable.".to_string(),
                )
            })?;
            let service = catalog
                .find_service(slug)
                .await
                .map_err(|e| {
                    error!("[Cal] Catalog lookup for '{}' failed: {}", slug, e);
                    (
                        StatusCode::BAD_GATEWAY,
                        "Could not load services right now.".to_string(),
                    )
                })?
                .ok_or_else(|| to_response(CalError::UnknownService(slug.clone())))?;
            let event_type_id = service.event_type_id.ok_or_else(|| {
                warn!("[Cal] Service '{}' has no event type", slug);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "This service cannot be booked online.".to_string(),
                )
            })?;
            let duration = Some(service.duration_minutes).filter(|d| *d > 0);
            (event_type_id, duration)
        }
        (None, Some(id)) => (id, None),
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Either slug or event_type_id is required.".to_string(),
            ))
        }
    };

    let timezone = state.config.studio.timezone.clone();
    let tz = Tz::from_str(&timezone).map_err(|_| {
        error!("[Cal] Invalid studio timezone '{}'", timezone);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server configuration error: invalid studio timezone.".to_string(),
        )
    })?;

    let now = Utc::now();
    let today = now.with_timezone(&tz).date_naive();
    let (start_date, days) =
        resolve_window(query.start.as_deref(), query.days, today).map_err(to_response)?;
    let end_date = start_date + Duration::days(i64::from(days) - 1);

    let slots = scheduler
        .available_slots(event_type_id, start_date, end_date, &timezone, duration)
        .await
        .map_err(to_response)?;
    let upcoming: Vec<_> = slots.into_iter().filter(|s| *s > now).collect();
    info!(
        "[Cal] {} slots for event type {} from {} ({} days)",
        upcoming.len(),
        event_type_id,
        start_date,
        days
    );

    Ok(Json(AvailabilityResponse {
        event_type_id,
        timezone,
        start_date,
        days,
        duration_minutes: duration,
        slots_by_day: group_slots_by_day(&upcoming, tz, start_date, days),
    }))
}

/// Places a short-lived hold on a slot.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/cal/reservations",
    request_body = SlotSelection,
    responses(
        (status = 200, description = "Reservation created", body = Reservation),
        (status = 400, description = "Slot in the past or malformed"),
        (status = 409, description = "Slot no longer available")
    ),
    tag = "Cal"
))]
pub async fn create_reservation_handler(
    State(state): State<Arc<CalState>>,
    Json(slot): Json<SlotSelection>,
) -> Result<Json<Reservation>, (StatusCode, String)> {
    let scheduler = scheduler_of(&state)?;

    if slot.start_time <= Utc::now() {
        return Err((
            StatusCode::BAD_REQUEST,
            "That time has already passed.".to_string(),
        ));
    }
    if slot.duration == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "duration must be positive".to_string(),
        ));
    }

    let reservation = scheduler.reserve_slot(&slot).await.map_err(to_response)?;
    info!(
        reservation_id = %reservation.id,
        "[Cal] Reserved {}",
        slot.slot_key()
    );
    Ok(Json(reservation))
}

/// Releases a hold. Releasing an unknown or expired hold is not an error.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/cal/reservations/{id}",
    params(("id" = String, Path, description = "Reservation id")),
    responses(
        (status = 204, description = "Released"),
        (status = 502, description = "Cal.com unavailable")
    ),
    tag = "Cal"
))]
pub async fn release_reservation_handler(
    State(state): State<Arc<CalState>>,
    Path(reservation_id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let scheduler = scheduler_of(&state)?;
    match scheduler.release_reservation(&reservation_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(CalError::ReservationNotFound(_)) => {
            info!("[Cal] Reservation {} already gone", reservation_id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => Err(to_response(e)),
    }
}

/// Confirms a hold still exists at the provider and has not expired.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/cal/reservations/{id}/verify",
    params(("id" = String, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation is live", body = Reservation),
        (status = 404, description = "Unknown reservation"),
        (status = 410, description = "Reservation expired")
    ),
    tag = "Cal"
))]
pub async fn verify_reservation_handler(
    State(state): State<Arc<CalState>>,
    Path(reservation_id): Path<String>,
) -> Result<Json<Reservation>, (StatusCode, String)> {
    let scheduler = scheduler_of(&state)?;
    let reservation = scheduler
        .get_reservation(&reservation_id)
        .await
        .map_err(to_response)?;

    if reservation.expires_at.is_some_and(|exp| exp <= Utc::now()) {
        return Err(to_response(CalError::ReservationExpired(reservation_id)));
    }
    Ok(Json(reservation))
}
