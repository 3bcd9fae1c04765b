// --- File: crates/glowbook_admin/src/hapio_proxy.rs ---
//! Pass-through of the admin scheduling editors to the Hapio API.
//!
//! The router is nested at `/admin/hapio`, so the request path below that
//! prefix is the Hapio path. Schedule block writes are checked for overlaps
//! with their siblings before they are forwarded.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use glowbook_hapio::{HapioClient, RecurringScheduleBlock, ScheduleBlock};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::AdminError;
use crate::handlers::{to_response, AdminState};
use crate::overlap::{check_dated, check_weekly, field, DatedBlock, WeeklyBlock};

fn into_response(method: &Method, value: Value) -> Response {
    if value.is_null() {
        StatusCode::NO_CONTENT.into_response()
    } else if *method == Method::POST {
        (StatusCode::CREATED, Json(value)).into_response()
    } else {
        Json(value).into_response()
    }
}

fn parse_body(body: &Bytes) -> Result<Option<Value>, AdminError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AdminError::InvalidRequest(format!("Invalid JSON body: {}", e)))
}

/// Forwards any locations, resources, services or recurring schedule call.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/hapio/{collection}",
    params(("collection" = String, Path, description = "locations, resources or services")),
    responses(
        (status = 200, description = "Hapio response body"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Not found at Hapio"),
        (status = 422, description = "Rejected by Hapio validation"),
        (status = 502, description = "Hapio unavailable")
    ),
    tag = "Admin"
))]
pub async fn forward_handler(
    State(state): State<Arc<AdminState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Response, (StatusCode, String)> {
    let client = state.hapio().map_err(to_response)?;
    let payload = parse_body(&body).map_err(to_response)?;

    let value = client
        .request(method.clone(), uri.path(), &query, payload.as_ref())
        .await
        .map_err(|e| to_response(e.into()))?;
    if method != Method::GET {
        info!("[Admin] {} {} forwarded to Hapio", method, uri.path());
    }
    Ok(into_response(&method, value))
}

fn parse_siblings<T, B>(items: &[T], parse: impl Fn(&T) -> Result<B, AdminError>) -> Vec<B> {
    items
        .iter()
        .filter_map(|item| match parse(item) {
            Ok(block) => Some(block),
            Err(e) => {
                warn!("[Admin] Ignoring unreadable stored block: {}", e);
                None
            }
        })
        .collect()
}

async fn check_recurring_block(
    client: &HapioClient,
    resource_id: &str,
    schedule_id: &str,
    block_id: Option<&str>,
    body: &Value,
) -> Result<(), AdminError> {
    let siblings = client
        .list_recurring_schedule_blocks(resource_id, schedule_id)
        .await?;
    let current = block_id.and_then(|id| siblings.iter().find(|b| b.id.as_deref() == Some(id)));

    let candidate = WeeklyBlock::from_hapio(&RecurringScheduleBlock {
        id: block_id.map(str::to_string),
        weekday: field(body, "weekday", current.map(|b| b.weekday.as_str()))?.to_string(),
        start_time: field(body, "start_time", current.map(|b| b.start_time.as_str()))?
            .to_string(),
        end_time: field(body, "end_time", current.map(|b| b.end_time.as_str()))?.to_string(),
    })?;
    check_weekly(&candidate, &parse_siblings(&siblings, WeeklyBlock::from_hapio))
}

async fn check_schedule_block(
    client: &HapioClient,
    resource_id: &str,
    block_id: Option<&str>,
    body: &Value,
) -> Result<(), AdminError> {
    let siblings = client.list_schedule_blocks(resource_id).await?;
    let current = block_id.and_then(|id| siblings.iter().find(|b| b.id.as_deref() == Some(id)));

    let candidate = DatedBlock::from_hapio(&ScheduleBlock {
        id: block_id.map(str::to_string),
        location_id: None,
        starts_at: field(body, "starts_at", current.map(|b| b.starts_at.as_str()))?.to_string(),
        ends_at: field(body, "ends_at", current.map(|b| b.ends_at.as_str()))?.to_string(),
    })?;
    check_dated(&candidate, &parse_siblings(&siblings, DatedBlock::from_hapio))
}

async fn write_recurring_block(
    state: &AdminState,
    resource_id: &str,
    schedule_id: &str,
    block_id: Option<&str>,
    body: Value,
) -> Result<Response, AdminError> {
    let client = state.hapio()?;
    check_recurring_block(client, resource_id, schedule_id, block_id, &body).await?;

    let collection = format!(
        "resources/{}/recurring-schedules/{}/schedule-blocks",
        resource_id, schedule_id
    );
    let (method, path) = match block_id {
        Some(id) => (Method::PATCH, format!("{}/{}", collection, id)),
        None => (Method::POST, collection),
    };
    let value = client.request(method.clone(), &path, &[], Some(&body)).await?;
    info!("[Admin] Recurring block {} {}", method, path);
    Ok(into_response(&method, value))
}

async fn write_schedule_block(
    state: &AdminState,
    resource_id: &str,
    block_id: Option<&str>,
    body: Value,
) -> Result<Response, AdminError> {
    let client = state.hapio()?;
    check_schedule_block(client, resource_id, block_id, &body).await?;

    let collection = format!("resources/{}/schedule-blocks", resource_id);
    let (method, path) = match block_id {
        Some(id) => (Method::PATCH, format!("{}/{}", collection, id)),
        None => (Method::POST, collection),
    };
    let value = client.request(method.clone(), &path, &[], Some(&body)).await?;
    info!("[Admin] Schedule block {} {}", method, path);
    Ok(into_response(&method, value))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/hapio/resources/{resource_id}/recurring-schedules/{schedule_id}/schedule-blocks",
    params(
        ("resource_id" = String, Path, description = "Hapio resource"),
        ("schedule_id" = String, Path, description = "Hapio recurring schedule")
    ),
    request_body = RecurringScheduleBlock,
    responses(
        (status = 201, description = "Block created"),
        (status = 409, description = "Overlaps another block on the same weekday"),
        (status = 422, description = "Invalid weekday or times")
    ),
    tag = "Admin"
))]
pub async fn create_recurring_block_handler(
    State(state): State<Arc<AdminState>>,
    Path((resource_id, schedule_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, String)> {
    write_recurring_block(&state, &resource_id, &schedule_id, None, body)
        .await
        .map_err(to_response)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/admin/hapio/resources/{resource_id}/recurring-schedules/{schedule_id}/schedule-blocks/{block_id}",
    params(
        ("resource_id" = String, Path, description = "Hapio resource"),
        ("schedule_id" = String, Path, description = "Hapio recurring schedule"),
        ("block_id" = String, Path, description = "Block to update")
    ),
    responses(
        (status = 200, description = "Block updated"),
        (status = 409, description = "Overlaps another block on the same weekday"),
        (status = 422, description = "Invalid weekday or times")
    ),
    tag = "Admin"
))]
pub async fn update_recurring_block_handler(
    State(state): State<Arc<AdminState>>,
    Path((resource_id, schedule_id, block_id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, String)> {
    write_recurring_block(&state, &resource_id, &schedule_id, Some(&block_id), body)
        .await
        .map_err(to_response)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/admin/hapio/resources/{resource_id}/schedule-blocks",
    params(("resource_id" = String, Path, description = "Hapio resource")),
    request_body = ScheduleBlock,
    responses(
        (status = 201, description = "Block created"),
        (status = 409, description = "Overlaps another block"),
        (status = 422, description = "Invalid times")
    ),
    tag = "Admin"
))]
pub async fn create_schedule_block_handler(
    State(state): State<Arc<AdminState>>,
    Path(resource_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, String)> {
    write_schedule_block(&state, &resource_id, None, body)
        .await
        .map_err(to_response)
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/admin/hapio/resources/{resource_id}/schedule-blocks/{block_id}",
    params(
        ("resource_id" = String, Path, description = "Hapio resource"),
        ("block_id" = String, Path, description = "Block to update")
    ),
    responses(
        (status = 200, description = "Block updated"),
        (status = 409, description = "Overlaps another block"),
        (status = 422, description = "Invalid times")
    ),
    tag = "Admin"
))]
pub async fn update_schedule_block_handler(
    State(state): State<Arc<AdminState>>,
    Path((resource_id, block_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, (StatusCode, String)> {
    write_schedule_block(&state, &resource_id, Some(&block_id), body)
        .await
        .map_err(to_response)
}
