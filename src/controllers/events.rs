use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::form::FormData;
use crate::{
    error::ApiError,
    middleware::AdminSession,
    models::{Event, EventFields, EventForm, EventPayload},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_published).post(create_event))
        .route("/admin/events", get(list_events))
        .route(
            "/event/{id}",
            get(get_event)
                .put(update_event)
                .delete(delete_event)
                .patch(toggle_publish),
        )
        .route("/event/{id}/bookings", get(list_event_bookings))
}

/// GET /api/events - опубликованные события для витрины
pub async fn list_published(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_published().await {
        Ok(events) => Json(events).into_response(),
        Err(e) => {
            tracing::error!("Failed to load events: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to load events" })),
            )
                .into_response()
        }
    }
}

/// POST /api/events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    FormData(form): FormData<EventForm>,
) -> Result<Json<Value>, ApiError> {
    let new_event = form.into_fields()?.into_new_event()?;

    let created = state
        .store
        .create_event(new_event)
        .await
        .map_err(|e| ApiError::from_store("Failed to create event", e))?;

    tracing::info!("Event {} created: {}", created.id, created.title);
    Ok(Json(json!({ "success": true, "event": created })))
}

/// GET /api/admin/events - все события, включая черновики
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| ApiError::from_store("Failed to load events", e))?;
    Ok(Json(events))
}

/// GET /api/event/{id}
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let event = state
        .store
        .get_event(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to load event", e))?;
    Ok(Json(json!({ "success": true, "event": event })))
}

/// PUT /api/event/{id} - полная перезапись полей
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<i64>,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::debug!("Rejected event payload: {}", e);
        ApiError::Validation("Invalid request body".to_string())
    })?;
    let changes = EventFields::from(payload).into_new_event()?;

    let updated = state
        .store
        .update_event(id, changes)
        .await
        .map_err(|e| ApiError::from_store("Failed to update event", e))?;

    tracing::info!("Event {} updated", id);
    Ok(Json(json!({ "success": true, "event": updated })))
}

/// DELETE /api/event/{id} - бронирования события не трогаем
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete_event(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to delete event", e))?;

    tracing::info!("Event {} deleted", id);
    Ok(Json(json!({ "success": true })))
}

/// PATCH /api/event/{id} - переключить публикацию
pub async fn toggle_publish(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let event = state
        .store
        .toggle_published(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to toggle publish", e))?;

    tracing::info!("Event {} published={}", id, event.published);
    Ok(Json(json!({ "success": true, "event": event })))
}

/// GET /api/event/{id}/bookings
pub async fn list_event_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminSession,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let bookings = state
        .store
        .list_bookings(id)
        .await
        .map_err(|e| ApiError::from_store("Failed to load bookings", e))?;
    Ok(Json(json!({ "success": true, "bookings": bookings })))
}
