use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

use super::form::FormData;
use crate::{error::ApiError, models::BookingForm, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/bookings", get(usage).post(create_booking))
}

fn failure(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "message": message }))
}

/// GET /api/bookings
async fn usage() -> Json<Value> {
    Json(json!({ "message": "Use POST" }))
}

/// POST /api/bookings
///
/// Публичный эндпоинт витрины. Любой исход отдается со статусом 200,
/// ошибки - как `{success: false, message}`.
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    form: Result<FormData<BookingForm>, ApiError>,
) -> Json<Value> {
    // тело, которое не удалось разобрать, для витрины равносильно пустой форме
    let Ok(FormData(form)) = form else {
        return failure("All fields are required");
    };

    let booking = match form.into_new_booking() {
        Ok(booking) => booking,
        Err(e) => return failure(&e.0),
    };

    let event_id = booking.event_id;
    let tickets = booking.tickets;

    match state.store.create_booking(booking).await {
        Ok(created) => {
            tracing::info!(
                "Booking {} created: event={}, tickets={}",
                created.id,
                event_id,
                tickets
            );
            Json(json!({ "success": true, "booking": created }))
        }
        Err(e) => {
            let err = ApiError::from_store("Failed to save booking", e);
            tracing::debug!("Booking for event {} refused: {}", event_id, err);
            failure(&err.to_string())
        }
    }
}
