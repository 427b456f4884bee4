pub mod events;
pub mod form;
pub mod bookings;
pub mod upload;

use axum::Router;
use std::sync::Arc;

use crate::config::UploadConfig;

pub fn routes(limits: &UploadConfig) -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(events::routes())
        .merge(bookings::routes())
        .merge(upload::routes(limits))
}
