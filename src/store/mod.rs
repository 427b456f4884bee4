//! Хранилище событий и бронирований.
//!
//! Обработчики работают только через трейт [`Store`]: в проде это [`PgStore`] поверх
//! sqlx, в тестах и в режиме `STORAGE_BACKEND=memory` - [`MemoryStore`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Booking, Event, NewBooking, NewEvent, PublicEvent};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event not found")]
    NotFound,
    #[error("not enough tickets available")]
    InsufficientTickets,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Опубликованные события по возрастанию id.
    async fn list_published(&self) -> StoreResult<Vec<PublicEvent>>;

    /// Все события по возрастанию id (для админки).
    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn get_event(&self, id: i64) -> StoreResult<Event>;

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event>;

    /// Полная перезапись полей; `total_tickets: None` сохраняет текущую емкость.
    async fn update_event(&self, id: i64, event: NewEvent) -> StoreResult<Event>;

    async fn delete_event(&self, id: i64) -> StoreResult<()>;

    /// Атомарно инвертирует `published`.
    async fn toggle_published(&self, id: i64) -> StoreResult<Event>;

    /// Проверка емкости, увеличение `sold_tickets` и вставка брони - одна атомарная операция.
    async fn create_booking(&self, booking: NewBooking) -> StoreResult<Booking>;

    async fn list_bookings(&self, event_id: i64) -> StoreResult<Vec<Booking>>;
}
