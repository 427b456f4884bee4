use async_trait::async_trait;

use super::{Store, StoreError, StoreResult};
use crate::database::Database;
use crate::models::{Booking, Event, NewBooking, NewEvent, PublicEvent};

const EVENT_COLUMNS: &str = "id, title, is_multiple_day, date, start_date, end_date, \
     time, start_time, end_time, from_time, from_start_time, from_end_time, \
     to_time, to_start_time, to_end_time, tag, place, image, description, \
     published, total_tickets, sold_tickets";

const PUBLIC_EVENT_COLUMNS: &str = "id, title, date, is_multiple_day, start_date, end_date, \
     time, start_time, end_time, from_time, from_start_time, from_end_time, \
     to_time, to_start_time, to_end_time, tag, place, image, description";

const BOOKING_COLUMNS: &str = "id, event_id, name, email, tickets";

#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_published(&self) -> StoreResult<Vec<PublicEvent>> {
        let events = sqlx::query_as::<_, PublicEvent>(&format!(
            "SELECT {PUBLIC_EVENT_COLUMNS} FROM events WHERE published = TRUE ORDER BY id"
        ))
        .fetch_all(&self.db.pool)
        .await?;
        Ok(events)
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY id"
        ))
        .fetch_all(&self.db.pool)
        .await?;
        Ok(events)
    }

    async fn get_event(&self, id: i64) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let created = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (
                title, is_multiple_day, date, start_date, end_date,
                time, start_time, end_time, from_time, from_start_time, from_end_time,
                to_time, to_start_time, to_end_time, tag, place, image, description,
                total_tickets
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(&event.title)
        .bind(event.is_multiple_day)
        .bind(event.date)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.time)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.from_time)
        .bind(&event.from_start_time)
        .bind(&event.from_end_time)
        .bind(&event.to_time)
        .bind(&event.to_start_time)
        .bind(&event.to_end_time)
        .bind(&event.tag)
        .bind(&event.place)
        .bind(&event.image)
        .bind(&event.description)
        .bind(event.total_tickets.unwrap_or(0))
        .fetch_one(&self.db.pool)
        .await?;
        Ok(created)
    }

    async fn update_event(&self, id: i64, event: NewEvent) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events SET
                title = $2, is_multiple_day = $3, date = $4, start_date = $5, end_date = $6,
                time = $7, start_time = $8, end_time = $9,
                from_time = $10, from_start_time = $11, from_end_time = $12,
                to_time = $13, to_start_time = $14, to_end_time = $15,
                tag = $16, place = $17, image = $18, description = $19,
                total_tickets = COALESCE($20, total_tickets)
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&event.title)
        .bind(event.is_multiple_day)
        .bind(event.date)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.time)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.from_time)
        .bind(&event.from_start_time)
        .bind(&event.from_end_time)
        .bind(&event.to_time)
        .bind(&event.to_start_time)
        .bind(&event.to_end_time)
        .bind(&event.tag)
        .bind(&event.place)
        .bind(&event.image)
        .bind(&event.description)
        .bind(event.total_tickets)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete_event(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn toggle_published(&self, id: i64) -> StoreResult<Event> {
        // Одно выражение вместо read-then-write: конкурирующие переключения не теряются
        sqlx::query_as::<_, Event>(&format!(
            "UPDATE events SET published = NOT published WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn create_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut tx = self.db.pool.begin().await?;

        // 1) Условное увеличение счетчика: проходит, только если хватает билетов
        let reserved = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE events
            SET sold_tickets = sold_tickets + $2
            WHERE id = $1 AND sold_tickets::BIGINT + $2 <= total_tickets
            RETURNING id
            "#,
        )
        .bind(booking.event_id)
        .bind(booking.tickets)
        .fetch_optional(&mut *tx)
        .await?;

        if reserved.is_none() {
            // 2) Разбираемся, почему не вышло: нет события или не хватает мест
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)",
            )
            .bind(booking.event_id)
            .fetch_one(&mut *tx)
            .await?;
            tx.rollback().await?;

            return Err(if exists {
                StoreError::InsufficientTickets
            } else {
                StoreError::NotFound
            });
        }

        // 3) Сама бронь в той же транзакции
        let created = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (event_id, name, email, tickets)
             VALUES ($1, $2, $3, $4)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking.event_id)
        .bind(&booking.name)
        .bind(&booking.email)
        .bind(booking.tickets)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_bookings(&self, event_id: i64) -> StoreResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 ORDER BY id"
        ))
        .bind(event_id)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(bookings)
    }
}
