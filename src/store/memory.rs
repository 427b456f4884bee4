// In-memory хранилище для тестов и локального запуска без Postgres.
// Все операции выполняются под одним мьютексом, поэтому бронь и счетчик
// обновляются атомарно так же, как в транзакции PgStore.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use super::{Store, StoreError, StoreResult};
use crate::models::{Booking, Event, NewBooking, NewEvent, PublicEvent};

#[derive(Default)]
struct Tables {
    events: BTreeMap<i64, Event>,
    bookings: Vec<Booking>,
    last_event_id: i64,
    last_booking_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply(target: &mut Event, event: NewEvent) {
    target.title = event.title;
    target.is_multiple_day = event.is_multiple_day;
    target.date = event.date;
    target.start_date = event.start_date;
    target.end_date = event.end_date;
    target.time = event.time;
    target.start_time = event.start_time;
    target.end_time = event.end_time;
    target.from_time = event.from_time;
    target.from_start_time = event.from_start_time;
    target.from_end_time = event.from_end_time;
    target.to_time = event.to_time;
    target.to_start_time = event.to_start_time;
    target.to_end_time = event.to_end_time;
    target.tag = event.tag;
    target.place = event.place;
    target.image = event.image;
    target.description = event.description;
    if let Some(total) = event.total_tickets {
        target.total_tickets = total;
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_published(&self) -> StoreResult<Vec<PublicEvent>> {
        let tables = self.tables.lock();
        Ok(tables
            .events
            .values()
            .filter(|e| e.published)
            .cloned()
            .map(PublicEvent::from)
            .collect())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        Ok(self.tables.lock().events.values().cloned().collect())
    }

    async fn get_event(&self, id: i64) -> StoreResult<Event> {
        self.tables
            .lock()
            .events
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.lock();
        tables.last_event_id += 1;
        let id = tables.last_event_id;

        let mut created = Event {
            id,
            title: String::new(),
            is_multiple_day: false,
            date: None,
            start_date: None,
            end_date: None,
            time: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            from_time: String::new(),
            from_start_time: String::new(),
            from_end_time: String::new(),
            to_time: String::new(),
            to_start_time: String::new(),
            to_end_time: String::new(),
            tag: String::new(),
            place: String::new(),
            image: None,
            description: String::new(),
            published: false,
            total_tickets: 0,
            sold_tickets: 0,
        };
        apply(&mut created, event);

        tables.events.insert(id, created.clone());
        Ok(created)
    }

    async fn update_event(&self, id: i64, event: NewEvent) -> StoreResult<Event> {
        let mut tables = self.tables.lock();
        let target = tables.events.get_mut(&id).ok_or(StoreError::NotFound)?;
        apply(target, event);
        Ok(target.clone())
    }

    async fn delete_event(&self, id: i64) -> StoreResult<()> {
        self.tables
            .lock()
            .events
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn toggle_published(&self, id: i64) -> StoreResult<Event> {
        let mut tables = self.tables.lock();
        let target = tables.events.get_mut(&id).ok_or(StoreError::NotFound)?;
        target.published = !target.published;
        Ok(target.clone())
    }

    async fn create_booking(&self, booking: NewBooking) -> StoreResult<Booking> {
        let mut tables = self.tables.lock();

        let event = tables
            .events
            .get_mut(&booking.event_id)
            .ok_or(StoreError::NotFound)?;
        // сравнение с остатком, а не sold + n: сумма может переполнить i32
        if booking.tickets > event.remaining_tickets() {
            return Err(StoreError::InsufficientTickets);
        }
        event.sold_tickets += booking.tickets;

        tables.last_booking_id += 1;
        let created = Booking {
            id: tables.last_booking_id,
            event_id: booking.event_id,
            name: booking.name,
            email: booking.email,
            tickets: booking.tickets,
        };
        tables.bookings.push(created.clone());
        Ok(created)
    }

    async fn list_bookings(&self, event_id: i64) -> StoreResult<Vec<Booking>> {
        Ok(self
            .tables
            .lock()
            .bookings
            .iter()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect())
    }
}
