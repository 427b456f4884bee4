use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub email: String,
    pub tickets: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub event_id: i64,
    pub name: String,
    pub email: String,
    pub tickets: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidBooking(pub String);

// Поля формы POST /bookings; числа приходят строками
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub event_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub tickets: Option<String>,
}

fn parse_number<T: std::str::FromStr>(raw: &Option<String>) -> Option<T> {
    raw.as_deref().and_then(|s| s.trim().parse().ok())
}

impl BookingForm {
    /// Все четыре поля обязательны: нулевые и нечисловые значения считаются пустыми.
    pub fn into_new_booking(self) -> Result<NewBooking, InvalidBooking> {
        let event_id: Option<i64> = parse_number(&self.event_id).filter(|id| *id != 0);
        let tickets: Option<i32> = parse_number(&self.tickets).filter(|n| *n != 0);
        let name = self.name.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let email = self.email.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        let (event_id, name, email, tickets) = match (event_id, name, email, tickets) {
            (Some(event_id), Some(name), Some(email), Some(tickets)) => {
                (event_id, name, email, tickets)
            }
            _ => return Err(InvalidBooking("All fields are required".to_string())),
        };

        if tickets < 0 {
            return Err(InvalidBooking("Tickets must be a positive number".to_string()));
        }

        Ok(NewBooking {
            event_id,
            name,
            email,
            tickets,
        })
    }
}
