use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Событие в том виде, в котором оно хранится и отдается админке.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub is_multiple_day: bool,
    pub date: Option<NaiveDateTime>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub time: String,
    pub start_time: String,
    pub end_time: String,
    pub from_time: String,
    pub from_start_time: String,
    pub from_end_time: String,
    pub to_time: String,
    pub to_start_time: String,
    pub to_end_time: String,
    pub tag: String,
    pub place: String,
    pub image: Option<String>,
    pub description: String,
    pub published: bool,
    pub total_tickets: i32,
    pub sold_tickets: i32,
}

impl Event {
    /// Сколько билетов еще можно забронировать.
    pub fn remaining_tickets(&self) -> i32 {
        (self.total_tickets - self.sold_tickets).max(0)
    }
}

/// Публичная проекция для витрины: без флага публикации и счетчиков билетов.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicEvent {
    pub id: i64,
    pub title: String,
    pub date: Option<NaiveDateTime>,
    pub is_multiple_day: bool,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub time: String,
    pub start_time: String,
    pub end_time: String,
    pub from_time: String,
    pub from_start_time: String,
    pub from_end_time: String,
    pub to_time: String,
    pub to_start_time: String,
    pub to_end_time: String,
    pub tag: String,
    pub place: String,
    pub image: Option<String>,
    pub description: String,
}

impl From<Event> for PublicEvent {
    fn from(event: Event) -> Self {
        PublicEvent {
            id: event.id,
            title: event.title,
            date: event.date,
            is_multiple_day: event.is_multiple_day,
            start_date: event.start_date,
            end_date: event.end_date,
            time: event.time,
            start_time: event.start_time,
            end_time: event.end_time,
            from_time: event.from_time,
            from_start_time: event.from_start_time,
            from_end_time: event.from_end_time,
            to_time: event.to_time,
            to_start_time: event.to_start_time,
            to_end_time: event.to_end_time,
            tag: event.tag,
            place: event.place,
            image: event.image,
            description: event.description,
        }
    }
}

/// Проверенные данные для создания или полной перезаписи события.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub is_multiple_day: bool,
    pub date: Option<NaiveDateTime>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub time: String,
    pub start_time: String,
    pub end_time: String,
    pub from_time: String,
    pub from_start_time: String,
    pub from_end_time: String,
    pub to_time: String,
    pub to_start_time: String,
    pub to_end_time: String,
    pub tag: String,
    pub place: String,
    pub image: Option<String>,
    pub description: String,
    /// `None` при обновлении означает "оставить как есть", при создании - 0.
    pub total_tickets: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidEvent(pub String);

impl InvalidEvent {
    fn new(message: &str) -> Self {
        InvalidEvent(message.to_string())
    }
}

/// Поля формы POST /events (multipart/urlencoded, все значения строками).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventForm {
    pub title: Option<String>,
    pub is_multiple_day: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub from_time: Option<String>,
    pub from_start_time: Option<String>,
    pub from_end_time: Option<String>,
    pub to_time: Option<String>,
    pub to_start_time: Option<String>,
    pub to_end_time: Option<String>,
    pub tag: Option<String>,
    pub place: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub total_tickets: Option<String>,
}

/// JSON-тело PUT /event/{id}.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: Option<String>,
    pub is_multiple_day: Option<bool>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub from_time: Option<String>,
    pub from_start_time: Option<String>,
    pub from_end_time: Option<String>,
    pub to_time: Option<String>,
    pub to_start_time: Option<String>,
    pub to_end_time: Option<String>,
    pub tag: Option<String>,
    pub place: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub total_tickets: Option<i32>,
}

/// Общее представление входных полей события, независимо от формата запроса.
#[derive(Debug, Clone, Default, Validate)]
pub struct EventFields {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub is_multiple_day: bool,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time: String,
    pub start_time: String,
    pub end_time: String,
    pub from_time: String,
    pub from_start_time: String,
    pub from_end_time: String,
    pub to_time: String,
    pub to_start_time: String,
    pub to_end_time: String,
    pub tag: String,
    pub place: String,
    pub image: Option<String>,
    pub description: String,
    #[validate(range(min = 0, message = "Total tickets must be a non-negative number"))]
    pub total_tickets: Option<i32>,
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl EventForm {
    pub fn into_fields(self) -> Result<EventFields, InvalidEvent> {
        let total_tickets = match non_blank(&self.total_tickets) {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                InvalidEvent::new("Total tickets must be a non-negative number")
            })?),
            None => None,
        };

        Ok(EventFields {
            title: text(self.title).trim().to_string(),
            is_multiple_day: self.is_multiple_day.as_deref() == Some("true"),
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            time: text(self.time),
            start_time: text(self.start_time),
            end_time: text(self.end_time),
            from_time: text(self.from_time),
            from_start_time: text(self.from_start_time),
            from_end_time: text(self.from_end_time),
            to_time: text(self.to_time),
            to_start_time: text(self.to_start_time),
            to_end_time: text(self.to_end_time),
            tag: text(self.tag),
            place: text(self.place),
            image: self.image,
            description: text(self.description),
            total_tickets,
        })
    }
}

impl From<EventPayload> for EventFields {
    fn from(payload: EventPayload) -> Self {
        EventFields {
            title: text(payload.title).trim().to_string(),
            is_multiple_day: payload.is_multiple_day.unwrap_or(false),
            date: payload.date,
            start_date: payload.start_date,
            end_date: payload.end_date,
            time: text(payload.time),
            start_time: text(payload.start_time),
            end_time: text(payload.end_time),
            from_time: text(payload.from_time),
            from_start_time: text(payload.from_start_time),
            from_end_time: text(payload.from_end_time),
            to_time: text(payload.to_time),
            to_start_time: text(payload.to_start_time),
            to_end_time: text(payload.to_end_time),
            tag: text(payload.tag),
            place: text(payload.place),
            image: payload.image,
            description: text(payload.description),
            total_tickets: payload.total_tickets,
        }
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    ["title", "total_tickets"]
        .iter()
        .filter_map(|field| fields.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid event".to_string())
}

impl EventFields {
    /// Проверяет поля и приводит даты к полуночи.
    ///
    /// Заполняются только даты, соответствующие `is_multiple_day`: для однодневного
    /// события - `date`, для многодневного - `start_date` и `end_date`.
    pub fn into_new_event(self) -> Result<NewEvent, InvalidEvent> {
        self.validate()
            .map_err(|errors| InvalidEvent(first_message(&errors)))?;

        let (date, start_date, end_date) = if self.is_multiple_day {
            let (start, end) = match (non_blank(&self.start_date), non_blank(&self.end_date)) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    return Err(InvalidEvent::new(
                        "Start date and end date are required for multiple day events",
                    ))
                }
            };
            let start = parse_calendar_date(start)
                .ok_or_else(|| InvalidEvent::new("Invalid start date format"))?;
            let end = parse_calendar_date(end)
                .ok_or_else(|| InvalidEvent::new("Invalid end date format"))?;
            (None, Some(start), Some(end))
        } else {
            let date = non_blank(&self.date)
                .ok_or_else(|| InvalidEvent::new("Date is required for single day events"))?;
            let date =
                parse_calendar_date(date).ok_or_else(|| InvalidEvent::new("Invalid date format"))?;
            (Some(date), None, None)
        };

        let image = self
            .image
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(NewEvent {
            title: self.title,
            is_multiple_day: self.is_multiple_day,
            date,
            start_date,
            end_date,
            time: self.time,
            start_time: self.start_time,
            end_time: self.end_time,
            from_time: self.from_time,
            from_start_time: self.from_start_time,
            from_end_time: self.from_end_time,
            to_time: self.to_time,
            to_start_time: self.to_start_time,
            to_end_time: self.to_end_time,
            tag: self.tag,
            place: self.place,
            image,
            description: self.description,
            total_tickets: self.total_tickets,
        })
    }
}

/// Разбирает календарную дату и обнуляет время суток.
///
/// Понимает `2025-12-01`, `2025-12-01T18:30:00[.000]` и RFC 3339
/// (`2025-12-01T00:00:00.000Z`) - в таком виде админка присылает даты обратно.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })?;
    date.and_hms_opt(0, 0, 0)
}
