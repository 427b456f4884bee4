pub mod event;
pub mod booking;

pub use event::{Event, EventFields, EventForm, EventPayload, InvalidEvent, NewEvent, PublicEvent};
pub use booking::{Booking, BookingForm, InvalidBooking, NewBooking};
