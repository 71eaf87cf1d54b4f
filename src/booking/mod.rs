pub mod client;
pub mod error;
pub mod models;
pub mod view;

pub use client::BookingClient;
pub use error::{ClaimError, SubscriptionError};
pub use models::{Booking, ClaimRequest, Weekday, doc_id};
pub use view::{BookingView, MonthEntry};
