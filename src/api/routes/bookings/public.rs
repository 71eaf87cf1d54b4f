//! Public types for the bookings API
use serde::Serialize;

use crate::booking::{Booking, BookingView};
use crate::controller::ViewStatus;

#[derive(Serialize)]
pub struct MonthStatus {
    pub name: String,
    #[serde(rename = "calendarIndex")]
    pub calendar_index: u8,
    pub booked: bool,
    pub booking: Option<Booking>,
}

#[derive(Serialize)]
pub struct BookingsResponse {
    pub status: &'static str,
    pub year: String,
    pub months: Vec<MonthStatus>,
    // Banner shown after the live feed failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn months(view: &BookingView) -> Vec<MonthStatus> {
    view.entries()
        .iter()
        .map(|entry| MonthStatus {
            name: entry.month.name.to_string(),
            calendar_index: entry.month.calendar_index,
            booked: entry.booking.is_some(),
            booking: entry.booking.clone(),
        })
        .collect()
}

impl BookingsResponse {
    pub fn from_status(status: &ViewStatus, year: &str) -> Self {
        match status {
            ViewStatus::Loading => Self {
                status: "loading",
                year: year.to_string(),
                months: vec![],
                error: None,
            },
            ViewStatus::Live { view } => Self {
                status: "live",
                year: view.year.clone(),
                months: months(view),
                error: None,
            },
            ViewStatus::Failed { message, last } => Self {
                status: "failed",
                year: year.to_string(),
                months: last.as_ref().map(months).unwrap_or_default(),
                error: Some(message.clone()),
            },
        }
    }
}
