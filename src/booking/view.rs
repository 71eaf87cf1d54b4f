use serde::Serialize;

use super::models::Booking;
use crate::catalog::{self, Month};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MonthEntry {
    pub month: Month,
    pub booking: Option<Booking>,
}

/// Projection of a store snapshot onto the month catalog for one year.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BookingView {
    pub year: String,
    entries: Vec<MonthEntry>,
}

impl BookingView {
    pub fn empty(year: &str) -> Self {
        Self {
            year: year.to_string(),
            entries: catalog::months()
                .iter()
                .map(|month| MonthEntry {
                    month: *month,
                    booking: None,
                })
                .collect(),
        }
    }

    /// Build the view from every booking in the collection. Records for
    /// other years or months outside the catalog are ignored and a month
    /// never holds more than one booking.
    pub fn from_bookings<I>(year: &str, bookings: I) -> Self
    where
        I: IntoIterator<Item = Booking>,
    {
        let mut view = Self::empty(year);
        for booking in bookings {
            view.record(booking);
        }
        view
    }

    /// Add a single booking, keeping the newest one for its month.
    pub fn record(&mut self, booking: Booking) {
        if booking.year != self.year {
            return;
        }
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.month.name == booking.month)
        else {
            return;
        };
        match &entry.booking {
            Some(existing) if existing.created_at > booking.created_at => {
                tracing::warn!(
                    "Ignoring older duplicate booking for {} by {}",
                    booking.month,
                    booking.host
                );
            }
            _ => entry.booking = Some(booking),
        }
    }

    pub fn entries(&self) -> &[MonthEntry] {
        &self.entries
    }

    pub fn get(&self, month: &str) -> Option<&Booking> {
        self.entries
            .iter()
            .find(|e| e.month.name == month)
            .and_then(|e| e.booking.as_ref())
    }

    pub fn is_booked(&self, month: &str) -> bool {
        self.get(month).is_some()
    }

    pub fn booked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.booking.is_some()).count()
    }
}
