use std::sync::{Arc, RwLock};

use chrono::Utc;
use futures::stream::BoxStream;
use futures_util::StreamExt;

use super::error::{ClaimError, SubscriptionError};
use super::models::{Booking, ClaimRequest};
use super::view::BookingView;
use crate::catalog;
use crate::session::Session;
use crate::store::BookingStore;

/// Booking store client for one year. Claims are checked against the
/// view cached from the live subscription before they are written.
///
/// The cache can be stale, so two claims for the same month that race
/// each other both reach the store and the last write wins. The store
/// always ends up with exactly one booking for the month.
#[derive(Clone)]
pub struct BookingClient {
    store: Arc<dyn BookingStore>,
    session: Session,
    year: String,
    cache: Arc<RwLock<BookingView>>,
}

impl BookingClient {
    /// Requires a session from a completed bootstrap.
    pub fn new(store: Arc<dyn BookingStore>, session: Session, year: &str) -> Self {
        Self {
            store,
            session,
            year: year.to_string(),
            cache: Arc::new(RwLock::new(BookingView::empty(year))),
        }
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Latest view delivered by the subscription
    pub fn cached_view(&self) -> BookingView {
        self.cache.read().expect("Booking cache lock poisoned").clone()
    }

    /// Live views of the year, one per store snapshot. Dropping the
    /// stream closes the subscription and calling this again opens a
    /// new one.
    pub fn subscribe(&self) -> BoxStream<'static, Result<BookingView, SubscriptionError>> {
        let cache = Arc::clone(&self.cache);
        let year = self.year.clone();
        self.store
            .changes()
            .map(move |snapshot| -> Result<BookingView, SubscriptionError> {
                let view = BookingView::from_bookings(&year, snapshot?);
                *cache.write().expect("Booking cache lock poisoned") = view.clone();
                Ok(view)
            })
            .boxed()
    }

    pub async fn claim(&self, request: ClaimRequest) -> Result<Booking, ClaimError> {
        let host = request.host.trim();
        if host.is_empty() {
            return Err(ClaimError::EmptyHost);
        }
        let month = catalog::find(&request.month)
            .ok_or_else(|| ClaimError::UnknownMonth(request.month.clone()))?;

        if self.cache.read().expect("Booking cache lock poisoned").is_booked(month.name) {
            return Err(ClaimError::AlreadyBooked {
                year: self.year.clone(),
                month: month.name.to_string(),
            });
        }

        let booking = Booking {
            month: month.name.to_string(),
            year: self.year.clone(),
            host: host.to_string(),
            location: request.location.trim().to_string(),
            day: request.day,
            created_at: Utc::now(),
        };
        self.store
            .put(&booking.doc_id(), &booking)
            .await
            .map_err(|e| {
                tracing::error!("Error adding booking {}: {}", booking.doc_id(), e);
                ClaimError::WriteFailed(e)
            })?;

        // Callers can act on the booking before the next snapshot lands
        self.cache
            .write()
            .expect("Booking cache lock poisoned")
            .record(booking.clone());

        tracing::info!(
            uid = %self.session.uid,
            "Booked {} for {} at {} ({})",
            booking.doc_id(),
            booking.host,
            booking.location,
            booking.day
        );
        Ok(booking)
    }
}
