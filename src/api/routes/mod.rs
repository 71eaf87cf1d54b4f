//! API routes module

pub mod assistant;
pub mod bookings;
pub mod catalog;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Month catalog and form options
        .nest("/catalog", catalog::router())
        // Live bookings and claims
        .nest("/bookings", bookings::router())
        // Generated invitation text and ideas
        .nest("/assistant", assistant::router())
}
