//! Router for the bookings API

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, sse::Event, sse::KeepAlive, sse::Sse},
    routing::get,
};
use tokio_stream::StreamExt as _;
use tokio_stream::wrappers::WatchStream;

use super::public;
use crate::api::public::ServiceError;
use crate::api::state::SharedState;
use crate::booking::{Booking, ClaimRequest};
use crate::controller::ViewStatus;

/// Current view of the year
async fn list_bookings(
    State(state): State<SharedState>,
) -> Result<Json<public::BookingsResponse>, ServiceError> {
    let (status, year) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.view.borrow().clone(),
            shared_state.config.year.clone(),
        )
    };

    match &status {
        ViewStatus::Loading => Err(ServiceError::Loading),
        ViewStatus::Failed {
            message,
            last: None,
        } => Err(ServiceError::Unavailable(message.clone())),
        _ => Ok(Json(public::BookingsResponse::from_status(&status, &year))),
    }
}

/// Claim an unbooked month
async fn claim_booking(
    State(state): State<SharedState>,
    Json(payload): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<Booking>), ServiceError> {
    let client = state
        .read()
        .expect("Unable to read share state")
        .client
        .clone()
        .ok_or(ServiceError::Loading)?;
    let booking = client.claim(payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Stream a snapshot event every time the view changes
async fn stream_bookings(State(state): State<SharedState>) -> impl IntoResponse {
    let (view, year) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.view.clone(), shared_state.config.year.clone())
    };

    let stream = WatchStream::new(view).map(move |status| {
        Ok::<Event, Infallible>(
            Event::default()
                .event("snapshot")
                .json_data(public::BookingsResponse::from_status(&status, &year))
                .unwrap_or_else(|e| {
                    tracing::error!("Failed to encode snapshot: {}", e);
                    Event::default().event("error")
                }),
        )
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Create the bookings router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_bookings).post(claim_booking))
        .route("/stream", get(stream_bookings))
}
