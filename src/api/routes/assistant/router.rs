//! Router for the assistant API

use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ServiceError;
use crate::api::state::{InFlight, SharedState};
use crate::assistant::PromptKind;
use crate::booking::Booking;
use crate::catalog;
use crate::controller::current_view;

/// The booking for `month`. A claim shows up in the client's cache
/// before the live view catches up, so both are checked.
pub fn find_booking(state: &SharedState, month: &str) -> Result<Booking, ServiceError> {
    let month = catalog::find(month).map_or(month, |m| m.name);
    let shared_state = state.read().expect("Unable to read share state");
    let view = current_view(&shared_state.view).ok_or(ServiceError::Loading)?;
    view.get(month)
        .cloned()
        .or_else(|| {
            shared_state
                .client
                .as_ref()
                .and_then(|client| client.cached_view().get(month).cloned())
        })
        .ok_or_else(|| ServiceError::NotBooked(month.to_string()))
}

/// Generate text for a confirmed booking. Only one request per booking
/// runs at a time.
pub async fn generate_for_booking(
    state: &SharedState,
    booking: &Booking,
    kind: PromptKind,
) -> Result<String, ServiceError> {
    let assistant = state
        .read()
        .expect("Unable to read share state")
        .assistant
        .clone();
    let _in_flight = InFlight::begin(state, &booking.doc_id()).ok_or(ServiceError::Busy)?;
    let text = assistant.request_text(kind, booking).await?;
    Ok(text)
}

async fn assistant_handler(
    State(state): State<SharedState>,
    Json(payload): Json<public::AssistantRequest>,
) -> Result<Json<public::AssistantResponse>, ServiceError> {
    let booking = find_booking(&state, &payload.month)?;
    let text = generate_for_booking(&state, &booking, payload.kind).await?;
    Ok(Json(public::AssistantResponse {
        kind: payload.kind,
        text,
    }))
}

/// Create the assistant router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(assistant_handler))
}
