//! Router for the catalog API, everything a client needs to build the
//! booking form

use axum::{Json, Router, extract::State, routing::get};

use super::public;
use crate::api::state::SharedState;
use crate::booking::Weekday;
use crate::catalog;

async fn catalog_handler(State(state): State<SharedState>) -> Json<public::CatalogResponse> {
    let config = state.read().expect("Unable to read share state").config.clone();
    Json(public::CatalogResponse {
        year: config.year,
        months: catalog::months().to_vec(),
        hosts: config.hosts,
        locations: config.locations,
        days: Weekday::ALL
            .iter()
            .map(|day| public::DayOption {
                value: *day,
                label: day.label(),
            })
            .collect(),
    })
}

/// Create the catalog router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(catalog_handler))
}
