//! Router for the server rendered web UI

use axum::{
    Form, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use super::templates::{Page, render_page};
use crate::api::public::{ApiError, LOADING_MESSAGE, ServiceError};
use crate::api::routes::assistant::{find_booking, generate_for_booking};
use crate::api::SharedState;
use crate::assistant::PromptKind;
use crate::booking::{Booking, BookingView, ClaimRequest, Weekday};
use crate::catalog;
use crate::controller::ViewStatus;

const TITLE: &str = "جدول الدورية الشهرية للأسرة";

#[derive(Serialize)]
struct Card {
    name: &'static str,
    path: String,
    booked: bool,
    host: Option<String>,
    location: Option<String>,
    day: Option<&'static str>,
}

#[derive(Serialize)]
struct CalendarPage {
    year: String,
    banner: Option<String>,
    cards: Vec<Card>,
}

#[derive(Serialize)]
struct OptionItem {
    value: String,
    selected: bool,
}

#[derive(Serialize)]
struct DayItem {
    value: Weekday,
    label: &'static str,
    checked: bool,
}

#[derive(Serialize)]
struct BookingFormPage {
    month: String,
    path: String,
    hosts: Vec<OptionItem>,
    locations: Vec<OptionItem>,
    days: Vec<DayItem>,
    error: Option<String>,
}

#[derive(Serialize)]
struct BookingSuccessPage {
    month: String,
    host: String,
    path: String,
    busy: bool,
    result: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct BookingForm {
    #[serde(default)]
    host: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    day: Weekday,
}

fn month_path(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

fn options(values: &[String], selected: &str) -> Vec<OptionItem> {
    values
        .iter()
        .map(|v| OptionItem {
            value: v.clone(),
            selected: v == selected,
        })
        .collect()
}

fn loading_page() -> Result<Response, ApiError> {
    let html = render_page(
        TITLE,
        Page::Loading,
        &serde_json::json!({ "message": LOADING_MESSAGE }),
    )?;
    Ok(Html(html).into_response())
}

fn calendar_page(view: &BookingView, banner: Option<String>) -> Result<Response, ApiError> {
    let cards = view
        .entries()
        .iter()
        .map(|entry| Card {
            name: entry.month.name,
            path: month_path(entry.month.name),
            booked: entry.booking.is_some(),
            host: entry.booking.as_ref().map(|b| b.host.clone()),
            location: entry.booking.as_ref().map(|b| b.location.clone()),
            day: entry.booking.as_ref().map(|b| b.day.label()),
        })
        .collect();
    let page = CalendarPage {
        year: view.year.clone(),
        banner,
        cards,
    };
    Ok(Html(render_page(TITLE, Page::Calendar, &page)?).into_response())
}

fn form_page(
    state: &SharedState,
    month: &str,
    form: &BookingForm,
    error: Option<String>,
    status: StatusCode,
) -> Result<Response, ApiError> {
    let (hosts, locations) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.config.hosts.clone(),
            shared_state.config.locations.clone(),
        )
    };
    // An empty choice falls back to the first entry, which is also what
    // a fresh form preselects
    let host = if form.host.is_empty() {
        hosts.first().cloned().unwrap_or_default()
    } else {
        form.host.clone()
    };
    let location = if form.location.is_empty() {
        locations.first().cloned().unwrap_or_default()
    } else {
        form.location.clone()
    };
    let page = BookingFormPage {
        month: month.to_string(),
        path: month_path(month),
        hosts: options(&hosts, &host),
        locations: options(&locations, &location),
        days: Weekday::ALL
            .iter()
            .map(|day| DayItem {
                value: *day,
                label: day.label(),
                checked: *day == form.day,
            })
            .collect(),
        error,
    };
    let html = render_page(TITLE, Page::BookingForm, &page)?;
    Ok((status, Html(html)).into_response())
}

fn success_page(
    booking: &Booking,
    result: Option<String>,
    error: Option<String>,
    busy: bool,
) -> Result<Response, ApiError> {
    let page = BookingSuccessPage {
        month: booking.month.clone(),
        host: booking.host.clone(),
        path: month_path(&booking.month),
        busy,
        result,
        error,
    };
    Ok(Html(render_page(TITLE, Page::BookingSuccess, &page)?).into_response())
}

/// Month cards for the active year
async fn index(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let (status, year) = {
        let shared_state = state.read().expect("Unable to read share state");
        (
            shared_state.view.borrow().clone(),
            shared_state.config.year.clone(),
        )
    };
    match status {
        ViewStatus::Loading => loading_page(),
        ViewStatus::Live { view } => calendar_page(&view, None),
        ViewStatus::Failed { message, last } => {
            let view = last.unwrap_or_else(|| BookingView::empty(&year));
            calendar_page(&view, Some(message))
        }
    }
}

/// Booking form for an unbooked month
async fn booking_form(
    State(state): State<SharedState>,
    Path(month): Path<String>,
) -> Result<Response, ApiError> {
    let status = state
        .read()
        .expect("Unable to read share state")
        .view
        .borrow()
        .clone();
    let Some(view) = status.view() else {
        return loading_page();
    };
    let Some(month) = catalog::find(&month).filter(|m| !view.is_booked(m.name)) else {
        return Ok(Redirect::to("/").into_response());
    };
    let form = BookingForm {
        host: String::new(),
        location: String::new(),
        day: Weekday::default(),
    };
    form_page(&state, month.name, &form, None, StatusCode::OK)
}

async fn submit_booking(
    State(state): State<SharedState>,
    Path(month): Path<String>,
    Form(form): Form<BookingForm>,
) -> Result<Response, ApiError> {
    let client = state.read().expect("Unable to read share state").client.clone();
    let Some(client) = client else {
        return loading_page();
    };

    let request = ClaimRequest {
        month: month.clone(),
        host: form.host.clone(),
        location: form.location.clone(),
        day: form.day,
    };
    match client.claim(request).await {
        Ok(booking) => success_page(&booking, None, None, false),
        Err(e) => {
            let err = ServiceError::from(e);
            let message = err.user_message();
            form_page(&state, &month, &form, Some(message), err.status_code())
        }
    }
}

async fn submit_assistant(
    State(state): State<SharedState>,
    Path((month, kind)): Path<(String, PromptKind)>,
) -> Result<Response, ApiError> {
    let Ok(booking) = find_booking(&state, &month) else {
        return Ok(Redirect::to("/").into_response());
    };

    match generate_for_booking(&state, &booking, kind).await {
        Ok(text) => success_page(&booking, Some(text), None, false),
        Err(ServiceError::Busy) => success_page(&booking, None, None, true),
        Err(e) => success_page(&booking, None, Some(e.user_message()), false),
    }
}

/// Create the web UI router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/book/{month}", get(booking_form).post(submit_booking))
        .route("/assistant/{month}/{kind}", post(submit_assistant))
}
