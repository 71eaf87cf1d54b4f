//! Firestore REST client for the bookings collection. Firestore's
//! realtime listener is not available over REST so the live feed polls
//! the collection and only yields when it changed.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use super::{BookingStore, StoreError};
use crate::booking::Booking;
use crate::core::AppConfig;
use crate::session::{IdentityToolkit, Session};

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    // Firestore omits the field entirely for an empty collection
    #[serde(default)]
    documents: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StringValue {
    #[serde(rename = "stringValue")]
    string_value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TimestampValue {
    #[serde(rename = "timestampValue")]
    timestamp_value: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingFields {
    month: StringValue,
    year: StringValue,
    host: StringValue,
    location: StringValue,
    day: StringValue,
    created_at: TimestampValue,
}

#[derive(Debug, Serialize, Deserialize)]
struct FirestoreDocument {
    #[serde(default, skip_serializing)]
    name: String,
    fields: BookingFields,
}

fn string_value(s: &str) -> StringValue {
    StringValue {
        string_value: s.to_string(),
    }
}

impl From<&Booking> for FirestoreDocument {
    fn from(booking: &Booking) -> Self {
        FirestoreDocument {
            name: String::new(),
            fields: BookingFields {
                month: string_value(&booking.month),
                year: string_value(&booking.year),
                host: string_value(&booking.host),
                location: string_value(&booking.location),
                day: string_value(&booking.day.to_string()),
                created_at: TimestampValue {
                    timestamp_value: booking.created_at,
                },
            },
        }
    }
}

impl TryFrom<FirestoreDocument> for Booking {
    type Error = anyhow::Error;

    fn try_from(doc: FirestoreDocument) -> Result<Self, Self::Error> {
        let BookingFields {
            month,
            year,
            host,
            location,
            day,
            created_at,
        } = doc.fields;
        Ok(Booking {
            month: month.string_value,
            year: year.string_value,
            host: host.string_value,
            location: location.string_value,
            day: day.string_value.parse()?,
            created_at: created_at.timestamp_value,
        })
    }
}

fn decode_document(raw: Value) -> Option<Booking> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string();
    serde_json::from_value::<FirestoreDocument>(raw)
        .map_err(anyhow::Error::from)
        .and_then(Booking::try_from)
        .inspect_err(|e| tracing::warn!("Skipping document {}: {}", name, e))
        .ok()
}

#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    api_hostname: String,
    project_id: String,
    collection: String,
    // Shared by clones so a refreshed token is seen by the live feed too
    session: Arc<Mutex<Session>>,
    identity: Arc<IdentityToolkit>,
    poll_interval: Duration,
}

impl FirestoreStore {
    pub fn new(config: &AppConfig, session: &Session) -> Result<Self, StoreError> {
        if config.firebase_project_id.is_empty() {
            return Err(StoreError::Config(
                "DAWRIYA_FIREBASE_PROJECT_ID is not set".into(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            api_hostname: config
                .firestore_api_hostname
                .trim_end_matches('/')
                .to_string(),
            project_id: config.firebase_project_id.clone(),
            collection: config.collection_path(),
            session: Arc::new(Mutex::new(session.clone())),
            identity: Arc::new(IdentityToolkit::from_config(config)),
            poll_interval: Duration::from_secs(config.store_poll_interval_secs.max(1)),
        })
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.api_hostname, self.project_id, self.collection
        )
    }

    fn document_url(&self, doc_id: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(doc_id))
    }

    /// Id token for the next request, refreshed first when it is about
    /// to expire.
    async fn id_token(&self) -> Result<String, StoreError> {
        let mut session = self.session.lock().await;
        if session.needs_refresh(Utc::now()) {
            *session = self.identity.refresh(&session).await?;
        }
        Ok(session.id_token.clone())
    }

    /// Refresh after `rejected` was refused. Returns false when the
    /// session has nothing to refresh with.
    async fn refresh_rejected(&self, rejected: &str) -> Result<bool, StoreError> {
        let mut session = self.session.lock().await;
        if session.refresh_token.is_empty() {
            return Ok(false);
        }
        // Another request may have refreshed it already
        if session.id_token == rejected {
            *session = self.identity.refresh(&session).await?;
        }
        Ok(true)
    }

    /// Send the request built by `build`, retrying once with a fresh id
    /// token if the store answers 401.
    async fn send(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let token = self.id_token().await?;
        let response = authorized(build(), &token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED || !self.refresh_rejected(&token).await? {
            return check_status(response).await;
        }

        tracing::debug!("Id token rejected, retrying with a refreshed one");
        let token = self.id_token().await?;
        check_status(authorized(build(), &token).send().await?).await
    }
}

fn authorized(request: reqwest::RequestBuilder, id_token: &str) -> reqwest::RequestBuilder {
    if id_token.is_empty() {
        request
    } else {
        request.bearer_auth(id_token)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

#[async_trait]
impl BookingStore for FirestoreStore {
    async fn fetch_all(&self) -> Result<Vec<Booking>, StoreError> {
        let response = self
            .send(|| {
                self.client
                    .get(self.collection_url())
                    .query(&[("pageSize", "300")])
            })
            .await?;
        let list: ListDocumentsResponse = response.json().await?;

        let mut bookings: Vec<Booking> = list.documents.into_iter().filter_map(decode_document).collect();
        bookings.sort_by(|a, b| a.doc_id().cmp(&b.doc_id()));
        Ok(bookings)
    }

    async fn put(&self, doc_id: &str, booking: &Booking) -> Result<(), StoreError> {
        let document = FirestoreDocument::from(booking);
        self.send(|| self.client.patch(self.document_url(doc_id)).json(&document))
            .await?;
        Ok(())
    }

    fn changes(&self) -> BoxStream<'static, Result<Vec<Booking>, StoreError>> {
        let store = self.clone();
        Box::pin(stream! {
            let mut last: Option<Vec<Booking>> = None;
            let mut ticker = tokio::time::interval(store.poll_interval);
            loop {
                ticker.tick().await;
                match store.fetch_all().await {
                    Ok(bookings) => {
                        if last.as_ref() != Some(&bookings) {
                            last = Some(bookings.clone());
                            yield Ok(bookings);
                        }
                    }
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        })
    }
}
