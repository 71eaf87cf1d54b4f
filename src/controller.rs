//! Top-level controller owning the session bootstrap and the single
//! live booking subscription for the lifetime of the server.

use std::sync::Arc;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::SharedState;
use crate::booking::{BookingClient, BookingView, SubscriptionError};
use crate::session::SessionBootstrapper;
use crate::store::{BookingStore, connect_store};

/// What the UI can currently show.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ViewStatus {
    /// No snapshot yet, either still signing in or the sign in failed
    Loading,
    Live { view: BookingView },
    /// The subscription ended, `last` is what was shown before
    Failed {
        message: String,
        last: Option<BookingView>,
    },
}

impl ViewStatus {
    pub fn view(&self) -> Option<&BookingView> {
        match self {
            ViewStatus::Loading => None,
            ViewStatus::Live { view } => Some(view),
            ViewStatus::Failed { last, .. } => last.as_ref(),
        }
    }
}

pub struct Controller {
    task: JoinHandle<()>,
}

impl Controller {
    pub fn start(
        shared_state: SharedState,
        bootstrapper: SessionBootstrapper,
        view_tx: watch::Sender<ViewStatus>,
    ) -> Self {
        let task = tokio::spawn(run(shared_state, bootstrapper, view_tx, None));
        Self { task }
    }

    /// Like `start` but subscribes to `store` instead of the one the
    /// config selects.
    pub fn start_with_store(
        shared_state: SharedState,
        bootstrapper: SessionBootstrapper,
        view_tx: watch::Sender<ViewStatus>,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        let task = tokio::spawn(run(shared_state, bootstrapper, view_tx, Some(store)));
        Self { task }
    }

    /// Close the subscription.
    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
        tracing::debug!("Booking subscription closed");
    }
}

async fn run(
    shared_state: SharedState,
    bootstrapper: SessionBootstrapper,
    view_tx: watch::Sender<ViewStatus>,
    store: Option<Arc<dyn BookingStore>>,
) {
    let (config, db) = {
        let state = shared_state.read().expect("Unable to read shared state");
        (state.config.clone(), state.db.clone())
    };

    // Failures are logged by the bootstrapper and the UI keeps loading
    let Ok(session) = bootstrapper
        .bootstrap(config.initial_auth_token.as_deref())
        .await
    else {
        return;
    };

    let connected = match store {
        Some(store) => Ok(store),
        None => connect_store(&config, db, &session).await,
    };
    let store = match connected {
        Ok(store) => store,
        Err(e) => {
            let err = SubscriptionError::from(e);
            tracing::error!("Error fetching bookings: {}", err);
            view_tx.send_replace(ViewStatus::Failed {
                message: err.user_message().to_string(),
                last: None,
            });
            return;
        }
    };

    let client = BookingClient::new(store, session, &config.year);
    shared_state
        .write()
        .expect("Unable to write shared state")
        .client = Some(client.clone());

    let mut views = client.subscribe();
    while let Some(next) = views.next().await {
        match next {
            Ok(view) => {
                tracing::debug!(
                    "Received snapshot with {} of 12 months booked",
                    view.booked_count()
                );
                view_tx.send_replace(ViewStatus::Live { view });
            }
            Err(e) => {
                tracing::error!("Error fetching bookings: {}", e);
                let last = view_tx.borrow().view().cloned();
                view_tx.send_replace(ViewStatus::Failed {
                    message: e.user_message().to_string(),
                    last,
                });
                break;
            }
        }
    }
}

/// Wait until the first snapshot (or a failure) is published.
pub async fn wait_until_settled(
    view: &mut watch::Receiver<ViewStatus>,
) -> Result<ViewStatus, watch::error::RecvError> {
    view.wait_for(|status| *status != ViewStatus::Loading)
        .await
        .map(|status| status.clone())
}

/// Convenience used by handlers that only care about the view.
pub fn current_view(view: &watch::Receiver<ViewStatus>) -> Option<BookingView> {
    view.borrow().view().cloned()
}
