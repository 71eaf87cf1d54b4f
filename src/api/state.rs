use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tokio_rusqlite::Connection;

use crate::assistant::Assistant;
use crate::booking::BookingClient;
use crate::controller::ViewStatus;
use crate::core::AppConfig;
use crate::session::SessionState;

pub type SharedState = Arc<RwLock<AppState>>;

pub struct AppState {
    // Only open for the sqlite store
    pub db: Option<Connection>,
    pub config: AppConfig,
    pub session: watch::Receiver<SessionState>,
    pub view: watch::Receiver<ViewStatus>,
    // Set by the controller once the session is ready
    pub client: Option<BookingClient>,
    pub assistant: Assistant,
    // Bookings with an assistant request in flight
    pub assistant_in_flight: HashSet<String>,
}

impl AppState {
    pub fn new(
        db: Option<Connection>,
        config: AppConfig,
        session: watch::Receiver<SessionState>,
        view: watch::Receiver<ViewStatus>,
    ) -> Self {
        let assistant = Assistant::new(&config);
        Self {
            db,
            config,
            session,
            view,
            client: None,
            assistant,
            assistant_in_flight: HashSet::new(),
        }
    }
}

/// Marks an assistant request for a booking as in flight until dropped.
pub struct InFlight {
    state: SharedState,
    key: String,
}

impl InFlight {
    /// Returns `None` when a request for the same booking is already
    /// running.
    pub fn begin(state: &SharedState, key: &str) -> Option<Self> {
        let inserted = state
            .write()
            .expect("Unable to write shared state")
            .assistant_in_flight
            .insert(key.to_string());
        inserted.then(|| Self {
            state: Arc::clone(state),
            key: key.to_string(),
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.write() {
            state.assistant_in_flight.remove(&self.key);
        }
    }
}
