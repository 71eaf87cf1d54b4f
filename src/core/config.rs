use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

const DEFAULT_HOSTS: &[&str] = &[
    "أبو سلطان",
    "أبو عبدالله",
    "أبو ثامر",
    "العم عبد الرحمن",
    "أبو فيصل",
    "أبو عاصم",
    "أبو أسامة",
    "أبو فارس",
    "أبو هشام",
    "أبو محمد",
    "أم نايف",
    "أم عبدالله",
    "أم سهيل",
    "أم تركي",
    "أم ريان",
    "أم الوليد",
    "أم فهد",
];

const DEFAULT_LOCATIONS: &[&str] = &["مجالس أبوسلطان وأبوعبدالله", "استراحة الملقا"];

/// Which document store holds the bookings collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Firestore,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "firestore" => Ok(Self::Firestore),
            other => Err(anyhow!("Unknown store backend \"{}\"", other)),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Firestore => write!(f, "firestore"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub store_backend: StoreBackend,
    pub app_id: String,
    pub firebase_project_id: String,
    pub firebase_api_key: String,
    pub firestore_api_hostname: String,
    pub identity_api_hostname: String,
    pub securetoken_api_hostname: String,
    // Pre-issued token handed over by the hosting environment
    pub initial_auth_token: Option<String>,
    pub store_poll_interval_secs: u64,
    pub year: String,
    pub hosts: Vec<String>,
    pub locations: Vec<String>,
    pub gemini_api_hostname: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
}

impl AppConfig {
    /// Path of the bookings collection inside the document store.
    pub fn collection_path(&self) -> String {
        format!("artifacts/{}/public/data/bookings", self.app_id)
    }
}

fn list_var(name: &str, defaults: &[&str]) -> Vec<String> {
    match env::var(name) {
        Ok(val) if !val.trim().is_empty() => val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => defaults.iter().map(|s| s.to_string()).collect(),
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("DAWRIYA_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path.trim_end_matches('/'));
        let store_backend = env::var("DAWRIYA_STORE_BACKEND")
            .ok()
            .and_then(|s| {
                s.parse()
                    .inspect_err(|e| tracing::warn!("{}, falling back to sqlite", e))
                    .ok()
            })
            .unwrap_or(StoreBackend::Sqlite);
        let app_id = env::var("DAWRIYA_APP_ID").unwrap_or_else(|_| "default-app-id".to_string());
        let firebase_project_id = env::var("DAWRIYA_FIREBASE_PROJECT_ID").unwrap_or_default();
        let firebase_api_key = env::var("DAWRIYA_FIREBASE_API_KEY").unwrap_or_default();
        let firestore_api_hostname = env::var("DAWRIYA_FIRESTORE_HOST")
            .unwrap_or_else(|_| "https://firestore.googleapis.com".to_string());
        let identity_api_hostname = env::var("DAWRIYA_IDENTITY_HOST")
            .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com".to_string());
        let securetoken_api_hostname = env::var("DAWRIYA_SECURETOKEN_HOST")
            .unwrap_or_else(|_| "https://securetoken.googleapis.com".to_string());
        // An empty token is the same as no token at all
        let initial_auth_token = env::var("DAWRIYA_INITIAL_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        let store_poll_interval_secs = env::var("DAWRIYA_STORE_POLL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        let year = env::var("DAWRIYA_YEAR").unwrap_or_else(|_| "1447".to_string());
        let hosts = list_var("DAWRIYA_HOSTS", DEFAULT_HOSTS);
        let locations = list_var("DAWRIYA_LOCATIONS", DEFAULT_LOCATIONS);
        let gemini_api_hostname = env::var("DAWRIYA_GEMINI_HOST")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let gemini_api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
        let gemini_model = env::var("DAWRIYA_GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-2.5-flash-preview-05-20".to_string());

        Self {
            storage_path,
            db_path,
            store_backend,
            app_id,
            firebase_project_id,
            firebase_api_key,
            firestore_api_hostname,
            identity_api_hostname,
            securetoken_api_hostname,
            initial_auth_token,
            store_poll_interval_secs,
            year,
            hosts,
            locations,
            gemini_api_hostname,
            gemini_api_key,
            gemini_model,
        }
    }
}
