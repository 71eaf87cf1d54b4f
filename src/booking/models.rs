use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The end-of-month day a gathering can be held on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    #[default]
    #[serde(alias = "الخميس", alias = "thursday")]
    Thursday,
    #[serde(alias = "الجمعة", alias = "friday")]
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 2] = [Weekday::Thursday, Weekday::Friday];

    /// Arabic label shown in the UI and used in prompts
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Thursday => "الخميس",
            Weekday::Friday => "الجمعة",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Weekday {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Thursday" | "thursday" | "الخميس" => Ok(Weekday::Thursday),
            "Friday" | "friday" | "الجمعة" => Ok(Weekday::Friday),
            other => Err(anyhow!("Unsupported day \"{}\"", other)),
        }
    }
}

/// A persisted claim of one month by one host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub month: String,
    pub year: String,
    pub host: String,
    pub location: String,
    pub day: Weekday,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn doc_id(&self) -> String {
        doc_id(&self.year, &self.month)
    }
}

/// Deterministic document id for the `(year, month)` identity key.
pub fn doc_id(year: &str, month: &str) -> String {
    format!("{}_{}", year, month)
}

/// What a user submits when claiming a month.
#[derive(Clone, Debug, Deserialize)]
pub struct ClaimRequest {
    pub month: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub day: Weekday,
}
