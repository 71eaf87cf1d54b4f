//! Public types for the catalog API
use serde::Serialize;

use crate::booking::Weekday;
use crate::catalog::Month;

#[derive(Serialize)]
pub struct DayOption {
    pub value: Weekday,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub year: String,
    pub months: Vec<Month>,
    pub hosts: Vec<String>,
    pub locations: Vec<String>,
    pub days: Vec<DayOption>,
}
