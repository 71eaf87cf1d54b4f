//! The twelve Hijri months that can be hosted in a year, in the order
//! they are shown.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Month {
    pub name: &'static str,
    #[serde(rename = "calendarIndex")]
    pub calendar_index: u8,
}

const fn month(name: &'static str, calendar_index: u8) -> Month {
    Month {
        name,
        calendar_index,
    }
}

// Display order starts at the season the schedule was opened in
pub const MONTHS: [Month; 12] = [
    month("ربيع الثاني", 4),
    month("جمادى الأولى", 5),
    month("جمادى الآخرة", 6),
    month("رجب", 7),
    month("شعبان", 8),
    month("رمضان", 9),
    month("شوال", 10),
    month("ذو القعدة", 11),
    month("ذو الحجة", 12),
    month("محرم", 1),
    month("صفر", 2),
    month("ربيع الأول", 3),
];

pub fn months() -> &'static [Month] {
    &MONTHS
}

/// Look up a catalog month by its display name.
pub fn find(name: &str) -> Option<&'static Month> {
    MONTHS.iter().find(|m| m.name == name.trim())
}
