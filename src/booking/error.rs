use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("A host must be selected")]
    EmptyHost,
    #[error("Unknown month \"{0}\"")]
    UnknownMonth(String),
    #[error("{month} {year} is already booked")]
    AlreadyBooked { year: String, month: String },
    #[error("Failed to write booking: {0}")]
    WriteFailed(#[source] StoreError),
}

impl ClaimError {
    /// Text shown inline on the booking form
    pub fn user_message(&self) -> &'static str {
        match self {
            ClaimError::EmptyHost => "الرجاء اختيار المضيف.",
            ClaimError::UnknownMonth(_) => "هذا الشهر غير موجود في الجدول.",
            ClaimError::AlreadyBooked { .. } => "هذا الشهر محجوز بالفعل.",
            ClaimError::WriteFailed(_) => "حدث خطأ أثناء تأكيد الحجز.",
        }
    }
}

/// The live feed of bookings stopped delivering snapshots.
#[derive(Debug, Error)]
#[error("Booking subscription failed: {0}")]
pub struct SubscriptionError(#[from] pub StoreError);

impl SubscriptionError {
    pub fn user_message(&self) -> &'static str {
        "حدث خطأ في تحميل الحجوزات."
    }
}
