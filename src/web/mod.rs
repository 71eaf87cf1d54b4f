//! Server rendered web UI: month cards, the booking form and the
//! assistant panel shown after a successful booking.

mod router;
pub mod templates;

pub use router::router;
