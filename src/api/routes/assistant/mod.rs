pub mod public;
mod router;
pub use router::{find_booking, generate_for_booking, router};
