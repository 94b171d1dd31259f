//! Domain models, selection state, and error definitions.
//!
//! Foundation crate -- no async or I/O dependencies.

pub mod error;
pub mod selection;
pub mod types;

pub use error::SelectError;
pub use selection::{parse_count, Membership, SelectionState};
pub use types::{Artwork, Identified, ItemId, Page};
