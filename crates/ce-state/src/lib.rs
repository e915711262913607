//! ce-state: Editor state for the Contour EQ editor
//!
//! Owns everything the interaction engine mutates:
//! - Entity store with stable ids and the point-mode reference anchor
//! - Selection set, marquee and hit-testing
//! - Profile data and repositories
//! - Snapshot undo history
//! - Injectable clock, rate limiter and commit debouncer

mod history;
mod profile;
mod selection;
mod store;
mod timing;

pub use history::*;
pub use profile::*;
pub use selection::*;
pub use store::*;
pub use timing::*;
