//! ce-core: Shared types for the Contour EQ editor
//!
//! Entity model (bands/points), domain clamping, the frequency/gain ↔ pixel
//! coordinate mapping and the editor configuration. Everything here is pure
//! data; state and interaction live in `ce-state` and `ce-editor`.

mod config;
mod curve;
mod entity;
mod error;
pub mod mapping;

pub use config::*;
pub use curve::*;
pub use entity::*;
pub use error::*;
pub use mapping::{AmplitudeRange, FrequencyRange, Point, Rect, Viewport};
