//! ce-editor: Interaction engine for the Contour EQ editor
//!
//! Turns pointer and keyboard input into entity/selection mutations and
//! publishes a render bundle after every change. Rendering, widgets and audio
//! stay with the host, which wires in collaborators through [`EngineBuilder`].

mod bundle;
mod calibration;
mod engine;
mod input;

pub use bundle::*;
pub use calibration::*;
pub use engine::*;
pub use input::*;
