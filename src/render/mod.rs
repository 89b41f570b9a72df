//! Rendering surface: color schemes, per-frame inputs and egui painters

mod colors;
mod frame;
mod widgets;

pub use colors::*;
pub use frame::*;
pub use widgets::*;
