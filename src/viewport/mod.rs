//! Viewport state, row virtualization and keyboard input

mod controller;
mod debounce;
mod input;
mod slice;

pub use controller::*;
pub use debounce::*;
pub use input::*;
pub use slice::*;
