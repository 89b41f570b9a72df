//! PAVI Viewer - Virtualized Alignment Engine
//!
//! Parsing, per-column analytics, viewport virtualization and rendering
//! adapters for viewing large multiple sequence alignments with variant
//! overlays.

pub mod analysis;
pub mod config;
pub mod error;
pub mod render;
pub mod source;
pub mod viewport;

pub use analysis::*;
