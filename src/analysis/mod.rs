//! Alignment parsing and analysis

mod analytics;
mod memo;
mod parser;
mod residues;
mod search;
mod types;

pub use analytics::*;
pub use memo::*;
pub use parser::*;
pub use residues::*;
pub use search::*;
pub use types::*;
