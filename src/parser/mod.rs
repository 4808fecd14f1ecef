// Selection expression parser

pub mod lexer;
pub mod selection;

// Public API re-exports
pub use selection::{apply_selection, parse_assignments, parse_selection};
