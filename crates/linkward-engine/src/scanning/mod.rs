pub mod cursor;
pub mod kinds;
pub mod parser;
pub mod types;

pub use parser::{Links, scan_links};
pub use types::{LinkOccurrence, Span};
