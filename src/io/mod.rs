pub mod csv;
pub mod journal;
pub mod json;

pub use journal::{Journal, JournalColumns, JournalRow};
