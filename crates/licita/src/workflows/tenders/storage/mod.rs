mod json_file;
mod sqlite;

pub use json_file::{JsonFileStore, LISTS_KEY, TENDERS_KEY};
pub use sqlite::{SqliteTenderStore, LISTS_TABLE, TENDERS_TABLE};
