pub mod import;
pub mod tenders;
