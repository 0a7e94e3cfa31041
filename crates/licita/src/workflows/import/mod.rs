mod parser;

use crate::workflows::tenders::domain::TenderDraft;
use std::io::Read;
use std::path::Path;

pub use parser::RowError;

#[derive(Debug)]
pub enum TenderImportError {
    Io(std::io::Error),
    Rows(RowError),
}

impl std::fmt::Display for TenderImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenderImportError::Io(err) => write!(f, "failed to read tender spreadsheet: {}", err),
            TenderImportError::Rows(err) => write!(f, "invalid tender spreadsheet data: {}", err),
        }
    }
}

impl std::error::Error for TenderImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TenderImportError::Io(err) => Some(err),
            TenderImportError::Rows(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for TenderImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<RowError> for TenderImportError {
    fn from(err: RowError) -> Self {
        Self::Rows(err)
    }
}

/// Reads registration drafts from a spreadsheet export whose headers are the tender field names.
pub struct TenderCsvImporter;

impl TenderCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<TenderDraft>, TenderImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<TenderDraft>, TenderImportError> {
        Ok(parser::parse_drafts(reader)?)
    }
}
