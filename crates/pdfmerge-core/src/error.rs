use thiserror::Error;

use crate::entry::EntryId;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Index {index} is out of range (collection has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No entry with id {0}")]
    UnknownEntry(EntryId),

    #[error("Entry {0} is already in the collection")]
    DuplicateEntry(EntryId),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("No documents to merge")]
    EmptyCollection,

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF merge failed: {0}")]
    MergeExecution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MergeError>;
