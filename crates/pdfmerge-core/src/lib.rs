//! Ordered PDF collection and merge
//!
//! This crate keeps the user's selected PDFs in merge order and combines
//! them into one document through a pluggable [`MergeExecutor`].
//!
//! - [`FileCollection`]: append, remove and move entries by position or id
//! - [`LopdfExecutor`]: page-concatenating merge using lopdf
//! - [`merge_collection`]: run an executor over a collection
//! - [`output_filename`]: name of the merged download

pub mod candidate;
pub mod collection;
pub mod config;
pub mod entry;
pub mod error;
pub mod executor;
pub mod inspect;
pub mod merge;
pub mod output;

pub use candidate::{Candidate, MemoryCandidate, PathCandidate, PDF_MEDIA_TYPE};
pub use collection::{check_permutation, AddReport, FileCollection, SkipReason, SkippedCandidate};
pub use config::MergeConfig;
pub use entry::{EntryId, EntrySummary, FileEntry};
pub use error::{MergeError, Result};
pub use executor::{LopdfExecutor, MergeExecutor};
pub use inspect::{inspect, DocumentInfo};
pub use merge::{
    merge_collection, MergedDocument, EMPTY_COLLECTION_NOTICE, MERGE_FAILED_NOTICE,
};
pub use output::{output_filename, DEFAULT_BASE_NAME};
