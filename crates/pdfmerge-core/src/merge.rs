//! Merge invocation
//!
//! Thin sequencing wrapper between a collection and an executor: checks the
//! precondition, hands over the buffers in collection order, and converts
//! executor failures into `MergeError::MergeExecution`.

use tracing::{error, info};

use crate::collection::FileCollection;
use crate::error::{MergeError, Result};
use crate::executor::MergeExecutor;
use crate::inspect;

/// Shown when a merge is requested with nothing selected
pub const EMPTY_COLLECTION_NOTICE: &str = "Please add at least one PDF file.";

/// Shown when the executor fails
pub const MERGE_FAILED_NOTICE: &str = "An error occurred while merging the PDFs. Please try again.";

/// A merged PDF ready to be written out
#[derive(Debug, Clone)]
pub struct MergedDocument {
    bytes: Vec<u8>,
    source_count: usize,
}

impl MergedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of input documents that went into the merge
    pub fn source_count(&self) -> usize {
        self.source_count
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Parse the output and count its pages
    pub fn page_count(&self) -> Result<u32> {
        inspect::page_count(&self.bytes)
    }
}

/// Merge every entry of `collection`, in order
///
/// An empty collection fails with `EmptyCollection` before the executor is
/// touched. The collection is only borrowed, so it is unchanged whatever the
/// outcome.
pub fn merge_collection<E>(collection: &FileCollection, executor: &E) -> Result<MergedDocument>
where
    E: MergeExecutor + ?Sized,
{
    if collection.is_empty() {
        return Err(MergeError::EmptyCollection);
    }

    let documents: Vec<&[u8]> = collection.iter().map(|e| e.content()).collect();
    info!(
        "Merging {} documents ({} bytes)",
        documents.len(),
        collection.total_size()
    );

    let bytes = executor.merge(&documents).map_err(|e| {
        error!("Error merging PDFs: {}", e);
        match e {
            MergeError::MergeExecution(msg) => MergeError::MergeExecution(msg),
            other => MergeError::MergeExecution(other.to_string()),
        }
    })?;

    info!("Merged output is {} bytes", bytes.len());

    Ok(MergedDocument {
        bytes,
        source_count: documents.len(),
    })
}
