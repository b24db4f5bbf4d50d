//! Ordered file collection
//!
//! The sequence order is exactly the order in which pages are merged.
//! Positional operations use "splice out, splice in" semantics; id-based
//! operations resolve the id against the current sequence at call time, so
//! a front end never acts on a position captured before a reorder.

use tracing::{debug, warn};

use crate::candidate::{is_pdf_media_type, Candidate};
use crate::entry::{EntryId, EntrySummary, FileEntry};
use crate::error::{MergeError, Result};

/// Why a candidate was not added
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Declared media type is not `application/pdf`
    UnsupportedMediaType(String),
    /// Content could not be read
    ReadFailed(String),
    /// Content exceeds the configured size ceiling
    TooLarge { size: u64, limit: u64 },
}

/// A candidate that `add` passed over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub name: String,
    pub reason: SkipReason,
}

/// Outcome of an `add` call; informational, never an error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    /// Ids of appended entries, in arrival order
    pub added: Vec<EntryId>,
    pub skipped: Vec<SkippedCandidate>,
}

impl AddReport {
    /// Candidates dropped because they could not be read (or were too large)
    pub fn read_failures(&self) -> impl Iterator<Item = &SkippedCandidate> {
        self.skipped
            .iter()
            .filter(|s| !matches!(s.reason, SkipReason::UnsupportedMediaType(_)))
    }
}

/// The user's selected PDFs in merge order
#[derive(Debug, Clone, Default)]
pub struct FileCollection {
    entries: Vec<FileEntry>,
    max_file_size: Option<u64>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection that skips candidates larger than `limit` bytes
    pub fn with_max_file_size(limit: u64) -> Self {
        Self {
            entries: Vec::new(),
            max_file_size: Some(limit),
        }
    }

    /// Filter, read and append candidates in arrival order
    ///
    /// Non-PDF candidates are skipped without being read. A candidate that
    /// fails to read is skipped and does not stop the rest of the batch.
    pub fn add<I>(&mut self, candidates: I) -> AddReport
    where
        I: IntoIterator,
        I::Item: Candidate,
    {
        let mut report = AddReport::default();

        for candidate in candidates {
            let name = candidate.name().to_string();

            if !is_pdf_media_type(candidate.media_type()) {
                debug!(
                    "Ignoring {} (media type {:?})",
                    name,
                    candidate.media_type()
                );
                report.skipped.push(SkippedCandidate {
                    name,
                    reason: SkipReason::UnsupportedMediaType(candidate.media_type().to_string()),
                });
                continue;
            }

            if let Some(reason) = self.oversize(candidate.size_hint()) {
                warn!("Skipping {}: too large", name);
                report.skipped.push(SkippedCandidate { name, reason });
                continue;
            }

            let bytes = match candidate.read() {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping {}: {}", name, e);
                    report.skipped.push(SkippedCandidate {
                        name,
                        reason: SkipReason::ReadFailed(e.to_string()),
                    });
                    continue;
                }
            };

            if let Some(reason) = self.oversize(Some(bytes.len() as u64)) {
                warn!("Skipping {}: too large", name);
                report.skipped.push(SkippedCandidate { name, reason });
                continue;
            }

            let entry = FileEntry::new(name, bytes);
            debug!(
                "Added {} ({} bytes) as {}",
                entry.name(),
                entry.size_bytes(),
                entry.id()
            );
            report.added.push(entry.id());
            self.entries.push(entry);
        }

        report
    }

    fn oversize(&self, size: Option<u64>) -> Option<SkipReason> {
        match (self.max_file_size, size) {
            (Some(limit), Some(size)) if size > limit => Some(SkipReason::TooLarge { size, limit }),
            _ => None,
        }
    }

    /// Append an already captured entry
    pub fn push(&mut self, entry: FileEntry) -> Result<EntryId> {
        let id = entry.id();
        if self.position_of(id).is_some() {
            return Err(MergeError::DuplicateEntry(id));
        }
        self.entries.push(entry);
        Ok(id)
    }

    /// Remove and return the entry at `index`, shifting later entries left
    pub fn remove_at(&mut self, index: usize) -> Result<FileEntry> {
        self.check_index(index)?;
        Ok(self.entries.remove(index))
    }

    /// Move the entry at `from` so that it ends up at `to`
    ///
    /// `to` is interpreted against the sequence after the entry has been
    /// taken out, so moving forward lands the entry after the one that
    /// previously held `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        if from == to {
            return Ok(());
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Apply a full permutation: `new_order[i]` is the current position of
    /// the entry that should end up at position `i`
    pub fn reorder(&mut self, new_order: &[usize]) -> Result<()> {
        check_permutation(new_order, self.entries.len())?;

        let mut slots: Vec<Option<FileEntry>> = self.entries.drain(..).map(Some).collect();
        self.entries = new_order
            .iter()
            .filter_map(|&idx| slots[idx].take())
            .collect();
        Ok(())
    }

    /// Current position of the entry with `id`
    pub fn position_of(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn get(&self, id: EntryId) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Remove the entry with `id`, wherever it currently is
    pub fn remove(&mut self, id: EntryId) -> Result<FileEntry> {
        let index = self.resolve(id)?;
        self.remove_at(index)
    }

    /// Move the entry with `id` to position `to`
    pub fn move_entry(&mut self, id: EntryId, to: usize) -> Result<()> {
        let from = self.resolve(id)?;
        self.move_to(from, to)
    }

    /// Drop `dragged` onto the row currently showing `target`
    ///
    /// Both positions come from the sequence as it is now, not from
    /// whatever the front end last rendered.
    pub fn drop_onto(&mut self, dragged: EntryId, target: EntryId) -> Result<()> {
        let from = self.resolve(dragged)?;
        let to = self.resolve(target)?;
        self.move_to(from, to)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_at(&self, index: usize) -> Option<&FileEntry> {
        self.entries.get(index)
    }

    /// Entries in merge order
    pub fn to_sequence(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }

    /// Sum of captured content lengths
    pub fn total_size(&self) -> usize {
        self.entries.iter().map(FileEntry::size_bytes).sum()
    }

    pub fn summaries(&self) -> Vec<EntrySummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| e.summary(i))
            .collect()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(MergeError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(())
    }

    fn resolve(&self, id: EntryId) -> Result<usize> {
        self.position_of(id).ok_or(MergeError::UnknownEntry(id))
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Check that `new_order` names every position in `0..len` exactly once
pub fn check_permutation(new_order: &[usize], len: usize) -> Result<()> {
    if new_order.len() != len {
        return Err(MergeError::InvalidOrder(format!(
            "expected {} indices, got {}",
            len,
            new_order.len()
        )));
    }

    let mut seen = vec![false; len];
    for &idx in new_order {
        if idx >= len {
            return Err(MergeError::InvalidOrder(format!(
                "index {} out of bounds",
                idx
            )));
        }
        if seen[idx] {
            return Err(MergeError::InvalidOrder(format!("duplicate index {}", idx)));
        }
        seen[idx] = true;
    }
    Ok(())
}
