//! Selected file entries
//!
//! A `FileEntry` is captured once at selection time and never mutated
//! afterwards. The id survives every reorder, so front ends can key rows
//! by it instead of by position.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

/// Stable identifier of an entry within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id previously handed out via `Display`
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One selected PDF with its captured bytes
#[derive(Debug, Clone)]
pub struct FileEntry {
    id: EntryId,
    name: String,
    content: Arc<[u8]>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id: EntryId::new(),
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub(crate) fn summary(&self, position: usize) -> EntrySummary {
        EntrySummary {
            position,
            id: self.id,
            name: self.name.clone(),
            size_bytes: self.size_bytes(),
        }
    }
}

/// Serializable view of an entry for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    /// Zero-based position in the merge order
    pub position: usize,
    pub id: EntryId,
    pub name: String,
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = FileEntry::new("a.pdf", b"%PDF-1.7".to_vec());
        let b = FileEntry::new("a.pdf", b"%PDF-1.7".to_vec());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_id_display_round_trips() {
        let id = EntryId::new();
        assert_eq!(EntryId::parse(&id.to_string()), Some(id));
        assert_eq!(EntryId::parse("not-an-id"), None);
    }

    #[test]
    fn test_clone_shares_content() {
        let entry = FileEntry::new("doc.pdf", vec![1u8, 2, 3]);
        let copy = entry.clone();
        assert_eq!(copy.id(), entry.id());
        assert_eq!(copy.content().as_ptr(), entry.content().as_ptr());
        assert_eq!(entry.size_bytes(), 3);
    }
}
