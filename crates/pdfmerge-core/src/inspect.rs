//! PDF inspection
//!
//! Extracts the few facts front ends show next to a selected file.

use lopdf::Document;
use serde::Serialize;

use crate::error::{MergeError, Result};

/// Facts about a parsed PDF
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// Header version string (e.g., "1.7")
    pub version: String,
    pub encrypted: bool,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Parse `bytes` and describe the document
pub fn inspect(bytes: &[u8]) -> Result<DocumentInfo> {
    check_header(bytes)?;

    let document = Document::load_mem(bytes).map_err(|e| MergeError::ParseError(e.to_string()))?;

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(MergeError::ParseError("PDF has no pages".into()));
    }

    let (title, author) = extract_metadata(&document);

    Ok(DocumentInfo {
        page_count,
        version: extract_version(bytes),
        encrypted: document.is_encrypted(),
        size_bytes: bytes.len(),
        title,
        author,
    })
}

/// Page count of a PDF buffer
pub fn page_count(bytes: &[u8]) -> Result<u32> {
    let document = Document::load_mem(bytes).map_err(|e| MergeError::ParseError(e.to_string()))?;
    Ok(document.get_pages().len() as u32)
}

/// Header and trailer check without parsing (for large files)
pub fn quick_validate(bytes: &[u8]) -> Result<()> {
    check_header(bytes)?;

    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };

    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(MergeError::ParseError(
            "PDF appears truncated (missing %%EOF marker)".into(),
        ));
    }

    Ok(())
}

fn check_header(bytes: &[u8]) -> Result<()> {
    if bytes.len() < 8 {
        return Err(MergeError::ParseError(
            "file too small to be a valid PDF".into(),
        ));
    }
    if !bytes.starts_with(b"%PDF-") {
        return Err(MergeError::ParseError("missing %PDF- header".into()));
    }
    Ok(())
}

fn extract_version(bytes: &[u8]) -> String {
    bytes
        .get(5..8)
        .and_then(|v| std::str::from_utf8(v).ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "1.4".to_string())
}

fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let Ok(info) = document
        .trailer
        .get(b"Info")
        .and_then(lopdf::Object::as_reference)
        .and_then(|id| document.get_dictionary(id))
    else {
        return (None, None);
    };

    let text = |key: &[u8]| {
        info.get(key)
            .and_then(lopdf::Object::as_str)
            .ok()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .filter(|s| !s.is_empty())
    };

    (text(b"Title"), text(b"Author"))
}
