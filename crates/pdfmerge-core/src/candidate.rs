//! Files offered for selection
//!
//! A candidate declares a media type and a name, and can be read into
//! memory. Only candidates declaring `application/pdf` are accepted by the
//! collection; everything else is dropped before any read happens.

use std::io;
use std::path::{Path, PathBuf};

/// Media type of PDF documents
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Media type declared for anything that is not recognizably a PDF
pub const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// Something the user offered for selection
pub trait Candidate {
    /// Media type as declared by the source (picker, drop, file extension)
    fn media_type(&self) -> &str;

    /// Original file name
    fn name(&self) -> &str;

    /// Read the full content into memory
    fn read(&self) -> io::Result<Vec<u8>>;

    /// Upper bound on the content length, if the source knows it up front
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

impl<T: Candidate + ?Sized> Candidate for &T {
    fn media_type(&self) -> &str {
        (**self).media_type()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        (**self).read()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

/// True if the declared media type identifies a PDF document
pub fn is_pdf_media_type(media_type: &str) -> bool {
    media_type.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE)
}

/// Declared media type for a path, derived from its extension
pub fn media_type_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MEDIA_TYPE,
        _ => OCTET_STREAM_MEDIA_TYPE,
    }
}

/// A file on the local filesystem
#[derive(Debug, Clone)]
pub struct PathCandidate {
    path: PathBuf,
    name: String,
    media_type: &'static str,
}

impl PathCandidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let media_type = media_type_for_path(&path);
        Self {
            path,
            name,
            media_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Candidate for PathCandidate {
    fn media_type(&self) -> &str {
        self.media_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn size_hint(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }
}

/// A file whose bytes are already in memory (handed over by a browser)
#[derive(Debug, Clone)]
pub struct MemoryCandidate {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl MemoryCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Shorthand for a candidate declaring `application/pdf`
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, PDF_MEDIA_TYPE, bytes)
    }
}

impl Candidate for MemoryCandidate {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.bytes.len() as u64)
    }
}
