//! Output file naming

/// Base name used when the user leaves the name blank
pub const DEFAULT_BASE_NAME: &str = "merged-document";

const MAX_BASE_NAME_CHARS: usize = 200;

/// File name for the merged download
///
/// Blank input falls back to `merged-document.pdf`; anything else becomes
/// `<name>.pdf` after sanitizing. The typed name is not used verbatim:
/// separators and reserved characters become `_`, and a name that already
/// ends in `.pdf` keeps a single suffix, so `report.pdf` stays `report.pdf`
/// rather than `report.pdf.pdf`.
pub fn output_filename(user_name: Option<&str>) -> String {
    output_filename_or(user_name, DEFAULT_BASE_NAME)
}

/// Like [`output_filename`] with a configurable fallback base name
pub fn output_filename_or(user_name: Option<&str>, fallback: &str) -> String {
    let base = user_name
        .map(sanitize_base_name)
        .filter(|name| !name.is_empty())
        .or_else(|| Some(sanitize_base_name(fallback)).filter(|name| !name.is_empty()))
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());

    format!("{}.pdf", base)
}

/// Strip separators, reserved and control characters, and a trailing `.pdf`
pub fn sanitize_base_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => Some('_'),
            '\0'..='\x1f' | '\x7f' => None,
            c => Some(c),
        })
        .collect();

    let mut trimmed = sanitized.trim();
    let suffix_start = trimmed.len().saturating_sub(4);
    if trimmed
        .get(suffix_start..)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"))
    {
        trimmed = &trimmed[..suffix_start];
    }
    let trimmed = trimmed.trim().trim_matches('.');

    match trimmed.char_indices().nth(MAX_BASE_NAME_CHARS) {
        Some((end, _)) => trimmed[..end].to_string(),
        None => trimmed.to_string(),
    }
}
