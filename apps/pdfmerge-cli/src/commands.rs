//! One-shot `merge` and `info` commands

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use pdfmerge_core::{
    check_permutation, inspect, merge_collection, AddReport, DocumentInfo, FileCollection,
    MergeConfig, MergeExecutor, MergedDocument, PathCandidate, SkipReason,
    EMPTY_COLLECTION_NOTICE, MERGE_FAILED_NOTICE,
};
use serde::Serialize;
use tracing::info;

/// Add every path to `collection`, logging what was passed over
pub fn add_paths(collection: &mut FileCollection, files: &[PathBuf]) -> AddReport {
    let report = collection.add(files.iter().map(PathCandidate::new));
    for skipped in &report.skipped {
        match &skipped.reason {
            SkipReason::UnsupportedMediaType(_) => {
                info!("Ignoring {}: not a PDF", skipped.name)
            }
            SkipReason::ReadFailed(e) => info!("Skipping {}: could not read ({})", skipped.name, e),
            SkipReason::TooLarge { size, limit } => info!(
                "Skipping {}: {} bytes exceeds the {} byte limit",
                skipped.name, size, limit
            ),
        }
    }
    report
}

/// Human-readable lines describing the skipped part of an add report
pub fn describe_skipped(report: &AddReport) -> Vec<String> {
    report
        .skipped
        .iter()
        .map(|s| match &s.reason {
            SkipReason::UnsupportedMediaType(_) => format!("Skipped {}: not a PDF", s.name),
            SkipReason::ReadFailed(e) => format!("Skipped {}: could not read ({})", s.name, e),
            SkipReason::TooLarge { limit, .. } => {
                format!("Skipped {}: larger than {} bytes", s.name, limit)
            }
        })
        .collect()
}

/// Convert 1-based positions to the 0-based permutation the collection takes
pub fn permutation_from_positions(positions: &[usize]) -> anyhow::Result<Vec<usize>> {
    positions
        .iter()
        .map(|&p| {
            p.checked_sub(1)
                .with_context(|| format!("positions start at 1, got {}", p))
        })
        .collect()
}

/// Reorder the input list by 1-based positions into that list
///
/// Runs before any filtering, so a position always names the file the user
/// typed in that slot. Inputs that are later skipped simply drop out.
pub fn order_inputs(files: &[PathBuf], positions: &[usize]) -> anyhow::Result<Vec<PathBuf>> {
    let permutation = permutation_from_positions(positions)?;
    check_permutation(&permutation, files.len())?;
    Ok(permutation.iter().map(|&i| files[i].clone()).collect())
}

/// Write a merged document next to (or into) the configured output directory
pub fn write_merged(
    config: &MergeConfig,
    output_name: Option<&str>,
    merged: &MergedDocument,
) -> anyhow::Result<PathBuf> {
    let path = config.output_path(output_name);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, merged.bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// `pdfmerge merge`
pub fn run_merge<E, W>(
    config: &MergeConfig,
    executor: &E,
    files: &[PathBuf],
    output_name: Option<&str>,
    order: Option<&[usize]>,
    out: &mut W,
) -> anyhow::Result<PathBuf>
where
    E: MergeExecutor + ?Sized,
    W: Write,
{
    let inputs = match order {
        Some(order) => order_inputs(files, order).context("Invalid --order")?,
        None => files.to_vec(),
    };

    let mut collection = config.new_collection();
    let report = add_paths(&mut collection, &inputs);
    for line in describe_skipped(&report) {
        writeln!(out, "{}", line)?;
    }

    if collection.is_empty() {
        bail!(EMPTY_COLLECTION_NOTICE);
    }

    let merged = merge_collection(&collection, executor).context(MERGE_FAILED_NOTICE)?;
    let path = write_merged(config, output_name, &merged)?;

    writeln!(
        out,
        "Merged {} files into {} ({} bytes)",
        merged.source_count(),
        path.display(),
        merged.size_bytes()
    )?;
    Ok(path)
}

#[derive(Debug, Serialize)]
struct InfoRow {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<DocumentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn inspect_path(path: &Path) -> InfoRow {
    let file = path.display().to_string();
    let result = fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| inspect(&bytes).map_err(|e| e.to_string()));
    match result {
        Ok(info) => InfoRow {
            file,
            info: Some(info),
            error: None,
        },
        Err(e) => InfoRow {
            file,
            info: None,
            error: Some(e),
        },
    }
}

/// `pdfmerge info`
pub fn run_info<W: Write>(files: &[PathBuf], json: bool, out: &mut W) -> anyhow::Result<()> {
    let rows: Vec<InfoRow> = files.iter().map(|p| inspect_path(p)).collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
        return Ok(());
    }

    for row in &rows {
        match (&row.info, &row.error) {
            (Some(info), _) => writeln!(
                out,
                "{}: {} pages, PDF {}, {} bytes{}",
                row.file,
                info.page_count,
                info.version,
                info.size_bytes,
                if info.encrypted { ", encrypted" } else { "" }
            )?,
            (None, Some(e)) => writeln!(out, "{}: {}", row.file, e)?,
            (None, None) => writeln!(out, "{}: unknown", row.file)?,
        }
    }
    Ok(())
}
