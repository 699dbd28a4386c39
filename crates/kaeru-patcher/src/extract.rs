//! Unpacking archives and patches for inspection.
//!
//! Archives extract to one file per entry. String tables are written as
//! editable `.msbt.json` documents, so an extracted archive directory can be
//! dropped back into a RomFS source tree unchanged.

use crate::error::PatcherError;
use crate::output::{ensure_dir, read_file, write_atomic};
use kaeru_formats::darc::DarcArchive;
use kaeru_formats::ips::IpsPatch;
use kaeru_formats::msbt::{Msbt, MsbtDocument};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Counts of what an extraction wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Entries written unchanged
    pub files: usize,
    /// String tables converted to documents
    pub documents: usize,
}

/// Extract every entry of `archive` into `out_dir`.
///
/// `.msbt` entries are written as `<name>.json` documents.
pub fn extract_archive(archive: &DarcArchive, out_dir: &Path) -> Result<ExtractSummary, PatcherError> {
    ensure_dir(out_dir)?;
    let mut summary = ExtractSummary::default();

    for entry in &archive.entries {
        check_entry_name(&entry.name)?;

        if entry.name.ends_with(".msbt") {
            let path = out_dir.join(format!("{}.json", entry.name));
            let table = Msbt::parse(&entry.data).map_err(|source| PatcherError::Msbt {
                path: path.clone(),
                source,
            })?;
            let json = MsbtDocument::from(&table)
                .to_json()
                .map_err(|source| PatcherError::Msbt {
                    path: path.clone(),
                    source,
                })?;
            write_atomic(&path, json.as_bytes())?;
            debug!("Converted {} to {}", entry.name, path.display());
            summary.documents += 1;
        } else {
            write_atomic(&out_dir.join(&entry.name), &entry.data)?;
            summary.files += 1;
        }
    }

    info!(
        "Extracted {} entries to {}",
        archive.entries.len(),
        out_dir.display()
    );
    Ok(summary)
}

/// Read and parse the archive at `path`
pub fn read_archive(path: &Path) -> Result<DarcArchive, PatcherError> {
    let data = read_file(path)?;
    DarcArchive::parse(&data).map_err(|source| PatcherError::Darc {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and extract the archive at `path`
pub fn extract_archive_file(path: &Path, out_dir: &Path) -> Result<ExtractSummary, PatcherError> {
    extract_archive(&read_archive(path)?, out_dir)
}

/// Write each record of `patch` to `out_dir` as a separate file.
///
/// Files are named after the record offset and length.
pub fn dump_patch(patch: &IpsPatch, out_dir: &Path) -> Result<Vec<PathBuf>, PatcherError> {
    ensure_dir(out_dir)?;
    let mut written = Vec::with_capacity(patch.len());

    for record in &patch.records {
        let path = out_dir.join(record.dump_name());
        write_atomic(&path, &record.data)?;
        written.push(path);
    }

    info!("Dumped {} records to {}", written.len(), out_dir.display());
    Ok(written)
}

/// Read the patch at `path` and dump its records
pub fn dump_patch_file(path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, PatcherError> {
    let data = read_file(path)?;
    let patch = IpsPatch::parse(&data).map_err(|source| PatcherError::Ips {
        path: path.to_path_buf(),
        source,
    })?;
    dump_patch(&patch, out_dir)
}

/// Entry names must be a single plain path component
fn check_entry_name(name: &str) -> Result<(), PatcherError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(PatcherError::UnsafeEntryName(name.to_string()));
    }
    Ok(())
}
