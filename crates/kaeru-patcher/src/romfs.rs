//! RomFS tree building.
//!
//! A source tree is mirrored into the output RomFS:
//! - files are copied
//! - directories named `*.arc` or `*.blz` become DARC archives of their
//!   direct children, sorted by name
//! - `*.msbt.json` children of an archive directory are compiled to `.msbt`
//!   entries
//! - `*.blz` archives are compressed before they reach their final path
//! - any other directory is recreated and walked recursively

use crate::compress::Compressor;
use crate::error::PatcherError;
use crate::output::{ensure_dir, read_file, write_atomic, write_atomic_with};
use kaeru_formats::darc::DarcBuilder;
use kaeru_formats::msbt::{Msbt, MsbtDocument};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Suffix of archive directories that are packed as-is
pub const ARCHIVE_SUFFIX: &str = ".arc";
/// Suffix of archive directories that are packed then compressed
pub const COMPRESSED_ARCHIVE_SUFFIX: &str = ".blz";
/// Suffix of string table documents compiled into archives
pub const MSBT_JSON_SUFFIX: &str = ".msbt.json";

/// How a source path is turned into output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Copied unchanged
    File,
    /// Packed into a DARC archive
    Archive {
        /// Compress the archive after writing it
        compress: bool,
    },
    /// Recreated and walked
    Directory,
}

impl SourceKind {
    /// Classify a source path by type and name
    pub fn of(path: &Path, is_dir: bool) -> Self {
        if !is_dir {
            return Self::File;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.ends_with(COMPRESSED_ARCHIVE_SUFFIX) {
            Self::Archive { compress: true }
        } else if name.ends_with(ARCHIVE_SUFFIX) {
            Self::Archive { compress: false }
        } else {
            Self::Directory
        }
    }
}

/// Counts of what a build produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RomfsSummary {
    /// Files copied unchanged
    pub files_copied: usize,
    /// Archives written
    pub archives_built: usize,
    /// Archives compressed
    pub archives_compressed: usize,
    /// String tables compiled from documents
    pub string_tables: usize,
}

impl AddAssign for RomfsSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.files_copied += rhs.files_copied;
        self.archives_built += rhs.archives_built;
        self.archives_compressed += rhs.archives_compressed;
        self.string_tables += rhs.string_tables;
    }
}

/// Builds RomFS output trees.
///
/// Archives and string tables are written little-endian.
pub struct RomfsBuilder<'a> {
    compressor: &'a dyn Compressor,
}

impl<'a> RomfsBuilder<'a> {
    /// Builder compressing `.blz` archives with `compressor`
    pub fn new(compressor: &'a dyn Compressor) -> Self {
        Self { compressor }
    }

    /// Mirror `src` into `dst`
    pub fn build(&self, src: &Path, dst: &Path) -> Result<RomfsSummary, PatcherError> {
        let metadata = src.metadata().map_err(|e| PatcherError::io(src, e))?;
        let mut summary = RomfsSummary::default();

        match SourceKind::of(src, metadata.is_dir()) {
            SourceKind::File => {
                let data = read_file(src)?;
                write_atomic(dst, &data)?;
                summary.files_copied += 1;
            }
            SourceKind::Archive { compress } => {
                let (data, string_tables) = self.pack_archive(src)?;
                if compress {
                    write_atomic_with(dst, &data, |temp| {
                        Ok(self.compressor.compress_in_place(temp)?)
                    })?;
                    summary.archives_compressed += 1;
                } else {
                    write_atomic(dst, &data)?;
                }
                summary.archives_built += 1;
                summary.string_tables += string_tables;
                info!("Built archive {} ({} bytes)", dst.display(), data.len());
            }
            SourceKind::Directory => {
                ensure_dir(dst)?;
                for child in sorted_children(src)? {
                    let Some(name) = child.file_name() else {
                        continue;
                    };
                    summary += self.build(&child, &dst.join(name))?;
                }
            }
        }

        Ok(summary)
    }

    /// Pack the direct children of `dir` into archive bytes.
    ///
    /// Returns the archive and the number of string tables compiled.
    pub fn pack_archive(&self, dir: &Path) -> Result<(Vec<u8>, usize), PatcherError> {
        let mut builder = DarcBuilder::new();
        let mut string_tables = 0;

        for child in sorted_children(dir)? {
            if child.is_dir() {
                return Err(PatcherError::NestedArchiveDirectory(child));
            }
            let name = child
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| PatcherError::NonUtf8Path(child.clone()))?;

            let (entry_name, data) = if let Some(stem) = name.strip_suffix(".json")
                && name.ends_with(MSBT_JSON_SUFFIX)
            {
                string_tables += 1;
                (stem.to_string(), self.compile_string_table(&child)?)
            } else {
                (name.to_string(), read_file(&child)?)
            };

            debug!("Adding {} ({} bytes) to {}", entry_name, data.len(), dir.display());
            builder = builder.add_entry(entry_name, data);
        }

        let data = builder.build().map_err(|source| PatcherError::Darc {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok((data, string_tables))
    }

    /// Compile a `.msbt.json` document into string table bytes
    pub fn compile_string_table(&self, path: &Path) -> Result<Vec<u8>, PatcherError> {
        let msbt_error = |source| PatcherError::Msbt {
            path: path.to_path_buf(),
            source,
        };

        let text = std::fs::read_to_string(path).map_err(|e| PatcherError::io(path, e))?;
        let document = MsbtDocument::from_json(&text).map_err(msbt_error)?;
        Msbt::from(document).build().map_err(msbt_error)
    }
}

/// Direct children of `dir`, sorted by file name
fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>, PatcherError> {
    let mut children = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let file_type = entry.file_type();
        if file_type.is_file() || file_type.is_dir() {
            children.push(entry.into_path());
        } else {
            warn!("Ignoring {}: not a regular file or directory", entry.path().display());
        }
    }
    Ok(children)
}
