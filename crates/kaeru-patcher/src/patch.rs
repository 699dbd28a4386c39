//! Per-region build pipeline.
//!
//! For each region the output tree follows the Luma3DS layout:
//!
//! ```text
//! <output>/luma/titles/<title_id>/
//! ├── code.ips
//! └── romfs/
//! ```
//!
//! The RomFS is built from `<source>/<REGION>/romfs` followed by
//! `<source>/ALL/romfs`. Either may be absent. Files from `ALL` overwrite
//! region files with the same path.

use crate::codebin::write_code_patch;
use crate::compress::Compressor;
use crate::config::{PatchConfig, Payload, Region};
use crate::error::PatcherError;
use crate::romfs::{RomfsBuilder, RomfsSummary};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source tree shared by every region
pub const SHARED_SOURCE_DIR: &str = "ALL";

/// Where a region's artifacts are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionLayout {
    /// Title directory
    pub title_dir: PathBuf,
    /// Code patch file
    pub code_patch: PathBuf,
    /// RomFS directory
    pub romfs: PathBuf,
}

impl RegionLayout {
    /// Layout under `output` for `title_id`
    pub fn new(output: &Path, title_id: &str) -> Self {
        let title_dir = output.join("luma").join("titles").join(title_id);
        Self {
            code_patch: title_dir.join("code.ips"),
            romfs: title_dir.join("romfs"),
            title_dir,
        }
    }
}

/// RomFS source directories for `region`, in application order
pub fn romfs_sources(source: &Path, region: Region) -> [PathBuf; 2] {
    [
        source.join(region.as_str()).join("romfs"),
        source.join(SHARED_SOURCE_DIR).join("romfs"),
    ]
}

/// Result of building one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    /// Region built
    pub region: Region,
    /// Output paths
    pub layout: RegionLayout,
    /// Records in the code patch
    pub patch_records: usize,
    /// RomFS work done
    pub romfs: RomfsSummary,
}

/// Builds every region from one configuration
pub struct PatchBuilder<'a> {
    config: &'a PatchConfig,
    payload: &'a Payload,
    compressor: &'a dyn Compressor,
}

impl<'a> PatchBuilder<'a> {
    /// Builder for a validated configuration and payload
    pub fn new(config: &'a PatchConfig, payload: &'a Payload, compressor: &'a dyn Compressor) -> Self {
        Self {
            config,
            payload,
            compressor,
        }
    }

    /// Build the code patch and RomFS for `region`
    pub fn build_region(
        &self,
        region: Region,
        source: &Path,
        output: &Path,
    ) -> Result<RegionReport, PatcherError> {
        let offsets = self.config.region(region)?;
        let layout = RegionLayout::new(output, &offsets.title_id);
        info!("Building {} ({})", region, offsets.title_id);

        let patch = write_code_patch(offsets, self.payload, &layout.code_patch)?;

        let romfs_builder = RomfsBuilder::new(self.compressor);
        let mut romfs = RomfsSummary::default();
        for src in romfs_sources(source, region) {
            if !src.is_dir() {
                debug!("No RomFS source at {}", src.display());
                continue;
            }
            romfs += romfs_builder.build(&src, &layout.romfs)?;
        }

        Ok(RegionReport {
            region,
            layout,
            patch_records: patch.len(),
            romfs,
        })
    }

    /// Build every region in [`Region::ALL`] order, stopping at the first error
    pub fn build_all(&self, source: &Path, output: &Path) -> Result<Vec<RegionReport>, PatcherError> {
        let reports = Region::ALL
            .into_iter()
            .map(|region| self.build_region(region, source, output))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Built {} regions into {}", reports.len(), output.display());
        Ok(reports)
    }
}
