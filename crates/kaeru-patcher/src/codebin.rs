//! Code image patches.
//!
//! Each regional release gets an IPS patch that:
//! - stores the replacement certificate sizes as little-endian `u32`s
//! - clears the branch into the NASC login check
//! - overwrites both certificates and zero fills the rest of their space
//! - overwrites the gallery URL and zero fills the rest of its space

use crate::config::{Payload, RegionConfig};
use crate::error::PatcherError;
use crate::output::write_atomic;
use kaeru_formats::ips::IpsPatch;
use std::path::Path;
use tracing::debug;

/// Bytes written over the NASC branch instruction
pub const NASC_BRANCH_PATCH: [u8; 4] = [0; 4];

/// Build the code patch for one region
pub fn build_code_patch(region: &RegionConfig, payload: &Payload) -> IpsPatch {
    let cert_a_len = payload.cert_a.len();
    let cert_b_len = payload.cert_b.len();
    let url = payload.gallery_url.as_bytes();

    let mut patch = IpsPatch::new();
    patch.add_record(region.cert_a_size, (cert_a_len as u32).to_le_bytes());
    // Full certificate length, not length - 148
    patch.add_record(region.cert_b_size, (cert_b_len as u32).to_le_bytes());
    patch.add_record(region.nasc_branch, NASC_BRANCH_PATCH);

    patch.add_chunked(region.cert_a_data, &payload.cert_a);
    patch.add_chunked(region.cert_b_data, &payload.cert_b);
    zero_fill(
        &mut patch,
        region.cert_a_data,
        cert_a_len,
        payload.cert_a_size_max,
    );
    zero_fill(
        &mut patch,
        region.cert_b_data,
        cert_b_len,
        payload.cert_b_size_max,
    );

    patch.add_chunked(region.gallery_url, url);
    zero_fill(
        &mut patch,
        region.gallery_url,
        url.len(),
        payload.gallery_url_size_max,
    );

    patch
}

/// Zero the space between `used` and `max` bytes past `offset`
fn zero_fill(patch: &mut IpsPatch, offset: u32, used: usize, max: usize) {
    let fill = max.saturating_sub(used);
    if fill > 0 {
        patch.add_chunked(offset.saturating_add(used as u32), &vec![0u8; fill]);
    }
}

/// Build the code patch for one region and write it to `path`
pub fn write_code_patch(
    region: &RegionConfig,
    payload: &Payload,
    path: &Path,
) -> Result<IpsPatch, PatcherError> {
    let patch = build_code_patch(region, payload);
    let data = patch.build().map_err(|source| PatcherError::Ips {
        path: path.to_path_buf(),
        source,
    })?;
    write_atomic(path, &data)?;
    debug!(
        "Wrote {} records ({} bytes) to {}",
        patch.len(),
        data.len(),
        path.display()
    );
    Ok(patch)
}
