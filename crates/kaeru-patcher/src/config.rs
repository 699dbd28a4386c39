//! Patch configuration loading and validation.
//!
//! Configuration is a TOML file with a `[setup]` table holding the
//! replacement certificates and URL, plus one `[regions.<REGION>]` table of
//! code offsets for each supported release of the application.
//!
//! # Example
//!
//! ```toml
//! [setup]
//! cert_a_path = "certs/a.der"
//! cert_b_path = "certs/b.der"
//! cert_a_size_max = 1024
//! cert_b_size_max = 1024
//! gallery_url = "https://example.net/"
//! gallery_url_size_max = 64
//!
//! [regions.EUR]
//! title_id = "0004000000100000"
//! cert_a_size = 0x1000
//! cert_b_size = 0x1004
//! nasc_branch = 0x2000
//! cert_a_data = 0x3000
//! cert_b_data = 0x3400
//! gallery_url = 0x3800
//! ```
//!
//! Certificate paths are resolved relative to the configuration file.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Regional release of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    /// Europe
    Eur,
    /// North America
    Usa,
    /// Japan
    Jpn,
}

impl Region {
    /// Regions in build order
    pub const ALL: [Self; 3] = [Self::Eur, Self::Usa, Self::Jpn];

    /// Name used in the configuration and the source tree
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usa => "USA",
            Self::Jpn => "JPN",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared replacement data
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupConfig {
    /// Certificate A file
    pub cert_a_path: PathBuf,
    /// Certificate B file
    pub cert_b_path: PathBuf,
    /// Space reserved for certificate A in the code image
    pub cert_a_size_max: usize,
    /// Space reserved for certificate B in the code image
    pub cert_b_size_max: usize,
    /// Replacement gallery URL
    pub gallery_url: String,
    /// Space reserved for the gallery URL in the code image
    pub gallery_url_size_max: usize,
}

/// Code offsets for one regional release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionConfig {
    /// Title ID naming the output directory
    pub title_id: String,
    /// Offset of the certificate A size field
    pub cert_a_size: u32,
    /// Offset of the certificate B size field
    pub cert_b_size: u32,
    /// Offset of the branch into the NASC check
    pub nasc_branch: u32,
    /// Offset of the certificate A data
    pub cert_a_data: u32,
    /// Offset of the certificate B data
    pub cert_b_data: u32,
    /// Offset of the gallery URL
    pub gallery_url: u32,
}

/// Parsed configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct PatchConfig {
    /// Shared replacement data
    pub setup: SetupConfig,
    /// Region tables keyed by region name
    #[serde(default)]
    pub regions: BTreeMap<String, RegionConfig>,
}

/// Certificates and URL ready to splice into the code image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Certificate A bytes
    pub cert_a: Vec<u8>,
    /// Certificate B bytes
    pub cert_b: Vec<u8>,
    /// Space reserved for certificate A
    pub cert_a_size_max: usize,
    /// Space reserved for certificate B
    pub cert_b_size_max: usize,
    /// Gallery URL
    pub gallery_url: String,
    /// Space reserved for the gallery URL
    pub gallery_url_size_max: usize,
}

impl Payload {
    /// Check certificate sizes and the URL against their reserved space
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cert_a.len() > self.cert_a_size_max {
            return Err(ConfigError::CertificateTooLarge {
                name: "cert A",
                size: self.cert_a.len(),
                max: self.cert_a_size_max,
            });
        }
        if self.cert_b.len() > self.cert_b_size_max {
            return Err(ConfigError::CertificateTooLarge {
                name: "cert B",
                size: self.cert_b.len(),
                max: self.cert_b_size_max,
            });
        }
        if !self.gallery_url.is_ascii() {
            return Err(ConfigError::UrlNotAscii(self.gallery_url.clone()));
        }
        if self.gallery_url.len() > self.gallery_url_size_max {
            return Err(ConfigError::UrlTooLong {
                len: self.gallery_url.len(),
                max: self.gallery_url_size_max,
            });
        }
        Ok(())
    }
}

impl PatchConfig {
    /// Parse and validate configuration text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Check that every region is present and usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for region in Region::ALL {
            let table = self.region(region)?;
            let title_id = &table.title_id;
            if title_id.is_empty() || !title_id.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(ConfigError::InvalidTitleId {
                    region,
                    title_id: title_id.clone(),
                });
            }
        }

        for name in self.regions.keys() {
            if !Region::ALL.iter().any(|r| r.as_str() == name) {
                warn!("Ignoring unknown region table [regions.{name}]");
            }
        }
        Ok(())
    }

    /// Offsets for `region`
    pub fn region(&self, region: Region) -> Result<&RegionConfig, ConfigError> {
        self.regions
            .get(region.as_str())
            .ok_or(ConfigError::MissingRegion(region))
    }

    /// Read the certificates, resolving relative paths against `base_dir`,
    /// and validate the payload.
    pub fn load_payload(&self, base_dir: &Path) -> Result<Payload, ConfigError> {
        let read = |path: &Path| {
            let path = base_dir.join(path);
            fs::read(&path).map_err(|source| ConfigError::Read { path, source })
        };

        let payload = Payload {
            cert_a: read(&self.setup.cert_a_path)?,
            cert_b: read(&self.setup.cert_b_path)?,
            cert_a_size_max: self.setup.cert_a_size_max,
            cert_b_size_max: self.setup.cert_b_size_max,
            gallery_url: self.setup.gallery_url.clone(),
            gallery_url_size_max: self.setup.gallery_url_size_max,
        };
        payload.validate()?;
        debug!(
            "Certificates loaded: cert A {} bytes, cert B {} bytes",
            payload.cert_a.len(),
            payload.cert_b.len()
        );
        Ok(payload)
    }
}

/// Directory relative paths in the configuration file resolve against
pub fn config_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
[setup]
cert_a_path = "a.der"
cert_b_path = "b.der"
cert_a_size_max = 16
cert_b_size_max = 8
gallery_url = "http://kaeru.test/"
gallery_url_size_max = 32

[regions.EUR]
title_id = "0004000000104000"
cert_a_size = 0x100
cert_b_size = 0x104
nasc_branch = 0x200
cert_a_data = 0x1000
cert_b_data = 0x1100
gallery_url = 0x1200

[regions.USA]
title_id = "0004000000102000"
cert_a_size = 0x300
cert_b_size = 0x304
nasc_branch = 0x400
cert_a_data = 0x2000
cert_b_data = 0x2100
gallery_url = 0x2200

[regions.JPN]
title_id = "0004000000101000"
cert_a_size = 0x500
cert_b_size = 0x504
nasc_branch = 0x600
cert_a_data = 0x3000
cert_b_data = 0x3100
gallery_url = 0x3200
"#;

    #[test]
    fn test_parse_sample() {
        let config = PatchConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.setup.cert_a_size_max, 16);

        let eur = config.region(Region::Eur).unwrap();
        assert_eq!(eur.title_id, "0004000000104000");
        assert_eq!(eur.nasc_branch, 0x200);
        assert_eq!(config.region(Region::Jpn).unwrap().gallery_url, 0x3200);
    }

    #[test]
    fn test_missing_region() {
        let text = SAMPLE.split("[regions.JPN]").next().unwrap();
        assert!(matches!(
            PatchConfig::from_toml(text),
            Err(ConfigError::MissingRegion(Region::Jpn))
        ));
    }

    #[test]
    fn test_invalid_title_id() {
        let text = SAMPLE.replace("0004000000102000", "../escape");
        assert!(matches!(
            PatchConfig::from_toml(&text),
            Err(ConfigError::InvalidTitleId {
                region: Region::Usa,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let text = SAMPLE.replace("nasc_branch = 0x200", "nasc_brunch = 0x200");
        assert!(matches!(
            PatchConfig::from_toml(&text),
            Err(ConfigError::TomlDeserialize(_))
        ));
    }

    #[test]
    fn test_load_payload_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.der"), [0xA0; 16]).unwrap();
        fs::write(dir.path().join("b.der"), [0xB0; 5]).unwrap();

        let config = PatchConfig::from_toml(SAMPLE).unwrap();
        let payload = config.load_payload(dir.path()).unwrap();
        assert_eq!(payload.cert_a.len(), 16);
        assert_eq!(payload.cert_b, vec![0xB0; 5]);
        assert_eq!(payload.gallery_url, "http://kaeru.test/");
    }

    #[test]
    fn test_certificate_too_large() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.der"), [0xA0; 4]).unwrap();
        fs::write(dir.path().join("b.der"), [0xB0; 9]).unwrap();

        let config = PatchConfig::from_toml(SAMPLE).unwrap();
        assert!(matches!(
            config.load_payload(dir.path()),
            Err(ConfigError::CertificateTooLarge {
                name: "cert B",
                size: 9,
                max: 8
            })
        ));
    }

    #[test]
    fn test_url_limits() {
        let mut payload = Payload {
            cert_a: Vec::new(),
            cert_b: Vec::new(),
            cert_a_size_max: 0,
            cert_b_size_max: 0,
            gallery_url: "http://a-very-long-host.example/".to_string(),
            gallery_url_size_max: 8,
        };
        assert!(matches!(
            payload.validate(),
            Err(ConfigError::UrlTooLong { len: 32, max: 8 })
        ));

        payload.gallery_url = "http://ä".to_string();
        payload.gallery_url_size_max = 64;
        assert!(matches!(payload.validate(), Err(ConfigError::UrlNotAscii(_))));
    }

    #[test]
    fn test_config_dir() {
        assert_eq!(config_dir(Path::new("config.toml")), Path::new("."));
        assert_eq!(
            config_dir(Path::new("patches/config.toml")),
            Path::new("patches")
        );
    }
}
