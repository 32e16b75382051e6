//! Pipeline configuration

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Settings passed explicitly to every [`ThumbnailPipeline`](crate::ThumbnailPipeline)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Longest side used when a caller gives no target size
    #[serde(default = "default_target_size")]
    pub target_size: u32,

    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Directory for intermediate files; the system temp dir when unset
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Decoded TIFF blocks kept per open raster
    #[serde(default = "default_block_cache_size")]
    pub block_cache_size: usize,

    /// Memory map TIFF inputs instead of streaming them
    #[serde(default = "default_use_mmap")]
    pub use_mmap: bool,
}

fn default_target_size() -> u32 {
    256
}

fn default_jpeg_quality() -> u8 {
    90
}

fn default_block_cache_size() -> usize {
    256
}

fn default_use_mmap() -> bool {
    true
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            target_size: default_target_size(),
            jpeg_quality: default_jpeg_quality(),
            temp_dir: None,
            block_cache_size: default_block_cache_size(),
            use_mmap: default_use_mmap(),
        }
    }
}

impl ThumbnailConfig {
    /// Loads a JSON configuration file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(text)?;
        config.jpeg_quality = config.jpeg_quality.clamp(1, 100);
        Ok(config)
    }
}
