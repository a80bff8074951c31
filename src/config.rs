use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::detection::merge::Expansion;
use crate::error::{DetectionError, Result};

/// Upper:lower Canny threshold ratio (recommended band is 2:1 to 3:1)
pub const CANNY_RATIO: f32 = 3.0;

pub const MAX_BLUR_RADIUS: u32 = 100;
pub const MAX_CANNY_LOW: u32 = 100;
pub const MAX_MIN_AREA: u32 = 3000;
pub const MAX_EXPANSION: u32 = 100;

/// How the filtered outlines of a frame become its final regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RegionMode {
    /// One bounding box per surviving contour
    Raw,
    /// Bounding box of each contour's convex hull
    Hull,
    /// Bounding boxes fused by the box merger
    #[default]
    Merge,
}

impl RegionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionMode::Raw => "raw",
            RegionMode::Hull => "hull",
            RegionMode::Merge => "merge",
        }
    }
}

impl fmt::Display for RegionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionMode {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "0" => Ok(RegionMode::Raw),
            "hull" | "1" => Ok(RegionMode::Hull),
            "merge" | "2" => Ok(RegionMode::Merge),
            other => Err(DetectionError::UnknownMode(other.to_string())),
        }
    }
}

/// Slider-style index selector (0 = raw, 1 = hull, 2 = merge)
impl TryFrom<u8> for RegionMode {
    type Error = DetectionError;

    fn try_from(index: u8) -> Result<Self> {
        match index {
            0 => Ok(RegionMode::Raw),
            1 => Ok(RegionMode::Hull),
            2 => Ok(RegionMode::Merge),
            other => Err(DetectionError::UnknownMode(other.to_string())),
        }
    }
}

/// Binarisation applied to the blurred difference image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMethod {
    #[default]
    Canny,
    /// Plain threshold at `difference_threshold`
    Threshold,
}

/// Implementation used by merge mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MergeMethod {
    /// Rasterize footprints onto a mask and trace it
    #[default]
    Raster,
    /// Pairwise adjacency tests with union-find
    UnionFind,
}

/// Immutable per-frame detection settings.
///
/// A session never mutates the snapshot it is running with; adjustments are
/// staged as a whole new value and picked up at the next frame boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Cut-off for [`EdgeMethod::Threshold`]; unused by Canny
    pub difference_threshold: u8,
    pub blur_radius: u32,
    /// Low Canny threshold, the high one is `canny_low * CANNY_RATIO`
    pub canny_low: u32,
    /// Noise floor on contour area, 0 accepts everything
    pub min_area: u32,
    pub mode: RegionMode,
    pub edge_method: EdgeMethod,
    pub merge_method: MergeMethod,
    pub expansion: Expansion,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            difference_threshold: 150,
            blur_radius: 1,
            canny_low: 100,
            min_area: 0,
            mode: RegionMode::Merge,
            edge_method: EdgeMethod::Canny,
            merge_method: MergeMethod::Raster,
            expansion: Expansion::default(),
        }
    }
}

impl DetectionConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: DetectionConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_mode(mut self, mode: RegionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_min_area(mut self, min_area: u32) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn canny_high(&self) -> f32 {
        self.canny_low as f32 * CANNY_RATIO
    }

    pub fn validate(&self) -> Result<()> {
        check_range("blur_radius", self.blur_radius, 1, MAX_BLUR_RADIUS)?;
        check_range("canny_low", self.canny_low, 0, MAX_CANNY_LOW)?;
        check_range("min_area", self.min_area, 0, MAX_MIN_AREA)?;
        check_range("expansion.width", self.expansion.width, 0, MAX_EXPANSION)?;
        check_range("expansion.height", self.expansion.height, 0, MAX_EXPANSION)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(DetectionError::InvalidConfig {
            field,
            reason: format!("must be within {}..={}, got {}", min, max, value),
        });
    }
    Ok(())
}
