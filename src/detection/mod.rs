pub mod preprocessing;
pub mod contours;
pub mod merge;
pub mod strategy;

use crate::config::DetectionConfig;
use crate::error::Result;
use crate::models::{BackgroundFrame, EdgeMap, Frame};
use strategy::RegionSelection;

/// Output of one pass: the intermediate edge map and the chosen regions
#[derive(Debug, Clone)]
pub struct Detection {
    pub edges: EdgeMap,
    pub selection: RegionSelection,
}

/// Background difference → edges → outer contours → regions, for a fixed config
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    config: DetectionConfig,
}

impl DetectionPipeline {
    /// Validates the configuration up front so a bad value never reaches a frame
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run the full detection pipeline on a frame
    pub fn detect(&self, frame: &Frame, background: &BackgroundFrame) -> Result<Detection> {
        background.ensure_matches(frame)?;

        let edges = preprocessing::compute_edge_map(frame, background.as_frame(), &self.config)?;
        tracing::debug!(
            edge_pixels = edges.edge_pixel_count(),
            method = ?self.config.edge_method,
            "computed edge map"
        );

        let outlines = contours::find_outlines(&edges);
        tracing::debug!(outlines = outlines.len(), "traced outer contours");

        let selection = strategy::select_regions(&outlines, &self.config, frame.dimensions());
        tracing::debug!(
            mode = %selection.mode,
            regions = selection.regions.len(),
            "selected regions"
        );

        Ok(Detection { edges, selection })
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self {
            config: DetectionConfig::default(),
        }
    }
}
