use serde::Serialize;

use crate::config::{DetectionConfig, MergeMethod, RegionMode};
use crate::detection::contours::{bounding_boxes, filter_by_area};
use crate::detection::merge::{merge_by_overlap, merge_overlapping_boxes};
use crate::models::{BoundingBox, Contour, RegionSet};

/// Regions chosen for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSelection {
    pub mode: RegionMode,
    pub regions: RegionSet,
    /// First merged region, used for the close-up crop (merge mode only)
    pub primary: Option<BoundingBox>,
}

impl RegionSelection {
    pub fn empty(mode: RegionMode) -> Self {
        Self {
            mode,
            regions: Vec::new(),
            primary: None,
        }
    }
}

/// Turn the traced outlines of a frame into its final regions
pub fn select_regions(
    contours: &[Contour],
    config: &DetectionConfig,
    frame_size: (u32, u32),
) -> RegionSelection {
    let (regions, primary) = match config.mode {
        RegionMode::Raw => (raw_regions(contours, config.min_area), None),
        RegionMode::Hull => (hull_regions(contours, config.min_area), None),
        RegionMode::Merge => {
            let merged = merged_regions(contours, config, frame_size);
            let primary = merged.first().copied();
            (merged, primary)
        }
    };

    RegionSelection {
        mode: config.mode,
        regions,
        primary,
    }
}

pub fn raw_regions(contours: &[Contour], min_area: u32) -> RegionSet {
    bounding_boxes(&filter_by_area(contours, min_area))
}

/// Bounding boxes of the convex hulls of the outlines that pass the area floor
pub fn hull_regions(contours: &[Contour], min_area: u32) -> RegionSet {
    let hulls: Vec<Contour> = filter_by_area(contours, min_area)
        .iter()
        .map(Contour::convex_hull)
        .collect();
    bounding_boxes(&hulls)
}

pub fn merged_regions(
    contours: &[Contour],
    config: &DetectionConfig,
    frame_size: (u32, u32),
) -> RegionSet {
    let boxes = raw_regions(contours, config.min_area);
    match config.merge_method {
        MergeMethod::Raster => merge_overlapping_boxes(&boxes, config.expansion, frame_size),
        MergeMethod::UnionFind => merge_by_overlap(&boxes, config.expansion, frame_size),
    }
}
