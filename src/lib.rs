pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod render;

pub use config::{CANNY_RATIO, DetectionConfig, EdgeMethod, MergeMethod, RegionMode};
pub use detection::{Detection, DetectionPipeline};
pub use detection::merge::{Expansion, merge_by_overlap, merge_overlapping_boxes};
pub use detection::strategy::{RegionSelection, select_regions};
pub use error::{DetectionError, Result};
pub use models::{BackgroundFrame, BoundingBox, Contour, EdgeMap, Frame, RegionSet};
pub use pipeline::{DebugConfig, FrameReport, Session};
