#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from dicebox for tests
pub use dicebox::{
    BackgroundFrame, BoundingBox, DetectionConfig, EdgeMap, Expansion, Frame, MergeMethod,
    RegionMode,
};
