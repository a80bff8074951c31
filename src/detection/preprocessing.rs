use image::{GrayImage, Luma};
use imageproc::edges::canny;
use imageproc::filter::box_filter;

use crate::config::{CANNY_RATIO, DetectionConfig, EdgeMethod};
use crate::error::{DetectionError, Result};
use crate::models::{EdgeMap, Frame, check_dimensions};

/// Per-pixel absolute difference between a frame and the background
pub fn absolute_difference(frame: &Frame, background: &Frame) -> Result<GrayImage> {
    check_dimensions(frame, background)?;
    let (width, height) = frame.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let a = frame.get_pixel(x, y)[0];
        let b = background.get_pixel(x, y)[0];
        Luma([a.abs_diff(b)])
    }))
}

/// Normalized box blur with a `(2 * radius + 1)` square window
pub fn apply_blur(img: &GrayImage, radius: u32) -> Result<GrayImage> {
    if radius == 0 {
        return Err(DetectionError::InvalidConfig {
            field: "blur_radius",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(box_filter(img, radius, radius))
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> EdgeMap {
    EdgeMap::new(canny(img, low_threshold, high_threshold))
}

/// Binarize: pixels strictly above `threshold` become foreground
pub fn threshold_difference(img: &GrayImage, threshold: u8) -> EdgeMap {
    let (width, height) = img.dimensions();
    EdgeMap::new(GrayImage::from_fn(width, height, |x, y| {
        if img.get_pixel(x, y)[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    }))
}

/// Difference against the background, blur, then Canny with `high = low * ratio`
pub fn compute_edges(
    frame: &Frame,
    background: &Frame,
    blur_radius: u32,
    canny_low: f32,
    canny_ratio: f32,
) -> Result<EdgeMap> {
    let diff = absolute_difference(frame, background)?;
    let blurred = apply_blur(&diff, blur_radius)?;
    Ok(detect_edges(&blurred, canny_low, canny_low * canny_ratio))
}

/// Build the edge map for a frame with whichever binarisation the config asks for
pub fn compute_edge_map(
    frame: &Frame,
    background: &Frame,
    config: &DetectionConfig,
) -> Result<EdgeMap> {
    match config.edge_method {
        EdgeMethod::Canny => compute_edges(
            frame,
            background,
            config.blur_radius,
            config.canny_low as f32,
            CANNY_RATIO,
        ),
        EdgeMethod::Threshold => {
            let diff = absolute_difference(frame, background)?;
            let blurred = apply_blur(&diff, config.blur_radius)?;
            Ok(threshold_difference(&blurred, config.difference_threshold))
        }
    }
}
