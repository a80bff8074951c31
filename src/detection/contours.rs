use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour as TracedContour, find_contours};
use imageproc::point::Point;

use crate::models::{BoundingBox, Contour, EdgeMap};

/// Trace every border of a binary image, hierarchy included.
///
/// The tracer only opens an outer border where a foreground pixel has a
/// background pixel to its left, so foreground in column 0 is misread as a
/// hole. Tracing a copy with a one pixel blank frame avoids that; points are
/// shifted back to image coordinates.
pub fn trace_borders(img: &GrayImage) -> Vec<TracedContour<i32>> {
    let (width, height) = img.dimensions();
    let padded = GrayImage::from_fn(width + 2, height + 2, |x, y| {
        if x == 0 || y == 0 || x > width || y > height {
            Luma([0u8])
        } else {
            *img.get_pixel(x - 1, y - 1)
        }
    });

    let mut contours = find_contours::<i32>(&padded);
    for contour in &mut contours {
        for p in &mut contour.points {
            *p = Point::new(p.x - 1, p.y - 1);
        }
    }
    contours
}

/// Trace the outermost contours of a binary edge map.
///
/// Holes and anything nested inside them are dropped; the returned outlines
/// keep raster discovery order.
pub fn find_outlines(edges: &EdgeMap) -> Vec<Contour> {
    trace_borders(edges.as_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour::new(c.points))
        .collect()
}

/// Keep contours whose enclosed area is strictly above `min_area` (0 keeps all)
pub fn filter_by_area(contours: &[Contour], min_area: u32) -> Vec<Contour> {
    if min_area == 0 {
        return contours.to_vec();
    }
    contours
        .iter()
        .filter(|c| c.area() > min_area as f64)
        .cloned()
        .collect()
}

/// Bounding boxes of every outline in discovery order
pub fn bounding_boxes(contours: &[Contour]) -> Vec<BoundingBox> {
    contours.iter().filter_map(Contour::bounding_box).collect()
}

/// Outer contours of `edges` above the area floor, as bounding boxes
pub fn extract_regions(edges: &EdgeMap, min_area: u32) -> Vec<BoundingBox> {
    let outlines = find_outlines(edges);
    let kept = filter_by_area(&outlines, min_area);
    tracing::debug!(
        traced = outlines.len(),
        kept = kept.len(),
        min_area,
        "extracted outer contours"
    );
    bounding_boxes(&kept)
}
