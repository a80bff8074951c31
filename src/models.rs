use image::{DynamicImage, GrayImage};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, Result};

/// Single-channel 8-bit camera frame
pub type Frame = GrayImage;

/// Ordered regions emitted for one frame
pub type RegionSet = Vec<BoundingBox>;

/// Axis-aligned box covering pixels `[x, x + width) x [y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True when the two boxes share at least one pixel
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Smallest box covering both
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Minimal box around a set of pixel coordinates.
    ///
    /// Negative coordinates are clamped to zero. Returns `None` for an empty set.
    pub fn from_points(points: &[Point<i32>]) -> Option<BoundingBox> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let min_x = min_x.max(0) as u32;
        let min_y = min_y.max(0) as u32;
        let max_x = max_x.max(0) as u32;
        let max_y = max_y.max(0) as u32;
        Some(BoundingBox::new(
            min_x,
            min_y,
            max_x - min_x + 1,
            max_y - min_y + 1,
        ))
    }

    /// Cut this region out of an image, clamped to the image bounds
    pub fn crop(&self, img: &DynamicImage) -> Option<DynamicImage> {
        if self.x >= img.width() || self.y >= img.height() {
            return None;
        }
        let width = self.width.min(img.width() - self.x);
        let height = self.height.min(img.height() - self.y);

        if width == 0 || height == 0 {
            return None;
        }

        Some(img.crop_imm(self.x, self.y, width, height))
    }
}

/// Closed outline traced from a binary image
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed area of the outline polygon (shoelace formula).
    ///
    /// Thin open curves trace back over themselves and enclose nothing.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice_area: i64 = 0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            twice_area += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
        }
        twice_area.abs() as f64 / 2.0
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    pub fn convex_hull(&self) -> Contour {
        if self.points.len() < 3 {
            return self.clone();
        }
        Contour::new(imageproc::geometry::convex_hull(self.points.as_slice()))
    }
}

/// Binary edge image (0 = background, 255 = edge)
#[derive(Debug, Clone)]
pub struct EdgeMap(GrayImage);

impl EdgeMap {
    pub fn new(image: GrayImage) -> Self {
        Self(image)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }

    pub fn edge_pixel_count(&self) -> usize {
        self.0.pixels().filter(|p| p[0] != 0).count()
    }
}

/// Reference frame of the empty scene, fixed for a whole session
#[derive(Debug, Clone)]
pub struct BackgroundFrame(Frame);

impl BackgroundFrame {
    pub fn new(frame: Frame) -> Self {
        Self(frame)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn as_frame(&self) -> &Frame {
        &self.0
    }

    /// Every frame of a session must have the background's dimensions
    pub fn ensure_matches(&self, frame: &Frame) -> Result<()> {
        check_dimensions(frame, &self.0)
    }
}

pub(crate) fn check_dimensions(frame: &Frame, background: &Frame) -> Result<()> {
    let (frame_width, frame_height) = frame.dimensions();
    let (background_width, background_height) = background.dimensions();
    if (frame_width, frame_height) != (background_width, background_height) {
        return Err(DetectionError::DimensionMismatch {
            frame_width,
            frame_height,
            background_width,
            background_height,
        });
    }
    Ok(())
}
