//! Fusing overlapping and nearby bounding boxes.
//!
//! Every box is grown by an [`Expansion`], clipped to the frame and painted as a
//! filled rectangle onto a blank mask. Boxes whose grown footprints touch end up
//! in the same 8-connected mask component, so tracing the mask's external
//! contours yields one region per group without building an overlap graph.
//! Each region is reported as the union of its *unexpanded* member boxes, and
//! passes repeat until nothing merges, which leaves the output pairwise
//! disjoint and stable under a second merge.
//!
//! [`merge_by_overlap`] computes the same grouping with pairwise adjacency
//! tests and a union-find, for callers that prefer not to allocate a mask.

use std::collections::HashMap;

use image::{GrayImage, Luma};
use imageproc::contours::{BorderType, Contour as TracedContour};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};

use crate::detection::contours::trace_borders;
use crate::models::BoundingBox;

/// Padding added to a box before testing it against its neighbours.
///
/// The extra width and height are split evenly around the box
/// (`n / 2` before, the rest after).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expansion {
    pub width: u32,
    pub height: u32,
}

impl Expansion {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn uniform(pixels: u32) -> Self {
        Self::new(pixels, pixels)
    }

    pub fn none() -> Self {
        Self::new(0, 0)
    }
}

impl Default for Expansion {
    fn default() -> Self {
        Self::uniform(2)
    }
}

/// Inclusive pixel extent of an expanded box on the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Footprint {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

impl Footprint {
    /// Expanded and clipped extent of `bbox`, `None` if nothing is left on the mask.
    /// Zero-sized boxes still cover a one-pixel line.
    fn of(bbox: &BoundingBox, expansion: Expansion, (width, height): (u32, u32)) -> Option<Self> {
        let (x0, x1) = expand_span(bbox.x, bbox.width, expansion.width, width)?;
        let (y0, y1) = expand_span(bbox.y, bbox.height, expansion.height, height)?;
        Some(Self { x0, y0, x1, y1 })
    }

    fn rect(&self) -> Rect {
        Rect::at(self.x0 as i32, self.y0 as i32).of_size(self.x1 - self.x0 + 1, self.y1 - self.y0 + 1)
    }

    /// 8-connected adjacency or overlap
    fn touches(&self, other: &Footprint) -> bool {
        self.x0 <= other.x1 + 1
            && other.x0 <= self.x1 + 1
            && self.y0 <= other.y1 + 1
            && other.y0 <= self.y1 + 1
    }

    /// Position of the first pixel a row-major scan reaches
    fn raster_key(&self) -> (u32, u32) {
        (self.y0, self.x0)
    }
}

fn expand_span(start: u32, len: u32, grow: u32, limit: u32) -> Option<(u32, u32)> {
    if limit == 0 {
        return None;
    }
    let lo = start as i64 - (grow / 2) as i64;
    let hi = start as i64 + len.max(1) as i64 - 1 + (grow - grow / 2) as i64;
    let lo = lo.max(0);
    let hi = hi.min(limit as i64 - 1);
    if lo > hi {
        return None;
    }
    Some((lo as u32, hi as u32))
}

/// Merge boxes whose expanded footprints touch, by rasterizing and tracing a mask.
///
/// `frame_size` is the `(width, height)` of the frame the boxes come from.
/// Every input box ends up inside exactly one output box; boxes that never
/// reach the mask are returned unchanged after the merged ones.
pub fn merge_overlapping_boxes(
    boxes: &[BoundingBox],
    expansion: Expansion,
    frame_size: (u32, u32),
) -> Vec<BoundingBox> {
    merge_until_stable(boxes, |current| raster_pass(current, expansion, frame_size))
}

/// Same grouping as [`merge_overlapping_boxes`] via pairwise tests and union-find
pub fn merge_by_overlap(
    boxes: &[BoundingBox],
    expansion: Expansion,
    frame_size: (u32, u32),
) -> Vec<BoundingBox> {
    merge_until_stable(boxes, |current| union_find_pass(current, expansion, frame_size))
}

fn merge_until_stable<F>(boxes: &[BoundingBox], pass: F) -> Vec<BoundingBox>
where
    F: Fn(&[BoundingBox]) -> Vec<BoundingBox>,
{
    if boxes.is_empty() {
        return Vec::new();
    }

    let mut current = boxes.to_vec();
    let mut passes = 0;
    loop {
        let next = pass(&current);
        passes += 1;
        // A pass never yields more boxes than it was given
        if next.len() == current.len() {
            tracing::debug!(input = boxes.len(), output = next.len(), passes, "merged boxes");
            return next;
        }
        current = next;
    }
}

fn raster_pass(
    boxes: &[BoundingBox],
    expansion: Expansion,
    frame_size: (u32, u32),
) -> Vec<BoundingBox> {
    let footprints: Vec<Option<Footprint>> = boxes
        .iter()
        .map(|b| Footprint::of(b, expansion, frame_size))
        .collect();

    // Fresh mask every pass: leftover foreground would join unrelated boxes
    let mut mask = GrayImage::new(frame_size.0, frame_size.1);
    for fp in footprints.iter().flatten() {
        draw_filled_rect_mut(&mut mask, fp.rect(), Luma([255u8]));
    }

    let contours = trace_borders(&mask);
    let labels = connected_components(&mask, Connectivity::Eight, Luma([0u8]));

    // External contours open regions in discovery order. A component sitting in
    // the hole of another one joins the region of its outermost ancestor.
    let mut region_of_root: HashMap<usize, usize> = HashMap::new();
    let mut region_of_label: HashMap<u32, usize> = HashMap::new();
    for (idx, contour) in contours.iter().enumerate() {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        let Some(start) = contour.points.first() else {
            continue;
        };
        let next_region = region_of_root.len();
        let region = *region_of_root
            .entry(outermost_ancestor(&contours, idx))
            .or_insert(next_region);
        let label = labels.get_pixel(start.x as u32, start.y as u32)[0];
        region_of_label.insert(label, region);
    }

    let mut regions: Vec<Option<BoundingBox>> = vec![None; region_of_root.len()];
    let mut outside = Vec::new();
    for (bbox, fp) in boxes.iter().zip(&footprints) {
        let region = fp.and_then(|fp| {
            let label = labels.get_pixel(fp.x0, fp.y0)[0];
            region_of_label.get(&label).copied()
        });
        match region {
            Some(r) => {
                regions[r] = Some(match regions[r] {
                    Some(acc) => acc.union(bbox),
                    None => *bbox,
                });
            }
            None => outside.push(*bbox),
        }
    }

    regions.into_iter().flatten().chain(outside).collect()
}

fn outermost_ancestor(contours: &[TracedContour<i32>], mut idx: usize) -> usize {
    while let Some(parent) = contours[idx].parent {
        idx = parent;
    }
    idx
}

fn union_find_pass(
    boxes: &[BoundingBox],
    expansion: Expansion,
    frame_size: (u32, u32),
) -> Vec<BoundingBox> {
    let footprints: Vec<Option<Footprint>> = boxes
        .iter()
        .map(|b| Footprint::of(b, expansion, frame_size))
        .collect();

    let mut sets = DisjointSet::new(boxes.len());
    for i in 0..footprints.len() {
        let Some(a) = footprints[i] else { continue };
        for j in (i + 1)..footprints.len() {
            if let Some(b) = footprints[j] {
                if a.touches(&b) {
                    sets.union(i, j);
                }
            }
        }
    }

    let mut groups: HashMap<usize, ((u32, u32), BoundingBox)> = HashMap::new();
    let mut outside = Vec::new();
    for (i, (bbox, fp)) in boxes.iter().zip(&footprints).enumerate() {
        let Some(fp) = fp else {
            outside.push(*bbox);
            continue;
        };
        groups
            .entry(sets.find(i))
            .and_modify(|(key, acc)| {
                *key = (*key).min(fp.raster_key());
                *acc = acc.union(bbox);
            })
            .or_insert((fp.raster_key(), *bbox));
    }

    let mut merged: Vec<((u32, u32), BoundingBox)> = groups.into_values().collect();
    merged.sort_by_key(|(key, _)| *key);
    merged.into_iter().map(|(_, b)| b).chain(outside).collect()
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self { parent: (0..len).collect() }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb.max(ra)] = ra.min(rb);
        }
    }
}
