mod common;

use common::*;
use dicebox::detection::contours::find_outlines;
use dicebox::select_regions;

const FRAME: (u32, u32) = (FRAME_WIDTH, FRAME_HEIGHT);

fn config(mode: RegionMode, min_area: u32) -> DetectionConfig {
    DetectionConfig::default()
        .with_mode(mode)
        .with_min_area(min_area)
}

/// One pixel thick L: along the top from (10, 10), then down from (30, 10)
fn thin_corner() -> EdgeMap {
    edge_map_with_rects(&[(10, 10, 21, 1), (30, 10, 1, 21)])
}

#[test]
fn test_raw_mode_drops_contours_below_min_area() {
    let edges = edge_map_with_rects(&[(5, 5, 3, 3), (9, 9, 3, 3), (13, 5, 3, 3)]);
    let outlines = find_outlines(&edges);
    assert_eq!(outlines.len(), 3);

    let selection = select_regions(&outlines, &config(RegionMode::Raw, 10), FRAME);

    assert!(selection.regions.is_empty());
    assert_eq!(selection.primary, None);
}

#[test]
fn test_raw_mode_boxes_each_contour() {
    let edges = edge_map_with_rects(&[(10, 10, 10, 10), (22, 10, 10, 10)]);
    let outlines = find_outlines(&edges);

    let selection = select_regions(&outlines, &config(RegionMode::Raw, 0), FRAME);

    assert_eq!(selection.mode, RegionMode::Raw);
    assert_eq!(
        selection.regions,
        vec![bbox(10, 10, 10, 10), bbox(22, 10, 10, 10)]
    );
    assert_eq!(selection.primary, None);
}

#[test]
fn test_hull_mode_floors_on_the_traced_outline() {
    // The L encloses nothing, its hull encloses a large triangle
    let outlines = find_outlines(&thin_corner());

    let raw = select_regions(&outlines, &config(RegionMode::Raw, 50), FRAME);
    let hull = select_regions(&outlines, &config(RegionMode::Hull, 50), FRAME);

    assert!(raw.regions.is_empty());
    assert!(hull.regions.is_empty());
    assert_eq!(hull.primary, None);
}

#[test]
fn test_hull_mode_boxes_the_hull() {
    let outlines = find_outlines(&thin_corner());

    let hull = select_regions(&outlines, &config(RegionMode::Hull, 0), FRAME);

    assert_eq!(hull.regions, vec![bbox(10, 10, 21, 21)]);
}

#[test]
fn test_hull_mode_never_keeps_more_than_raw_mode() {
    let edges = edge_map_with_rects(&[
        (10, 10, 21, 1),
        (30, 10, 1, 21),
        (50, 50, 3, 3),
        (70, 20, 12, 12),
    ]);
    let outlines = find_outlines(&edges);

    for min_area in [0, 1, 5, 50, 150] {
        let raw = select_regions(&outlines, &config(RegionMode::Raw, min_area), FRAME);
        let hull = select_regions(&outlines, &config(RegionMode::Hull, min_area), FRAME);
        assert_eq!(hull.regions.len(), raw.regions.len(), "min_area {}", min_area);
    }
}

#[test]
fn test_merge_mode_fuses_neighbours_and_picks_first_as_primary() {
    let edges = edge_map_with_rects(&[(10, 10, 10, 10), (22, 10, 10, 10), (70, 60, 8, 8)]);
    let outlines = find_outlines(&edges);

    let selection = select_regions(&outlines, &config(RegionMode::Merge, 0), FRAME);

    assert_eq!(
        selection.regions,
        vec![bbox(10, 10, 22, 10), bbox(70, 60, 8, 8)]
    );
    assert_eq!(selection.primary, Some(bbox(10, 10, 22, 10)));
}

#[test]
fn test_merge_mode_with_union_find() {
    let edges = edge_map_with_rects(&[(10, 10, 10, 10), (22, 10, 10, 10), (70, 60, 8, 8)]);
    let outlines = find_outlines(&edges);
    let mut union_find = config(RegionMode::Merge, 0);
    union_find.merge_method = MergeMethod::UnionFind;

    let raster = select_regions(&outlines, &config(RegionMode::Merge, 0), FRAME);
    let pairwise = select_regions(&outlines, &union_find, FRAME);

    assert_eq!(pairwise, raster);
}

#[test]
fn test_merge_mode_on_nothing_has_no_primary() {
    let selection = select_regions(&[], &config(RegionMode::Merge, 0), FRAME);

    assert!(selection.regions.is_empty());
    assert_eq!(selection.primary, None);
}

#[test]
fn test_merge_mode_applies_area_floor_before_merging() {
    // The small square would bridge the two large ones if it survived
    let edges = edge_map_with_rects(&[(10, 10, 10, 10), (21, 12, 3, 3), (25, 10, 10, 10)]);
    let outlines = find_outlines(&edges);

    let selection = select_regions(&outlines, &config(RegionMode::Merge, 10), FRAME);

    assert_eq!(
        selection.regions,
        vec![bbox(10, 10, 10, 10), bbox(25, 10, 10, 10)]
    );
}
