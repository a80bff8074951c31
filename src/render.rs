use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::config::RegionMode;
use crate::models::BoundingBox;

pub const RAW_COLOR: Rgb<u8> = Rgb([255, 153, 0]);
pub const HULL_COLOR: Rgb<u8> = Rgb([0, 200, 255]);
pub const MERGE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

pub fn mode_color(mode: RegionMode) -> Rgb<u8> {
    match mode {
        RegionMode::Raw => RAW_COLOR,
        RegionMode::Hull => HULL_COLOR,
        RegionMode::Merge => MERGE_COLOR,
    }
}

/// Outline each region with a two pixel border
pub fn draw_regions(img: &mut RgbImage, regions: &[BoundingBox], color: Rgb<u8>) {
    for bbox in regions.iter().filter(|b| !b.is_degenerate()) {
        let outer = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
        draw_hollow_rect_mut(img, outer, color);
        if bbox.width > 2 && bbox.height > 2 {
            let inner = Rect::at(bbox.x as i32 + 1, bbox.y as i32 + 1)
                .of_size(bbox.width - 2, bbox.height - 2);
            draw_hollow_rect_mut(img, inner, color);
        }
    }
}

/// Copy of `img` with the regions drawn in the mode's color
pub fn annotate(img: &DynamicImage, regions: &[BoundingBox], mode: RegionMode) -> RgbImage {
    let mut canvas = img.to_rgb8();
    draw_regions(&mut canvas, regions, mode_color(mode));
    canvas
}

/// Close-up of the primary region, if there is one inside the image
pub fn crop_primary(img: &DynamicImage, primary: Option<&BoundingBox>) -> Option<DynamicImage> {
    primary.and_then(|bbox| bbox.crop(img))
}
