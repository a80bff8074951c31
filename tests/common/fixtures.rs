use dicebox::{BoundingBox, EdgeMap, Frame};
use image::{GrayImage, Luma};

pub const FRAME_WIDTH: u32 = 120;
pub const FRAME_HEIGHT: u32 = 100;

/// All-black frame of the standard test size
pub fn blank_frame() -> Frame {
    GrayImage::new(FRAME_WIDTH, FRAME_HEIGHT)
}

/// Frame with filled squares `(x, y, size, intensity)` painted on black
pub fn frame_with_squares(squares: &[(u32, u32, u32, u8)]) -> Frame {
    let mut img = blank_frame();
    for &(x, y, size, value) in squares {
        fill(&mut img, x, y, size, size, value);
    }
    img
}

/// Binary edge map with filled rectangles `(x, y, width, height)` set to 255
pub fn edge_map_with_rects(rects: &[(u32, u32, u32, u32)]) -> EdgeMap {
    let mut img = blank_frame();
    for &(x, y, w, h) in rects {
        fill(&mut img, x, y, w, h, 255);
    }
    EdgeMap::new(img)
}

/// Square outline of one pixel thickness
pub fn draw_ring(img: &mut GrayImage, x: u32, y: u32, size: u32) {
    for i in 0..size {
        img.put_pixel(x + i, y, Luma([255]));
        img.put_pixel(x + i, y + size - 1, Luma([255]));
        img.put_pixel(x, y + i, Luma([255]));
        img.put_pixel(x + size - 1, y + i, Luma([255]));
    }
}

pub fn fill(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, Luma([value]));
        }
    }
}

pub fn bbox(x: u32, y: u32, width: u32, height: u32) -> BoundingBox {
    BoundingBox::new(x, y, width, height)
}

/// Boxes sorted into a canonical order for order-insensitive comparisons
pub fn sorted(mut boxes: Vec<BoundingBox>) -> Vec<BoundingBox> {
    boxes.sort_by_key(|b| (b.y, b.x, b.width, b.height));
    boxes
}
