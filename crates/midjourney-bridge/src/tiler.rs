//! Quadrant splitting of composite result images
//!
//! A fresh generation result is a four-up grid. [`split`] partitions it at
//! the integer-divided midpoints; for odd dimensions the right/bottom tiles
//! absorb the extra pixel, so the four tiles cover every source pixel
//! exactly once. Pure, no I/O.

use image::{DynamicImage, GenericImageView};

/// The four quadrants of a composite result image.
#[derive(Debug)]
pub struct TileSet {
    pub top_left: DynamicImage,
    pub top_right: DynamicImage,
    pub bottom_left: DynamicImage,
    pub bottom_right: DynamicImage,
}

/// Split an image into four quadrants.
pub fn split(image: &DynamicImage) -> TileSet {
    let (width, height) = image.dimensions();
    let mid_x = width / 2;
    let mid_y = height / 2;

    TileSet {
        top_left: image.crop_imm(0, 0, mid_x, mid_y),
        top_right: image.crop_imm(mid_x, 0, width - mid_x, mid_y),
        bottom_left: image.crop_imm(0, mid_y, mid_x, height - mid_y),
        bottom_right: image.crop_imm(mid_x, mid_y, width - mid_x, height - mid_y),
    }
}
