//! Shared synthetic-image builders for unit tests.

use image::{GrayImage, Luma};

/// Uniform grayscale image of the given value.
pub(crate) fn gray_image(w: u32, h: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([value]))
}

/// One row-major gradient: pixel value is `x` modulo 256.
pub(crate) fn gradient_image(w: u32, h: u32) -> GrayImage {
    let mut img = GrayImage::new(w, h);
    for (x, _, p) in img.enumerate_pixels_mut() {
        p[0] = (x % 256) as u8;
    }
    img
}

/// Paint a solid rectangle of `value` at `(x, y)`.
pub(crate) fn fill_block(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, Luma([value]));
        }
    }
}

/// Binary mask with one foreground block.
pub(crate) fn mask_with_block(w: u32, h: u32, bx: u32, by: u32, bw: u32, bh: u32) -> GrayImage {
    let mut mask = GrayImage::new(w, h);
    fill_block(&mut mask, bx, by, bw, bh, 255);
    mask
}
