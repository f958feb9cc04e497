use image::{GrayImage, Luma};

/// Pixel value used for ink in a binarized grid
pub const INK: Luma<u8> = Luma([0]);
/// Pixel value used for background in a binarized grid
pub const BACKGROUND: Luma<u8> = Luma([255]);

/// Captchas are already near-binary: only (almost) pure black counts as ink,
/// which drops the anti-aliased fringe around every glyph.
pub const DEFAULT_THRESHOLD: u8 = 1;

/// Collapse a grayscale grid into ink (`<= threshold`) and background.
pub fn apply(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] <= threshold {
            INK
        } else {
            BACKGROUND
        }
    })
}

#[inline]
pub fn is_ink(pixel: &Luma<u8>) -> bool {
    pixel.0[0] == INK.0[0]
}
