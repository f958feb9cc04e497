use image::{imageops, GrayImage};

use crate::preprocessing::{is_ink, BACKGROUND};
use crate::segment::{GlyphBox, GlyphRegion};

/// One glyph cut out of a binarized captcha, trimmed to its ink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphImage {
    image: GrayImage,
}

impl GlyphImage {
    /// Trim a binarized glyph crop. A crop with no ink is kept as is.
    pub fn new(crop: GrayImage) -> Self {
        Self { image: trim(crop) }
    }

    /// Crop a region out of the full binarized captcha and trim it
    pub fn extract(binary: &GrayImage, region: &GlyphRegion) -> Self {
        let crop = match region {
            GlyphRegion::Single(b) => crop_box(binary, *b),
            GlyphRegion::Wrapped { tail, head } => {
                merge_horizontally(&crop_box(binary, *tail), &crop_box(binary, *head))
            }
        };
        Self::new(crop)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_blank(&self) -> bool {
        ink_bounds(&self.image).is_none()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    /// Ink flags in row-major order
    pub fn ink_bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.image.pixels().map(is_ink)
    }
}

/// Full-height crop of one column span
pub fn crop_box(binary: &GrayImage, glyph_box: GlyphBox) -> GrayImage {
    imageops::crop_imm(binary, glyph_box.start, 0, glyph_box.width(), binary.height()).to_image()
}

/// Place `right` directly after `left`, used to rebuild a wrapped glyph
pub fn merge_horizontally(left: &GrayImage, right: &GrayImage) -> GrayImage {
    let height = left.height().max(right.height());
    let mut merged = GrayImage::from_pixel(left.width() + right.width(), height, BACKGROUND);
    imageops::replace(&mut merged, left, 0, 0);
    imageops::replace(&mut merged, right, left.width() as i64, 0);
    merged
}

/// Inclusive `(min_x, min_y, max_x, max_y)` of all ink pixels
pub fn ink_bounds(image: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    image
        .enumerate_pixels()
        .filter(|(_, _, p)| is_ink(p))
        .fold(None, |bounds, (x, y, _)| match bounds {
            None => Some((x, y, x, y)),
            Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
        })
}

/// Crop away blank borders so the ink touches all four edges
pub fn trim(image: GrayImage) -> GrayImage {
    match ink_bounds(&image) {
        Some((x0, y0, x1, y1)) => {
            imageops::crop_imm(&image, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
        }
        None => image,
    }
}
