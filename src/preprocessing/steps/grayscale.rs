use image::{DynamicImage, GrayImage};

/// Convert image to single-channel luminance
/// Everything downstream reads luminance only
pub fn apply(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}
