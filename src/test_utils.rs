//! Synthetic captchas for unit tests.
//!
//! Every letter is a hollow frame with its alphabet index written as a row
//! of dots, so all 26 glyphs share a size but differ in pattern.

use image::GrayImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::preprocessing::{is_ink, BACKGROUND, INK};

pub(crate) const GLYPH_WIDTH: u32 = 20;
pub(crate) const GLYPH_HEIGHT: u32 = 24;
pub(crate) const CAPTCHA_WIDTH: u32 = 200;
pub(crate) const CAPTCHA_HEIGHT: u32 = 70;

/// Binarized bitmap of one synthetic letter
pub(crate) fn glyph_bitmap(letter: char) -> GrayImage {
    let index = letter as u32 - 'A' as u32 + 1;
    let mut img = GrayImage::from_pixel(GLYPH_WIDTH, GLYPH_HEIGHT, BACKGROUND);
    draw_hollow_rect_mut(&mut img, Rect::at(0, 0).of_size(GLYPH_WIDTH, GLYPH_HEIGHT), INK);
    for bit in 0..5 {
        if index >> bit & 1 == 1 {
            let x = 3 + bit as i32 * 3;
            draw_filled_rect_mut(&mut img, Rect::at(x, 3).of_size(2, 2), INK);
        }
    }
    img
}

/// Paste the ink of `bitmap` onto `canvas`, mapping glyph columns through `column`
fn stamp<F>(canvas: &mut GrayImage, bitmap: &GrayImage, y: u32, column: F)
where
    F: Fn(u32) -> u32,
{
    for (gx, gy, pixel) in bitmap.enumerate_pixels() {
        if is_ink(pixel) {
            canvas.put_pixel(column(gx), y + gy, INK);
        }
    }
}

/// Render letters at explicit `(letter, x, y)` positions
pub(crate) fn render_captcha(width: u32, height: u32, placements: &[(char, u32, u32)]) -> GrayImage {
    let mut img = GrayImage::from_pixel(width, height, BACKGROUND);
    for &(letter, x, y) in placements {
        stamp(&mut img, &glyph_bitmap(letter), y, |gx| x + gx);
    }
    img
}

fn glyph_y(slot: usize) -> u32 {
    10 + (slot as u32 * 7) % 30
}

/// Six well separated glyphs at varying heights
pub(crate) fn clean_captcha(text: &str) -> GrayImage {
    let placements: Vec<(char, u32, u32)> = text
        .chars()
        .enumerate()
        .map(|(i, c)| (c, 10 + i as u32 * 30, glyph_y(i)))
        .collect();
    render_captcha(CAPTCHA_WIDTH, CAPTCHA_HEIGHT, &placements)
}

/// Last glyph drawn with `tail_width` columns at the right edge and the rest at column 0
pub(crate) fn wrapped_captcha(text: &str, tail_width: u32) -> GrayImage {
    let letters: Vec<char> = text.chars().collect();
    let mut img = GrayImage::from_pixel(CAPTCHA_WIDTH, CAPTCHA_HEIGHT, BACKGROUND);

    for (i, &letter) in letters[..5].iter().enumerate() {
        let x = 14 + i as u32 * 30;
        stamp(&mut img, &glyph_bitmap(letter), glyph_y(i), |gx| x + gx);
    }

    // Keep the final column blank so the tail run closes on its own
    let tail_start = CAPTCHA_WIDTH - 1 - tail_width;
    stamp(&mut img, &glyph_bitmap(letters[5]), glyph_y(5), |gx| {
        if gx < tail_width {
            tail_start + gx
        } else {
            gx - tail_width
        }
    });
    img
}

/// Glyph `bridge_after` and its right neighbour joined by a one pixel bridge
pub(crate) fn bridged_captcha(text: &str, bridge_after: usize) -> GrayImage {
    let mut img = GrayImage::from_pixel(CAPTCHA_WIDTH, CAPTCHA_HEIGHT, BACKGROUND);
    let mut x = 10;
    for (i, letter) in text.chars().enumerate() {
        let y = glyph_y(i);
        stamp(&mut img, &glyph_bitmap(letter), y, |gx| x + gx);
        x += GLYPH_WIDTH;
        if i == bridge_after {
            img.put_pixel(x, y + GLYPH_HEIGHT / 2, INK);
            x += 1;
        } else {
            x += 10;
        }
    }
    img
}

/// Shift every column right by `shift`, wrapping into column 0. The final
/// column is left out of the rotation and stays blank.
pub(crate) fn roll_columns(img: &GrayImage, shift: u32) -> GrayImage {
    let span = img.width() - 1;
    let mut rolled = GrayImage::from_pixel(img.width(), img.height(), BACKGROUND);
    for (x, y, pixel) in img.enumerate_pixels() {
        if x < span {
            rolled.put_pixel((x + shift) % span, y, *pixel);
        }
    }
    rolled
}
