#![allow(dead_code)]

use captcha_ocr::{Corpus, Fingerprint, GlyphImage};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use std::io::Cursor;
use std::path::Path;

pub const WIDTH: u32 = 200;
pub const HEIGHT: u32 = 70;
pub const GLYPH_WIDTH: u32 = 22;
pub const GLYPH_HEIGHT: u32 = 26;

const INK: Luma<u8> = Luma([0]);
const PAPER: Luma<u8> = Luma([255]);
/// Anti-aliasing grey that must not survive binarization
const HALO: Luma<u8> = Luma([90]);

/// Letter bitmap: top, bottom and left strokes, the letter's index as dots
/// on row 2, and a letter-specific diagonal texture below that.
pub fn glyph(letter: char) -> GrayImage {
    let n = letter as u32 - 'A' as u32;
    GrayImage::from_fn(GLYPH_WIDTH, GLYPH_HEIGHT, |x, y| {
        let stroke = x == 0 || y == GLYPH_HEIGHT - 1 || y == 0;
        let pattern = y > 3 && y < GLYPH_HEIGHT - 2 && (x * 3 + y * (n % 7 + 1) + n) % 11 == 0;
        let marker = y == 2 && x >= 2 && x < 12 && x % 2 == 0 && ((n + 1) >> ((x - 2) / 2)) & 1 == 1;
        if stroke || pattern || marker {
            INK
        } else {
            PAPER
        }
    })
}

fn paint(canvas: &mut GrayImage, letter: char, y: u32, column: impl Fn(u32) -> u32) {
    for (gx, gy, pixel) in glyph(letter).enumerate_pixels() {
        if *pixel == INK {
            let x = column(gx);
            canvas.put_pixel(x, y + gy, INK);
            // Soft edge to the right, as rendered captchas have
            if gy == 0 && x + 1 < WIDTH && *canvas.get_pixel(x + 1, y) != INK {
                canvas.put_pixel(x + 1, y + gy, HALO);
            }
        }
    }
}

fn row(slot: usize) -> u32 {
    8 + (slot as u32 * 11) % 34
}

pub fn clean(text: &str) -> GrayImage {
    let mut img = GrayImage::from_pixel(WIDTH, HEIGHT, PAPER);
    for (i, letter) in text.chars().enumerate() {
        let x = 8 + i as u32 * 31;
        paint(&mut img, letter, row(i), |gx| x + gx);
    }
    img
}

pub fn wrapped(text: &str) -> GrayImage {
    let letters: Vec<char> = text.chars().collect();
    let mut img = GrayImage::from_pixel(WIDTH, HEIGHT, PAPER);
    for (i, &letter) in letters[..5].iter().enumerate() {
        let x = 20 + i as u32 * 30;
        paint(&mut img, letter, row(i), |gx| x + gx);
    }
    let tail = 10;
    let tail_start = WIDTH - 1 - tail;
    paint(&mut img, letters[5], row(5), |gx| {
        if gx < tail {
            tail_start + gx
        } else {
            gx - tail
        }
    });
    img
}

/// Glyphs `pair` and `pair + 1` joined through a single ink pixel
pub fn bridged(text: &str, pair: usize) -> GrayImage {
    let mut img = GrayImage::from_pixel(WIDTH, HEIGHT, PAPER);
    let mut x = 6;
    for (i, letter) in text.chars().enumerate() {
        let y = row(i);
        paint(&mut img, letter, y, |gx| x + gx);
        x += GLYPH_WIDTH;
        if i == pair {
            img.put_pixel(x, y + GLYPH_HEIGHT / 2, INK);
            x += 1;
        } else {
            x += 8;
        }
    }
    img
}

/// `bridged` rotated right by `shift` columns so the last glyph wraps into
/// column 0. The final column stays blank.
pub fn bridged_and_wrapped(text: &str, pair: usize, shift: u32) -> GrayImage {
    let flat = bridged(text, pair);
    let span = WIDTH - 1;
    let mut img = GrayImage::from_pixel(WIDTH, HEIGHT, PAPER);
    for (x, y, pixel) in flat.enumerate_pixels() {
        if x < span {
            img.put_pixel((x + shift) % span, y, *pixel);
        }
    }
    img
}

pub fn fingerprint(letter: char) -> Fingerprint {
    Fingerprint::of(&GlyphImage::new(glyph(letter))).unwrap()
}

pub fn corpus(letters: &str) -> Corpus {
    let mut corpus = Corpus::new();
    for letter in letters.chars() {
        corpus.insert(letter, fingerprint(letter)).unwrap();
    }
    corpus
}

pub fn write_corpus(dir: &Path, letters: &str) {
    let corpus = corpus(letters);
    for letter in letters.chars() {
        corpus.save_letter(dir, letter).unwrap();
    }
}

pub fn png(img: GrayImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
