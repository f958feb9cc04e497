//! Column-scan glyph segmentation
//!
//! Glyphs never share a column in a clean captcha, so the horizontal ink
//! profile is enough to separate them. Two rendering faults are repaired:
//! a run too wide to be one glyph is split at its thinnest column (bridge),
//! and a seventh run means the last glyph wrapped around to column 0.

use image::GrayImage;

use crate::preprocessing::is_ink;

/// Number of glyphs in every captcha
pub const GLYPH_COUNT: usize = 6;

/// Runs wider than this hold two touching glyphs
pub const MAX_GLYPH_WIDTH: u32 = 33;

/// Columns on either side of a wide run that never hold the divider
pub const SPLIT_MARGIN: u32 = 5;

/// A first glyph narrower than this means the scan misfired
pub const MIN_GLYPH_WIDTH: u32 = 14;

/// Half-open column span `[start, end)` covering the full image height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphBox {
    pub start: u32,
    pub end: u32,
}

impl GlyphBox {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }
}

/// Where one of the six glyphs lives in the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphRegion {
    Single(GlyphBox),
    /// The last glyph starts near the right edge (`tail`) and continues
    /// at the left edge (`head`)
    Wrapped { tail: GlyphBox, head: GlyphBox },
}

/// Why a captcha could not be cut into six glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    RunCount(usize),
    NarrowFirstGlyph(u32),
}

/// Outcome of segmentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segmentation {
    Glyphs([GlyphRegion; GLYPH_COUNT]),
    Invalid(InvalidReason),
}

/// Cut a binarized captcha into six glyph regions.
pub fn segment(binary: &GrayImage) -> Segmentation {
    let counts = column_ink_counts(binary);
    let boxes = find_glyph_boxes(&counts);

    match boxes.len() {
        GLYPH_COUNT if boxes[0].width() < MIN_GLYPH_WIDTH => {
            Segmentation::Invalid(InvalidReason::NarrowFirstGlyph(boxes[0].width()))
        }
        GLYPH_COUNT => Segmentation::Glyphs(std::array::from_fn(|i| GlyphRegion::Single(boxes[i]))),
        7 => Segmentation::Glyphs(std::array::from_fn(|i| {
            if i < GLYPH_COUNT - 1 {
                GlyphRegion::Single(boxes[i + 1])
            } else {
                GlyphRegion::Wrapped {
                    tail: boxes[GLYPH_COUNT],
                    head: boxes[0],
                }
            }
        })),
        n => Segmentation::Invalid(InvalidReason::RunCount(n)),
    }
}

/// Number of ink pixels in every column
pub fn column_ink_counts(binary: &GrayImage) -> Vec<u32> {
    let mut counts = vec![0u32; binary.width() as usize];
    for (x, _, pixel) in binary.enumerate_pixels() {
        if is_ink(pixel) {
            counts[x as usize] += 1;
        }
    }
    counts
}

/// Raw runs of inked columns, with wide runs split in two
pub fn find_glyph_boxes(counts: &[u32]) -> Vec<GlyphBox> {
    let mut boxes = Vec::new();
    for run in find_runs(counts) {
        if run.width() > MAX_GLYPH_WIDTH {
            let (left, right) = split_bridged(run, counts);
            boxes.push(left);
            boxes.push(right);
        } else {
            boxes.push(run);
        }
    }
    boxes
}

/// Collapse consecutive inked columns into runs.
///
/// A run still inked at the final column is closed there and the final
/// column is left out, unless that would leave the run empty.
pub fn find_runs(counts: &[u32]) -> Vec<GlyphBox> {
    let Some(last) = counts.len().checked_sub(1) else {
        return Vec::new();
    };
    let last = last as u32;

    let mut runs = Vec::new();
    let mut start: Option<u32> = None;

    for (x, &count) in counts.iter().enumerate() {
        let x = x as u32;
        if count > 0 && start.is_none() {
            start = Some(x);
        }

        if let Some(s) = start {
            if count == 0 {
                runs.push(GlyphBox::new(s, x));
                start = None;
            } else if x == last {
                runs.push(GlyphBox::new(s, x.max(s + 1)));
                start = None;
            }
        }
    }

    runs
}

/// Split a run holding two touching glyphs at its thinnest interior column.
///
/// The divider column itself belongs to neither half. Ties go to the
/// leftmost candidate.
pub fn split_bridged(run: GlyphBox, counts: &[u32]) -> (GlyphBox, GlyphBox) {
    let interior = (run.start + SPLIT_MARGIN)..run.end.saturating_sub(SPLIT_MARGIN);
    let divider = interior
        .min_by_key(|&x| counts[x as usize])
        .unwrap_or(run.start + run.width() / 2);

    (
        GlyphBox::new(run.start, divider),
        GlyphBox::new(divider + 1, run.end),
    )
}
