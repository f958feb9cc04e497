//! Image preprocessing ahead of glyph segmentation
//!
//! Captchas arrive as near-binary images; preprocessing collapses them into a
//! strict ink/background grid.

pub mod pipeline;
pub mod steps;

pub use pipeline::{Pipeline, StepTiming};
pub use steps::binarize::{is_ink, BACKGROUND, DEFAULT_THRESHOLD, INK};
