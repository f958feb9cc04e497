//! Solver for six-letter distorted captchas.
//!
//! Each captcha is binarized, cut into six glyphs by scanning its column
//! ink profile, and every glyph's trimmed bitmap is looked up as an exact
//! fingerprint in a per-letter corpus.

pub mod config;
pub mod corpus;
pub mod decoder;
pub mod error;
pub mod fingerprint;
pub mod glyph;
pub mod preprocessing;
pub mod segment;
pub mod server;
pub mod source;

#[cfg(test)]
mod test_utils;

pub use corpus::Corpus;
pub use decoder::{DecodeOptions, DecodeResult, Decoded, Decoder, OutputMode, Solution};
pub use error::CaptchaError;
pub use fingerprint::Fingerprint;
pub use glyph::GlyphImage;
