//! Glyph fingerprints
//!
//! A fingerprint is the glyph's ink pattern written row-major as ASCII
//! `'1'` (ink) / `'0'` (background) and zlib-compressed. Fingerprints are
//! only ever compared for exact equality.

use base64::{engine::general_purpose, Engine as _};
use flate2::{write::ZlibEncoder, Compression};
use std::fmt;
use std::io::Write;

use crate::error::CaptchaError;
use crate::glyph::GlyphImage;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<u8>);

impl Fingerprint {
    /// Encode a trimmed glyph
    ///
    /// Only the bit string is encoded, not the dimensions, so two glyphs of
    /// different shape with the same row-major bits share a fingerprint.
    pub fn of(glyph: &GlyphImage) -> Result<Self, CaptchaError> {
        let bits: Vec<u8> = glyph
            .ink_bits()
            .map(|ink| if ink { b'1' } else { b'0' })
            .collect();
        Self::from_bit_string(&bits)
    }

    /// Compress an ASCII `'0'`/`'1'` bit string
    pub fn from_bit_string(bits: &[u8]) -> Result<Self, CaptchaError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(bits).map_err(compression_error)?;
        let compressed = encoder.finish().map_err(compression_error)?;
        Ok(Self(compressed))
    }

    /// Parse the textual form stored in corpus files
    pub fn from_base64(text: &str) -> Result<Self, base64::DecodeError> {
        general_purpose::STANDARD.decode(text.trim()).map(Self)
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn compression_error(e: std::io::Error) -> CaptchaError {
    CaptchaError::Internal(format!("Failed to compress glyph: {}", e))
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}
