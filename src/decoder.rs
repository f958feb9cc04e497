//! Captcha decoding: binarize, segment, fingerprint, match.

use image::DynamicImage;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::corpus::Corpus;
use crate::error::CaptchaError;
use crate::fingerprint::Fingerprint;
use crate::glyph::GlyphImage;
use crate::preprocessing::pipeline::run_step;
use crate::preprocessing::{Pipeline, StepTiming, DEFAULT_THRESHOLD};
use crate::segment::{segment, Segmentation};

/// Rendered in `string` mode when any glyph is unknown
pub const NOT_SOLVED: &str = "Not solved";
/// Rendered in `string` mode when segmentation fails
pub const STRUCTURAL_ERROR: &str = "Error";

/// How a decode outcome is presented to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// `"ABCDEF"`, or a sentinel string
    #[default]
    String,
    /// `{"1": "A", ..}` when solved, otherwise a sentinel string
    PerSlotMap,
    /// `{"1": "A", ..}` always, with `""` for unknown glyphs
    RawPerSlotMap,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::PerSlotMap => "per-slot-map",
            Self::RawPerSlotMap => "raw-per-slot-map",
        }
    }
}

impl FromStr for OutputMode {
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(Self::String),
            "per-slot-map" | "dict" => Ok(Self::PerSlotMap),
            "raw-per-slot-map" | "raw_dict" => Ok(Self::RawPerSlotMap),
            other => Err(CaptchaError::InvalidConfig(format!(
                "Unknown output mode: {} (expected {}, {} or {})",
                other,
                Self::String.as_str(),
                Self::PerSlotMap.as_str(),
                Self::RawPerSlotMap.as_str()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Highest luminance still counted as ink
    pub threshold: u8,
    pub output_mode: OutputMode,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            output_mode: OutputMode::default(),
        }
    }
}

/// Final state of one decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    Solved(String),
    /// Six glyphs were found but at least one is not in the corpus
    NotSolved,
    /// The image could not be cut into six glyphs
    Invalid,
}

impl DecodeResult {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Solved(_) => "solved",
            Self::NotSolved => "not_solved",
            Self::Invalid => "invalid",
        }
    }
}

/// Rendered answer for one output mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Solution {
    Text(String),
    Slots(BTreeMap<String, String>),
}

/// Everything one decode produced
#[derive(Debug, Clone)]
pub struct Decoded {
    pub result: DecodeResult,
    /// Matched letter per slot 1..6; empty when segmentation failed
    pub slots: Vec<Option<char>>,
    pub steps: Vec<StepTiming>,
}

impl Decoded {
    pub fn render(&self, mode: OutputMode) -> Solution {
        match (mode, &self.result) {
            (OutputMode::RawPerSlotMap, _) => Solution::Slots(self.slot_map()),
            (OutputMode::String, DecodeResult::Solved(text)) => Solution::Text(text.clone()),
            (OutputMode::PerSlotMap, DecodeResult::Solved(_)) => Solution::Slots(self.slot_map()),
            (_, DecodeResult::NotSolved) => Solution::Text(NOT_SOLVED.to_string()),
            (_, DecodeResult::Invalid) => Solution::Text(STRUCTURAL_ERROR.to_string()),
        }
    }

    fn slot_map(&self) -> BTreeMap<String, String> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, letter)| {
                let value = letter.map(String::from).unwrap_or_default();
                ((i + 1).to_string(), value)
            })
            .collect()
    }
}

/// Decodes captchas against a shared corpus
#[derive(Debug, Clone)]
pub struct Decoder {
    corpus: Arc<Corpus>,
}

impl Decoder {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        Self { corpus }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Run the full pipeline on an acquired image
    pub fn decode(
        &self,
        image: &DynamicImage,
        options: &DecodeOptions,
    ) -> Result<Decoded, CaptchaError> {
        let mut steps = Vec::new();

        let binary = Pipeline::new(options.threshold).process(image, &mut steps);
        let segmentation = run_step("segment", &mut steps, || segment(&binary));

        let regions = match segmentation {
            Segmentation::Glyphs(regions) => regions,
            Segmentation::Invalid(reason) => {
                tracing::debug!("Segmentation failed: {:?}", reason);
                return Ok(Decoded {
                    result: DecodeResult::Invalid,
                    slots: Vec::new(),
                    steps,
                });
            }
        };

        let slots = run_step("match", &mut steps, || {
            regions
                .iter()
                .map(|region| {
                    let glyph = GlyphImage::extract(&binary, region);
                    let fingerprint = Fingerprint::of(&glyph)?;
                    Ok(self.corpus.lookup(&fingerprint))
                })
                .collect::<Result<Vec<_>, CaptchaError>>()
        })?;

        let result = match slots.iter().copied().collect::<Option<String>>() {
            Some(text) => DecodeResult::Solved(text),
            None => {
                tracing::debug!(
                    "{} of {} glyphs unmatched",
                    slots.iter().filter(|s| s.is_none()).count(),
                    slots.len()
                );
                DecodeResult::NotSolved
            }
        };

        Ok(Decoded {
            result,
            slots,
            steps,
        })
    }

    /// Decode and render in the configured output mode
    pub fn solve(
        &self,
        image: &DynamicImage,
        options: &DecodeOptions,
    ) -> Result<Solution, CaptchaError> {
        Ok(self.decode(image, options)?.render(options.output_mode))
    }
}
