use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::time::Instant;

use super::steps;

/// Timing information for a single decode stage
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Grayscale + binarization ahead of segmentation
pub struct Pipeline {
    threshold: u8,
}

impl Pipeline {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Produce the binarized grid for an acquired captcha image
    pub fn process(&self, image: &DynamicImage, timings: &mut Vec<StepTiming>) -> GrayImage {
        let gray = run_step("grayscale", timings, || steps::grayscale::apply(image));
        let threshold = self.threshold;
        run_step("binarize", timings, || steps::binarize::apply(&gray, threshold))
    }
}

/// Run one stage and record how long it took
pub(crate) fn run_step<T, F>(name: &str, timings: &mut Vec<StepTiming>, step_fn: F) -> T
where
    F: FnOnce() -> T,
{
    let step_start = Instant::now();
    let result = step_fn();
    timings.push(StepTiming {
        name: name.to_string(),
        time_ms: step_start.elapsed().as_millis() as u64,
    });
    result
}
