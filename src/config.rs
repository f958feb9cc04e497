use std::path::PathBuf;

use crate::decoder::DecodeOptions;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub corpus_dir: PathBuf,
    /// Applied when a request does not override them
    pub defaults: DecodeOptions,
}

/// `<data dir>/captcha-ocr/corpus`, falling back to the temp dir
pub fn default_corpus_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("captcha-ocr")
        .join("corpus")
}
