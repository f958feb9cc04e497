use image::DynamicImage;
use std::path::PathBuf;

use crate::error::CaptchaError;

/// Somewhere a captcha image can be acquired from
pub trait ImageSource: Send + Sync {
    /// Human-readable origin, used in logs
    fn describe(&self) -> String;

    /// Fetch and decode the image
    fn load(&self) -> Result<DynamicImage, CaptchaError>;
}

/// Image file on disk
#[derive(Debug, Clone)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for PathSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<DynamicImage, CaptchaError> {
        image::open(&self.path).map_err(|e| {
            CaptchaError::ImageLoad(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Encoded image already in memory
#[derive(Debug, Clone)]
pub struct BytesSource {
    bytes: Vec<u8>,
}

impl BytesSource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ImageSource for BytesSource {
    fn describe(&self) -> String {
        format!("<{} bytes>", self.bytes.len())
    }

    fn load(&self) -> Result<DynamicImage, CaptchaError> {
        image::load_from_memory(&self.bytes).map_err(|e| CaptchaError::ImageLoad(e.to_string()))
    }
}

/// Image served over HTTP(S)
#[derive(Debug, Clone)]
pub struct UrlSource {
    url: String,
}

impl UrlSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ImageSource for UrlSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> Result<DynamicImage, CaptchaError> {
        let response = ureq::get(&self.url)
            .call()
            .map_err(|e| CaptchaError::Fetch(format!("{}: {}", self.url, e)))?;

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        check_content_type(&content_type)?;

        let body = response
            .into_body()
            .read_to_vec()
            .map_err(|e| CaptchaError::Fetch(format!("Failed to read response body: {}", e)))?;

        tracing::debug!("Fetched {} bytes ({}) from {}", body.len(), content_type, self.url);

        BytesSource::new(body).load()
    }
}

/// Only `image/*` responses are decoded
fn check_content_type(content_type: &str) -> Result<(), CaptchaError> {
    if content_type.to_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(CaptchaError::UnsupportedContentType(content_type.to_string()))
    }
}

/// URL for `http(s)://` arguments, file path otherwise
pub fn source_from_arg(arg: &str) -> Box<dyn ImageSource> {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        Box::new(UrlSource::new(arg))
    } else {
        Box::new(PathSource::new(arg))
    }
}
