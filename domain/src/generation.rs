use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

const DEFAULT_STYLE: &str = "default";

/// Builds the text prompt sent alongside the image: `in <style> style`.
pub fn style_prompt(style: Option<&str>) -> String {
    let style = style
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STYLE);
    format!("in {style} style")
}

/// Keeps a declared `image/*` content type, otherwise uses `fallback`.
pub fn resolve_media_type(declared: Option<&str>, fallback: &str) -> String {
    match declared.map(str::trim) {
        Some(media_type) if media_type.starts_with("image/") => media_type.to_string(),
        _ => fallback.to_string(),
    }
}

/// An upload held in transient storage for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    pub id: Uuid,
    pub media_type: String,
}

impl StagedUpload {
    pub fn new(media_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            media_type: media_type.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> DomainResult<Self> {
        let media_type = media_type.into();
        if !media_type.starts_with("image/") {
            return Err(DomainError::InvalidMediaType(media_type));
        }
        if bytes.is_empty() {
            return Err(DomainError::MissingField("image".to_string()));
        }
        Ok(Self { bytes, media_type })
    }

    /// `data:<media-type>;base64,<payload>`, embeddable in a JSON body.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Debug, Clone)]
pub struct GenerationInput {
    pub prompt: String,
    pub image_data_uri: String,
}

/// Inference output: either a single URL or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationOutput {
    Single(String),
    Many(Vec<String>),
}

impl GenerationOutput {
    pub fn into_first_url(self) -> Option<String> {
        match self {
            Self::Single(url) => Some(url),
            Self::Many(urls) => urls.into_iter().next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub credits_left: u64,
}
