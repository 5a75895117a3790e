//! Content category derivation.

use serde::{Deserialize, Serialize};

/// Broad content category used for icons and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Raster or vector image.
    Image,
    /// Video.
    Video,
    /// Audio.
    Audio,
    /// Anything else.
    #[default]
    Document,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tif", "tiff", "heic", "ico",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v", "wmv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma"];

impl ContentCategory {
    /// Derive from a MIME type. Returns `None` for generic or unknown types
    /// so the caller can fall back to the file extension.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim().to_lowercase();
        match top.as_str() {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "text" => Some(Self::Document),
            "application" if mime != "application/octet-stream" => Some(Self::Document),
            _ => None,
        }
    }

    /// Derive from a file name's extension.
    pub fn from_name(name: &str) -> Self {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return Self::Document;
        };
        let ext = ext.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else {
            Self::Document
        }
    }

    /// Prefer a definitive MIME type, otherwise use the extension.
    pub fn derive(name: &str, content_type: Option<&str>) -> Self {
        content_type
            .and_then(Self::from_mime)
            .unwrap_or_else(|| Self::from_name(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}
