use std::path::PathBuf;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSource {
    Camera,
    Library,
}

impl MediaSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Library => "library",
        }
    }
}

/// Recording quality requested from the native capture surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoQuality {
    High,
    #[default]
    Medium,
    Low,
    Vga640x480,
    Iframe1280x720,
    Iframe960x540,
}

/// What the native capture surface is asked to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub source: MediaSource,
    pub kinds: Vec<MediaType>,
    pub quality: VideoQuality,
}

/// A picked video, passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VideoInfo {
    pub media_url: PathBuf,
    /// Whatever extra keys the capture surface reported.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureResult {
    Image(RgbaImage),
    Video(VideoInfo),
    /// A payload of a kind the picker does not handle; reported as a cancellation.
    Unrecognized,
    Cancelled,
}

impl CaptureResult {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Unrecognized => "unrecognized",
            Self::Cancelled => "cancelled",
        }
    }
}
