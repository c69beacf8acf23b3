//! Export preset model
//!
//! A preset is a named bundle of output parameters. Presets are values: a job
//! copies the preset it was submitted with, and editing a preset in the
//! catalog means replacing it.

use crate::domain::ids::PresetId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Output format family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Mp4H264,
    Mp4H265,
    MovProres,
    AviUncompressed,
    MkvH264,
    WebmVp9,
    GifAnimated,
    Mp3Audio,
    WavAudio,
    JianyingDraft,
}

impl ExportFormat {
    /// Every known format, in declaration order
    pub const ALL: [ExportFormat; 10] = [
        ExportFormat::Mp4H264,
        ExportFormat::Mp4H265,
        ExportFormat::MovProres,
        ExportFormat::AviUncompressed,
        ExportFormat::MkvH264,
        ExportFormat::WebmVp9,
        ExportFormat::GifAnimated,
        ExportFormat::Mp3Audio,
        ExportFormat::WavAudio,
        ExportFormat::JianyingDraft,
    ];

    /// The tag used in preset files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Mp4H264 => "mp4_h264",
            ExportFormat::Mp4H265 => "mp4_h265",
            ExportFormat::MovProres => "mov_prores",
            ExportFormat::AviUncompressed => "avi_uncompressed",
            ExportFormat::MkvH264 => "mkv_h264",
            ExportFormat::WebmVp9 => "webm_vp9",
            ExportFormat::GifAnimated => "gif_animated",
            ExportFormat::Mp3Audio => "mp3_audio",
            ExportFormat::WavAudio => "wav_audio",
            ExportFormat::JianyingDraft => "jianying_draft",
        }
    }

    /// Audio-only outputs carry no video stream
    pub fn is_audio_only(&self) -> bool {
        matches!(self, ExportFormat::Mp3Audio | ExportFormat::WavAudio)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.as_str()).collect();
                format!("Unknown export format '{}'. Must be one of: {}", s, known.join(", "))
            })
    }
}

/// Quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportQuality {
    /// 480p, 1-2 Mbps
    Low,
    /// 720p, 3-5 Mbps
    Medium,
    /// 1080p, 8-12 Mbps
    High,
    /// 4K, 20-50 Mbps
    Ultra,
    Custom,
}

/// Target frame size, serialized as `[width, height]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution(pub u32, pub u32);

impl Resolution {
    pub fn width(&self) -> u32 {
        self.0
    }

    pub fn height(&self) -> u32 {
        self.1
    }

    /// Both dimensions are non-zero
    pub fn is_set(&self) -> bool {
        self.0 > 0 && self.1 > 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.0, self.1)
    }
}

/// Named export configuration
///
/// Serialized field layout matches the preset file: `{id, name, format,
/// quality, resolution: [w, h], bitrate, fps, audio_bitrate, codec_params,
/// description}`, plus `supports_alpha` and `hw_acceleration` when they differ
/// from their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    pub format: ExportFormat,
    pub quality: ExportQuality,
    pub resolution: Resolution,
    /// Target video bitrate in kbit/s (0 = encoder default)
    pub bitrate: u32,
    pub fps: f64,
    /// Target audio bitrate in kbit/s (0 = encoder default)
    pub audio_bitrate: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub supports_alpha: bool,
    /// Hardware acceleration hint: `cuda`, `nvenc`, `qsv` or `videotoolbox`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hw_acceleration: Option<String>,
    /// Extra encoder arguments, passed through as `-key value`
    #[serde(default)]
    pub codec_params: Map<String, Value>,
    #[serde(default)]
    pub description: String,
}

impl Preset {
    /// Creates a preset with empty codec parameters and description
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PresetId,
        name: impl Into<String>,
        format: ExportFormat,
        quality: ExportQuality,
        resolution: Resolution,
        bitrate: u32,
        fps: f64,
        audio_bitrate: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            format,
            quality,
            resolution,
            bitrate,
            fps,
            audio_bitrate,
            supports_alpha: false,
            hw_acceleration: None,
            codec_params: Map::new(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_hw_acceleration(mut self, hint: impl Into<String>) -> Self {
        self.hw_acceleration = Some(hint.into());
        self
    }

    pub fn with_codec_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.codec_params.insert(key.into(), value.into());
        self
    }

    pub fn with_alpha(mut self) -> Self {
        self.supports_alpha = true;
        self
    }
}
