//! Built-in presets seeded into every catalog

use crate::domain::{ExportFormat, ExportQuality, Preset, PresetId, Resolution};

struct Seed {
    id: &'static str,
    name: &'static str,
    format: ExportFormat,
    quality: ExportQuality,
    resolution: (u32, u32),
    bitrate: u32,
    fps: f64,
    audio_bitrate: u32,
    description: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: "youtube_1080p",
        name: "YouTube 1080p",
        format: ExportFormat::Mp4H264,
        quality: ExportQuality::High,
        resolution: (1920, 1080),
        bitrate: 8000,
        fps: 30.0,
        audio_bitrate: 128,
        description: "High quality 1080p video for YouTube",
    },
    Seed {
        id: "youtube_4k",
        name: "YouTube 4K",
        format: ExportFormat::Mp4H265,
        quality: ExportQuality::Ultra,
        resolution: (3840, 2160),
        bitrate: 35000,
        fps: 30.0,
        audio_bitrate: 192,
        description: "Ultra HD 4K video for YouTube",
    },
    Seed {
        id: "instagram_reel",
        name: "Instagram Reel",
        format: ExportFormat::Mp4H264,
        quality: ExportQuality::Medium,
        resolution: (1080, 1920),
        bitrate: 4000,
        fps: 30.0,
        audio_bitrate: 128,
        description: "Vertical video for Instagram Reels",
    },
    Seed {
        id: "tiktok_video",
        name: "TikTok Video",
        format: ExportFormat::Mp4H264,
        quality: ExportQuality::Medium,
        resolution: (1080, 1920),
        bitrate: 3000,
        fps: 30.0,
        audio_bitrate: 128,
        description: "Vertical video for TikTok",
    },
    Seed {
        id: "master_quality",
        name: "Master Quality",
        format: ExportFormat::MovProres,
        quality: ExportQuality::Ultra,
        resolution: (1920, 1080),
        bitrate: 50000,
        fps: 30.0,
        audio_bitrate: 320,
        description: "ProRes master for post-production",
    },
    Seed {
        id: "jianying_draft",
        name: "Jianying Draft",
        format: ExportFormat::JianyingDraft,
        quality: ExportQuality::High,
        resolution: (1920, 1080),
        bitrate: 0,
        fps: 30.0,
        audio_bitrate: 0,
        description: "Editable draft project for Jianying",
    },
];

/// The built-in presets, in seed order
pub fn builtin_presets() -> Vec<Preset> {
    SEEDS
        .iter()
        .filter_map(|seed| {
            let id = PresetId::new(seed.id).ok()?;
            Some(
                Preset::new(
                    id,
                    seed.name,
                    seed.format,
                    seed.quality,
                    Resolution(seed.resolution.0, seed.resolution.1),
                    seed.bitrate,
                    seed.fps,
                    seed.audio_bitrate,
                )
                .with_description(seed.description),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids() {
        let ids: Vec<String> = builtin_presets()
            .into_iter()
            .map(|p| p.id.into_inner())
            .collect();
        assert_eq!(
            ids,
            vec![
                "youtube_1080p",
                "youtube_4k",
                "instagram_reel",
                "tiktok_video",
                "master_quality",
                "jianying_draft"
            ]
        );
    }

    #[test]
    fn test_youtube_1080p_parameters() {
        let preset = builtin_presets()
            .into_iter()
            .find(|p| p.id.as_str() == "youtube_1080p")
            .unwrap();
        assert_eq!(preset.format, ExportFormat::Mp4H264);
        assert_eq!(preset.resolution, Resolution(1920, 1080));
        assert_eq!(preset.bitrate, 8000);
        assert_eq!(preset.audio_bitrate, 128);
    }
}
