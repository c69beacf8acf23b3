//! ffmpeg binary discovery and argument construction

use crate::config::TranscodeConfig;
use crate::domain::{EngineError, ExportFormat, Job, Preset};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Locate the ffmpeg binary
///
/// Order: explicit `ffmpeg_path` (a path or a bare name looked up on `PATH`),
/// then `ffmpeg` on `PATH`, then each configured search path.
///
/// # Errors
///
/// Returns [`EngineError::BinaryNotFound`] listing every place tried.
pub fn resolve_binary(config: &TranscodeConfig) -> Result<PathBuf, EngineError> {
    let mut tried = Vec::new();

    if let Some(explicit) = &config.ffmpeg_path {
        if explicit.is_file() {
            return Ok(explicit.clone());
        }
        if let Ok(found) = which::which(explicit) {
            return Ok(found);
        }
        // An explicit path that does not exist is not silently replaced
        return Err(EngineError::BinaryNotFound(explicit.display().to_string()));
    }

    match which::which("ffmpeg") {
        Ok(found) => return Ok(found),
        Err(_) => tried.push("ffmpeg on PATH".to_string()),
    }

    for candidate in &config.search_paths {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
        tried.push(candidate.display().to_string());
    }

    Err(EngineError::BinaryNotFound(tried.join(", ")))
}

/// Input media path from `metadata.input_file`
pub fn input_file(job: &Job) -> Result<PathBuf, EngineError> {
    match job.metadata.get("input_file") {
        Some(Value::String(path)) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        Some(_) => Err(EngineError::InvalidJob(
            "metadata.input_file must be a non-empty string".to_string(),
        )),
        None => Err(EngineError::InvalidJob(
            "metadata.input_file is required for transcoding".to_string(),
        )),
    }
}

/// Hardware encoder family selected by a preset hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwAccel {
    Nvenc,
    Qsv,
    VideoToolbox,
}

impl HwAccel {
    /// Parse a preset's hint; unknown hints yield `None`
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.to_ascii_lowercase().as_str() {
            "cuda" | "nvenc" => Some(HwAccel::Nvenc),
            "qsv" => Some(HwAccel::Qsv),
            "videotoolbox" => Some(HwAccel::VideoToolbox),
            _ => None,
        }
    }

    fn input_flags(&self) -> &'static [&'static str] {
        match self {
            HwAccel::Nvenc => &["-hwaccel", "cuda"],
            HwAccel::Qsv => &["-hwaccel", "qsv"],
            HwAccel::VideoToolbox => &["-hwaccel", "videotoolbox"],
        }
    }

    fn encoder(&self, hevc: bool) -> &'static str {
        match (self, hevc) {
            (HwAccel::Nvenc, false) => "h264_nvenc",
            (HwAccel::Nvenc, true) => "hevc_nvenc",
            (HwAccel::Qsv, false) => "h264_qsv",
            (HwAccel::Qsv, true) => "hevc_qsv",
            (HwAccel::VideoToolbox, false) => "h264_videotoolbox",
            (HwAccel::VideoToolbox, true) => "hevc_videotoolbox",
        }
    }
}

/// Hardware acceleration that applies to this preset, if any
///
/// Only H.264/H.265 outputs have hardware encoders.
fn hw_accel_for(preset: &Preset) -> Option<HwAccel> {
    let accel = HwAccel::from_hint(preset.hw_acceleration.as_deref()?)?;
    matches!(
        preset.format,
        ExportFormat::Mp4H264 | ExportFormat::Mp4H265 | ExportFormat::MkvH264
    )
    .then_some(accel)
}

fn push(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| s.to_string()));
}

/// Build the ffmpeg argument list (without the binary) for a job
pub fn build_args(preset: &Preset, input: &Path, output: &Path) -> Vec<String> {
    let mut args = vec!["-hide_banner".to_string()];
    let hw = hw_accel_for(preset);

    if let Some(accel) = hw {
        push(&mut args, accel.input_flags());
    }

    args.push("-i".to_string());
    args.push(input.display().to_string());

    video_args(&mut args, preset, hw);

    let is_gif = preset.format == ExportFormat::GifAnimated;
    let audio_only = preset.format.is_audio_only();

    if !audio_only && !is_gif {
        if preset.resolution.is_set() {
            args.push("-s".to_string());
            args.push(preset.resolution.to_string());
        }
        if preset.fps > 0.0 {
            args.push("-r".to_string());
            args.push(format_number(preset.fps));
        }
        if preset.bitrate > 0 {
            args.push("-b:v".to_string());
            args.push(format!("{}k", preset.bitrate));
        }
    }

    if !is_gif {
        audio_args(&mut args, preset);
    }

    for (key, value) in &preset.codec_params {
        let flag = if key.starts_with('-') {
            key.clone()
        } else {
            format!("-{key}")
        };
        args.push(flag);
        args.push(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
    }

    args.push("-y".to_string());
    args.push(output.display().to_string());
    args
}

fn video_args(args: &mut Vec<String>, preset: &Preset, hw: Option<HwAccel>) {
    match preset.format {
        ExportFormat::Mp4H264 | ExportFormat::MkvH264 => match hw {
            Some(accel) => push(args, &["-c:v", accel.encoder(false)]),
            None => push(
                args,
                &["-c:v", "libx264", "-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"],
            ),
        },
        ExportFormat::Mp4H265 => match hw {
            Some(accel) => push(args, &["-c:v", accel.encoder(true)]),
            None => push(
                args,
                &["-c:v", "libx265", "-preset", "medium", "-crf", "28", "-pix_fmt", "yuv420p"],
            ),
        },
        ExportFormat::MovProres => push(args, &["-c:v", "prores_ks", "-profile:v", "3"]),
        ExportFormat::AviUncompressed => push(args, &["-c:v", "rawvideo"]),
        ExportFormat::WebmVp9 => push(args, &["-c:v", "libvpx-vp9", "-crf", "30"]),
        ExportFormat::GifAnimated => {
            let fps = if preset.fps > 0.0 {
                format_number(preset.fps)
            } else {
                "10".to_string()
            };
            let width = if preset.resolution.is_set() {
                preset.resolution.width().to_string()
            } else {
                "-1".to_string()
            };
            args.push("-vf".to_string());
            args.push(format!(
                "fps={fps},scale={width}:-1:flags=lanczos,split[s0][s1];[s0]palettegen[p];[s1][p]paletteuse"
            ));
            push(args, &["-loop", "0", "-an"]);
        }
        ExportFormat::Mp3Audio | ExportFormat::WavAudio => args.push("-vn".to_string()),
        ExportFormat::JianyingDraft => {}
    }
}

fn audio_args(args: &mut Vec<String>, preset: &Preset) {
    let codec = match preset.format {
        ExportFormat::Mp3Audio => "libmp3lame",
        ExportFormat::WavAudio | ExportFormat::MovProres | ExportFormat::AviUncompressed => {
            "pcm_s16le"
        }
        ExportFormat::WebmVp9 => "libopus",
        _ => "aac",
    };
    push(args, &["-c:a", codec]);

    // PCM has no bitrate knob
    if codec != "pcm_s16le" && preset.audio_bitrate > 0 {
        args.push("-b:a".to_string());
        args.push(format!("{}k", preset.audio_bitrate));
    }
}

/// Render whole-number frame rates without a trailing `.0`
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExportQuality, PresetId, Resolution};

    fn preset(format: ExportFormat) -> Preset {
        Preset::new(
            PresetId::new("p").unwrap(),
            "P",
            format,
            ExportQuality::High,
            Resolution(1920, 1080),
            8000,
            30.0,
            128,
        )
    }

    fn args_for(preset: &Preset) -> Vec<String> {
        build_args(preset, Path::new("in.mov"), Path::new("out.bin"))
    }

    fn window(args: &[String], needle: &[&str]) -> bool {
        args.windows(needle.len()).any(|w| w.iter().zip(needle).all(|(a, b)| a == b))
    }

    #[test]
    fn test_h264_software_args() {
        let args = args_for(&preset(ExportFormat::Mp4H264));
        assert!(window(&args, &["-i", "in.mov"]));
        assert!(window(&args, &["-c:v", "libx264", "-preset", "medium", "-crf", "23"]));
        assert!(window(&args, &["-s", "1920x1080"]));
        assert!(window(&args, &["-r", "30"]));
        assert!(window(&args, &["-b:v", "8000k"]));
        assert!(window(&args, &["-c:a", "aac", "-b:a", "128k"]));
        assert_eq!(&args[args.len() - 2..], &["-y".to_string(), "out.bin".to_string()]);
        assert!(!args.contains(&"-hwaccel".to_string()));
    }

    #[test]
    fn test_hw_hint_selects_hardware_encoder() {
        let args = args_for(&preset(ExportFormat::Mp4H265).with_hw_acceleration("cuda"));
        assert!(window(&args, &["-hwaccel", "cuda", "-i", "in.mov"]));
        assert!(window(&args, &["-c:v", "hevc_nvenc"]));

        let args = args_for(&preset(ExportFormat::Mp4H264).with_hw_acceleration("videotoolbox"));
        assert!(window(&args, &["-c:v", "h264_videotoolbox"]));
    }

    #[test]
    fn test_hw_hint_ignored_for_other_formats() {
        let args = args_for(&preset(ExportFormat::MovProres).with_hw_acceleration("qsv"));
        assert!(!args.contains(&"-hwaccel".to_string()));
        assert!(window(&args, &["-c:v", "prores_ks", "-profile:v", "3"]));
        assert!(window(&args, &["-c:a", "pcm_s16le"]));
        assert!(!args.contains(&"-b:a".to_string()));
    }

    #[test]
    fn test_gif_args() {
        let args = args_for(&preset(ExportFormat::GifAnimated));
        assert!(window(&args, &["-loop", "0", "-an"]));
        assert!(args.iter().any(|a| a.contains("palettegen")));
        assert!(!args.contains(&"-b:v".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
    }

    #[test]
    fn test_audio_only_args() {
        let args = args_for(&preset(ExportFormat::Mp3Audio));
        assert!(window(&args, &["-vn", "-c:a", "libmp3lame", "-b:a", "128k"]));
        assert!(!args.contains(&"-s".to_string()));

        let args = args_for(&preset(ExportFormat::WavAudio));
        assert!(window(&args, &["-c:a", "pcm_s16le"]));
    }

    #[test]
    fn test_webm_uses_opus() {
        let args = args_for(&preset(ExportFormat::WebmVp9));
        assert!(window(&args, &["-c:v", "libvpx-vp9", "-crf", "30"]));
        assert!(window(&args, &["-c:a", "libopus"]));
    }

    #[test]
    fn test_codec_params_appended() {
        let p = preset(ExportFormat::Mp4H264)
            .with_codec_param("tune", "film")
            .with_codec_param("-g", 60);
        let args = args_for(&p);
        assert!(window(&args, &["-tune", "film"]));
        assert!(window(&args, &["-g", "60"]));
    }

    #[test]
    fn test_fractional_fps() {
        let mut p = preset(ExportFormat::Mp4H264);
        p.fps = 29.97;
        assert!(window(&args_for(&p), &["-r", "29.97"]));
    }

    #[test]
    fn test_input_file_required() {
        let job = Job::new("p", "/tmp/out.mp4", preset(ExportFormat::Mp4H264));
        assert!(matches!(input_file(&job), Err(EngineError::InvalidJob(_))));
    }

    #[test]
    fn test_explicit_missing_binary_is_not_found() {
        let config = TranscodeConfig {
            ffmpeg_path: Some(PathBuf::from("/definitely/not/here/ffmpeg")),
            ..TranscodeConfig::default()
        };
        assert!(matches!(
            resolve_binary(&config),
            Err(EngineError::BinaryNotFound(_))
        ));
    }
}
