//! ffmpeg command construction and execution.
//!
//! The images are handed to ffmpeg through the concat demuxer (see
//! [`crate::manifest`]) so any file names work, in the order the scan
//! produced, without relying on a numbered glob pattern.
//!
//! ## Codec defaults
//!
//! | Codec | crf | pix_fmt | Extra |
//! |-------|-----|---------|-------|
//! | `libx264*` | 16 (0 with `--lossless`) | `yuv420p` (`yuv444p` with `--lossless`) | |
//! | `libx265*` | 22 | `yuv420p` | `-tag:v hvc1` when writing `.mp4` |
//! | `prores_ks` | n/a | `yuv422p10le` | `-profile:v 3`, crf/preset ignored |
//! | anything else | 16 | `yuv420p` | |
//!
//! Explicit `crf` / `pix_fmt` values always win over the lossless defaults.
//!
//! ## Filters
//!
//! `--size WxH` scales to width `W` with Lanczos, keeping the aspect ratio.
//! A final filter always rounds both dimensions up to even numbers, which
//! yuv420p and most codecs require.

use crate::config::{ConfigError, EncodeConfig, FrameSize};
use crate::manifest::{self, ConcatManifest};
use crate::output;
use crate::scan::{ImageEntry, ScanError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("No images found in {0}")]
    NoImagesFound(PathBuf),
    #[error("ffmpeg not found on PATH. Install ffmpeg or pass --ffmpeg PATH.")]
    MissingDependency,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not start {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        source: std::io::Error,
    },
    #[error("ffmpeg failed ({})", exit_label(.code))]
    ExternalProcessFailure { code: Option<i32>, command: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

impl EncodeError {
    /// Process exit status for this error.
    ///
    /// `2` bad input folder, `3` no images, ffmpeg's own code when it fails,
    /// `1` for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            EncodeError::Scan(ScanError::InvalidDirectory(_)) => 2,
            EncodeError::NoImagesFound(_) => 3,
            EncodeError::ExternalProcessFailure { code: Some(c), .. } => {
                u8::try_from(*c).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}

pub const LOSSLESS_CRF: f64 = 0.0;
pub const LOSSLESS_PIX_FMT: &str = "yuv444p";
pub const DEFAULT_PIX_FMT: &str = "yuv420p";
pub const X264_CRF: f64 = 16.0;
pub const X265_CRF: f64 = 22.0;

const PRORES_CODEC: &str = "prores_ks";
const PRORES_PROFILE: &str = "3";
const PRORES_PIX_FMT: &str = "yuv422p10le";

/// crf and pixel format after applying codec and lossless defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Quality {
    pub crf: f64,
    pub pix_fmt: String,
}

pub fn resolve_quality(
    codec: &str,
    lossless: bool,
    crf: Option<f64>,
    pix_fmt: Option<&str>,
) -> Quality {
    let lossless = lossless && codec.starts_with("libx264");
    let crf = crf.unwrap_or(if lossless {
        LOSSLESS_CRF
    } else if codec.starts_with("libx265") {
        X265_CRF
    } else {
        X264_CRF
    });
    let default_pix_fmt = if lossless {
        LOSSLESS_PIX_FMT
    } else {
        DEFAULT_PIX_FMT
    };
    let pix_fmt = pix_fmt.unwrap_or(default_pix_fmt).to_string();
    Quality { crf, pix_fmt }
}

/// The `-vf` filter chain.
pub fn filter_chain(size: Option<FrameSize>) -> String {
    let mut filters = Vec::new();
    if let Some(size) = size {
        filters.push(format!("scale={}:-2:flags=lanczos", size.width));
    }
    filters.push("scale=ceil(iw/2)*2:ceil(ih/2)*2".to_string());
    filters.join(",")
}

fn wants_hvc1_tag(codec: &str, output: &Path) -> bool {
    codec.starts_with("libx265")
        && output
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
}

/// A ready-to-run ffmpeg invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl FfmpegCommand {
    fn parts(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
    }

    /// Space-joined, with arguments containing spaces in double quotes.
    pub fn display_line(&self) -> String {
        self.parts()
            .map(|p| if p.contains(' ') { format!("\"{p}\"") } else { p })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Space-joined, no quoting.
    pub fn plain_line(&self) -> String {
        self.parts().collect::<Vec<_>>().join(" ")
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }

    /// Value following `flag`, if present.
    pub fn flag_value(&self, flag: &str) -> Option<String> {
        self.args
            .windows(2)
            .find(|w| w[0] == flag)
            .map(|w| w[1].to_string_lossy().into_owned())
    }

    /// Run to completion, inheriting stdio.
    pub fn run(&self) -> Result<(), EncodeError> {
        log::info!("running {}", self.plain_line());
        let status = Command::new(&self.program)
            .args(&self.args)
            .status()
            .map_err(|source| EncodeError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(EncodeError::ExternalProcessFailure {
                code: status.code(),
                command: self.plain_line(),
            })
        }
    }
}

/// Build the ffmpeg command reading `manifest_path`.
pub fn build_command(ffmpeg: &Path, manifest_path: &Path, cfg: &EncodeConfig) -> FfmpegCommand {
    let mut args: Vec<OsString> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(manifest_path.as_os_str().to_owned());
    args.push("-r".into());
    args.push(manifest::format_decimal(cfg.fps).into());
    args.push("-vf".into());
    args.push(filter_chain(cfg.size).into());

    if cfg.codec == PRORES_CODEC {
        for a in [
            "-c:v",
            PRORES_CODEC,
            "-profile:v",
            PRORES_PROFILE,
            "-pix_fmt",
            PRORES_PIX_FMT,
        ] {
            args.push(a.into());
        }
    } else {
        let quality = resolve_quality(&cfg.codec, cfg.lossless, cfg.crf, cfg.pix_fmt.as_deref());
        for a in [
            "-c:v".to_string(),
            cfg.codec.clone(),
            "-crf".to_string(),
            quality.crf.to_string(),
            "-preset".to_string(),
            cfg.preset.clone(),
            "-pix_fmt".to_string(),
            quality.pix_fmt,
        ] {
            args.push(a.into());
        }
    }

    if wants_hvc1_tag(&cfg.codec, &cfg.output) {
        args.push("-tag:v".into());
        args.push("hvc1".into());
    }

    args.push(cfg.output.as_os_str().to_owned());

    FfmpegCommand {
        program: ffmpeg.to_path_buf(),
        args,
    }
}

// ============================================================================
// Encoder discovery
// ============================================================================

/// Locate ffmpeg: an explicit path is used as given, otherwise `PATH` is
/// searched.
pub fn find_ffmpeg(explicit: Option<&Path>) -> Result<PathBuf, EncodeError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let path_var = std::env::var_os("PATH").ok_or(EncodeError::MissingDependency)?;
    find_in_paths(&path_var, "ffmpeg").ok_or(EncodeError::MissingDependency)
}

fn find_in_paths(path_var: &std::ffi::OsStr, program: &str) -> Option<PathBuf> {
    let file_name = format!("{program}{}", std::env::consts::EXE_SUFFIX);
    std::env::split_paths(path_var)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// Pipeline
// ============================================================================

/// Write the manifest, build the command, then print it (dry run) or run it.
///
/// The manifest lives in a scratch directory removed on return, whether
/// ffmpeg succeeded or not.
pub fn encode(
    cfg: &EncodeConfig,
    images: &[ImageEntry],
    ffmpeg: &Path,
) -> Result<FfmpegCommand, EncodeError> {
    if images.is_empty() {
        return Err(EncodeError::NoImagesFound(cfg.input.clone()));
    }

    let scratch = tempfile::Builder::new().prefix("img2vid-").tempdir()?;
    let manifest_path = scratch.path().join("list.txt");
    ConcatManifest::from_images(images, cfg.fps)?.write_to(&manifest_path)?;

    let command = build_command(ffmpeg, &manifest_path, cfg);

    if cfg.dry_run {
        output::print_lines(&[command.display_line()]);
        return Ok(command);
    }

    output::print_lines(&output::format_encode_start(images.len(), &cfg.output));
    command.run()?;
    output::print_lines(&output::format_encode_done());
    Ok(command)
}
