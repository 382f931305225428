//! Run configuration for both tools.
//!
//! Flags are parsed by clap in the binaries, then turned into an immutable
//! [`EncodeConfig`] or [`BounceConfig`] here. Every cross-flag rule is checked
//! in one place and all violations are reported together, before any file is
//! read or written.
//!
//! ## Encoder defaults file
//!
//! The encoder layers its settings:
//!
//! ```text
//! stock defaults  →  <input>/img2vid.toml  →  command-line flags
//! ```
//!
//! The file is optional and sparse; set only what differs for that folder:
//!
//! ```toml
//! fps = 24
//! codec = "libx265"
//! exts = ["png"]
//! ```
//!
//! Unknown keys are rejected to catch typos early. A `crf` or `pix_fmt` set in
//! the file counts as explicit and survives `--lossless`, like the flags do.

use crate::range::{RangeError, RangeSpec};
use crate::scan::{self, BOUNCE_EXTENSIONS, ENCODE_EXTENSIONS};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Name of the per-directory encoder defaults file.
pub const DEFAULTS_FILE: &str = "img2vid.toml";

pub const DEFAULT_OUTPUT: &str = "output.mp4";
pub const DEFAULT_FPS: f64 = 16.0;
pub const DEFAULT_PRESET: &str = "slow";
pub const DEFAULT_CODEC: &str = "libx264";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("{0}")]
    Range(#[from] RangeError),
    #[error("Config validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Frame size
// ============================================================================

/// Target size given as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FromStr for FrameSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || "Size must look like 1920x1080".to_string();
        let lower = s.trim().to_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let width = w.parse().map_err(|_| invalid())?;
        let height = h.parse().map_err(|_| invalid())?;
        Ok(Self { width, height })
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// clap value parser for `--size`.
pub fn parse_size(s: &str) -> Result<FrameSize, String> {
    s.parse()
}

// ============================================================================
// Encoder
// ============================================================================

/// Encoder settings as given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct EncodeFlags {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub fps: Option<f64>,
    pub crf: Option<f64>,
    pub preset: Option<String>,
    pub pix_fmt: Option<String>,
    pub size: Option<FrameSize>,
    pub codec: Option<String>,
    pub recursive: bool,
    /// Comma-separated list, e.g. `"png,jpg"`.
    pub exts: Option<String>,
    pub ffmpeg: Option<PathBuf>,
    pub dry_run: bool,
    pub lossless: bool,
}

/// Contents of `img2vid.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeDefaults {
    pub output: Option<PathBuf>,
    pub fps: Option<f64>,
    pub crf: Option<f64>,
    pub preset: Option<String>,
    pub pix_fmt: Option<String>,
    pub size: Option<String>,
    pub codec: Option<String>,
    pub recursive: Option<bool>,
    pub exts: Option<Vec<String>>,
    pub ffmpeg: Option<PathBuf>,
}

/// Fully resolved encoder configuration.
///
/// `crf` and `pix_fmt` stay optional: their defaults depend on the codec and
/// on `lossless`, and are filled in by [`crate::encode::resolve_quality`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fps: f64,
    pub crf: Option<f64>,
    pub preset: String,
    pub pix_fmt: Option<String>,
    pub size: Option<FrameSize>,
    pub codec: String,
    pub recursive: bool,
    pub extensions: BTreeSet<String>,
    pub ffmpeg: Option<PathBuf>,
    pub dry_run: bool,
    pub lossless: bool,
}

/// Load `img2vid.toml` from `dir`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_defaults(dir: &Path) -> Result<Option<EncodeDefaults>, ConfigError> {
    let path = dir.join(DEFAULTS_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let defaults = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.clone(),
        source,
    })?;
    log::debug!("loaded encoder defaults from {}", path.display());
    Ok(Some(defaults))
}

impl EncodeConfig {
    /// Merge flags over the optional defaults file over stock defaults.
    pub fn resolve(
        flags: EncodeFlags,
        defaults: Option<EncodeDefaults>,
    ) -> Result<Self, ConfigError> {
        let file = defaults.unwrap_or_default();
        let mut problems = Vec::new();

        let fps = flags.fps.or(file.fps).unwrap_or(DEFAULT_FPS);
        if !(fps.is_finite() && fps > 0.0) {
            problems.push(format!("fps must be a positive number, got {fps}"));
        }

        let crf = flags.crf.or(file.crf);
        if let Some(crf) = crf
            && !(crf.is_finite() && crf >= 0.0)
        {
            problems.push(format!("crf must be zero or positive, got {crf}"));
        }

        let size = match (flags.size, file.size) {
            (Some(size), _) => Some(size),
            (None, Some(raw)) => match raw.parse::<FrameSize>() {
                Ok(size) => Some(size),
                Err(msg) => {
                    problems.push(format!("size {raw:?}: {msg}"));
                    None
                }
            },
            (None, None) => None,
        };
        if let Some(size) = size
            && size.width == 0
        {
            problems.push("size width must be non-zero".to_string());
        }

        let extensions = match (flags.exts, file.exts) {
            (Some(list), _) => scan::extension_set(list.split(',')),
            (None, Some(list)) => scan::extension_set(list),
            (None, None) => scan::extension_set(ENCODE_EXTENSIONS.iter().copied()),
        };
        if extensions.is_empty() {
            problems.push("extension list is empty".to_string());
        }

        let codec = flags
            .codec
            .or(file.codec)
            .unwrap_or_else(|| DEFAULT_CODEC.to_string());
        if codec.trim().is_empty() {
            problems.push("codec must not be empty".to_string());
        }

        let preset = flags
            .preset
            .or(file.preset)
            .unwrap_or_else(|| DEFAULT_PRESET.to_string());
        if preset.trim().is_empty() {
            problems.push("preset must not be empty".to_string());
        }

        if !problems.is_empty() {
            return Err(ConfigError::Validation(problems.join("; ")));
        }

        Ok(Self {
            input: flags.input,
            output: flags
                .output
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            fps,
            crf,
            preset,
            pix_fmt: flags.pix_fmt.or(file.pix_fmt),
            size,
            codec,
            recursive: flags.recursive || file.recursive.unwrap_or(false),
            extensions,
            ffmpeg: flags.ffmpeg.or(file.ffmpeg),
            dry_run: flags.dry_run,
            lossless: flags.lossless,
        })
    }
}

/// Returns a fully-commented stock `img2vid.toml`.
///
/// Used by `img2vid --gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# img2vid encoder defaults
# ========================
# Place this file as img2vid.toml inside an image folder. Every key is
# optional; command-line flags always win over values set here.
# Unknown keys will cause an error.

# Output video path (relative to the working directory).
# output = "output.mp4"

# Frames per second.
# fps = 16

# Video codec passed to ffmpeg as -c:v (libx264, libx265, prores_ks, ...).
# codec = "libx264"

# Quality (lower = better). Defaults to 16, or 22 for libx265.
# A value set here also wins over --lossless.
# crf = 16

# Encoder preset (veryslow, slower, slow, medium, ...).
# preset = "slow"

# Pixel format. Defaults to yuv420p, or yuv444p with --lossless.
# pix_fmt = "yuv420p"

# Scale to this width, keeping the aspect ratio.
# size = "1920x1080"

# Scan subfolders too.
# recursive = false

# Image extensions to pick up.
# exts = ["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"]

# ffmpeg binary to use instead of the one found on PATH.
# ffmpeg = "/usr/local/bin/ffmpeg"
"##
}

// ============================================================================
// Bounce
// ============================================================================

/// Fully resolved bounce configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BounceConfig {
    pub dir: PathBuf,
    pub range: RangeSpec,
    pub extensions: BTreeSet<String>,
    pub dry_run: bool,
}

impl BounceConfig {
    /// Validate the range flags and normalize the extension filter.
    ///
    /// An empty `exts` list means the stock image extensions.
    pub fn new(
        dir: PathBuf,
        start: Option<i64>,
        end: Option<i64>,
        from_name: Option<String>,
        to_name: Option<String>,
        exts: &[String],
        dry_run: bool,
    ) -> Result<Self, ConfigError> {
        let range = RangeSpec::from_flags(start, end, from_name, to_name)?;
        let mut extensions = scan::extension_set(exts);
        if extensions.is_empty() {
            extensions = scan::extension_set(BOUNCE_EXTENSIONS.iter().copied());
        }
        Ok(Self {
            dir,
            range,
            extensions,
            dry_run,
        })
    }
}
