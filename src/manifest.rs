//! ffmpeg concat demuxer list.
//!
//! ```text
//! file '/frames/a.png'
//! duration 0.0625
//! file '/frames/b.png'
//! duration 0.0625
//! file '/frames/c.png'
//! file '/frames/c.png'
//! ```
//!
//! Every frame but the last carries `duration 1/fps`. The last file is listed
//! a second time so the demuxer keeps it on screen instead of dropping it.
//!
//! The file is plain UTF-8 with no byte-order mark; some ffmpeg builds reject
//! a BOM as an unknown keyword.

use crate::scan::ImageEntry;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// One listed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    /// Absolute `/`-separated path, single quotes already escaped.
    pub path: String,
    /// Seconds the frame stays on screen; `None` for the last frame.
    pub duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConcatManifest {
    pub entries: Vec<ManifestEntry>,
}

/// Escape `'` for a single-quoted concat field: `it's` → `it'\''s`.
pub fn escape_single_quotes(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// Canonical absolute path with `/` separators.
pub fn portable_path(path: &Path) -> io::Result<String> {
    let absolute = fs::canonicalize(path)?;
    let text = absolute.to_string_lossy();
    if cfg!(windows) {
        Ok(windows_forward_slashes(&text))
    } else {
        Ok(text.into_owned())
    }
}

/// Drop the verbatim prefix `canonicalize` adds on Windows and switch to `/`.
///
/// `\\?\C:\a` → `C:/a`, `\\?\UNC\server\share\a` → `//server/share/a`.
fn windows_forward_slashes(text: &str) -> String {
    let plain = if let Some(share) = text.strip_prefix(r"\\?\UNC\") {
        format!(r"\\{share}")
    } else {
        text.strip_prefix(r"\\?\").unwrap_or(text).to_string()
    };
    plain.replace('\\', "/")
}

/// Render a float the way the encoder flags expect it: whole values keep
/// one decimal (`16.0`), others use the shortest exact form (`0.0625`).
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl ConcatManifest {
    /// Build entries for `images` shown at `fps` frames per second.
    ///
    /// Fails if an image path cannot be resolved.
    pub fn from_images(images: &[ImageEntry], fps: f64) -> io::Result<Self> {
        let frame = 1.0 / fps;
        let last = images.len().saturating_sub(1);
        let entries = images
            .iter()
            .enumerate()
            .map(|(i, img)| -> io::Result<ManifestEntry> {
                Ok(ManifestEntry {
                    path: escape_single_quotes(&portable_path(&img.path)?),
                    duration: (i < last).then_some(frame),
                })
            })
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// Manifest text. Empty when there are no entries.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("file '{}'\n", entry.path));
            if let Some(d) = entry.duration {
                out.push_str(&format!("duration {}\n", format_decimal(d)));
            }
        }
        if let Some(last) = self.entries.last() {
            out.push_str(&format!("file '{}'\n", last.path));
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(self.render().as_bytes())?;
        writer.flush()?;
        log::debug!(
            "wrote concat list with {} entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}
