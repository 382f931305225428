//! Ping-pong frame duplication.
//!
//! For a range `s..=e` of the sorted set, the frames `e-1, e-2, ..., s` are
//! copied, in that order, to new files named after the end frame:
//!
//! ```text
//! a.png b.png c.png d.png          range 1..=4
//!                     d_001.png ← c.png
//!                     d_002.png ← b.png
//!                     d_003.png ← a.png
//! sorted: a b c d c b a
//! ```
//!
//! The end frame itself is never duplicated. A range with a single frame has
//! nothing to copy and is reported as such, not as an error.
//!
//! Copies are independent: if one fails, the ones already written stay.

use crate::config::ConfigError;
use crate::naming::{self, NamingTemplate};
use crate::range::{Range, RangeError};
use crate::scan::{ImageEntry, ScanError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BounceError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("No images found in {0}")]
    NoImagesFound(PathBuf),
    #[error("Copy {} -> {} failed: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// One planned copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyStep {
    pub source: PathBuf,
    pub dest: PathBuf,
}

impl CopyStep {
    pub fn source_name(&self) -> String {
        file_name(&self.source)
    }

    pub fn dest_name(&self) -> String {
        file_name(&self.dest)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Everything a run will do, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BouncePlan {
    pub range: Range,
    /// Size of the scanned set.
    pub total: usize,
    /// Name of the end frame, the naming anchor.
    pub end_name: String,
    /// Copies in execution order (source positions descending).
    pub steps: Vec<CopyStep>,
}

impl BouncePlan {
    pub fn created_names(&self) -> Vec<String> {
        self.steps.iter().map(CopyStep::dest_name).collect()
    }
}

/// Positions to duplicate for `range`: `end-1` down to `start`.
pub fn mirror_indices(range: Range) -> Vec<usize> {
    (range.start..range.end).rev().collect()
}

/// Plan the duplication of `range` within `images`.
///
/// Returns `None` when the range has no interior (start == end). Slot names
/// are allocated against the files present in the end frame's directory right
/// now, so a dry run shows the same names a real run would use.
pub fn plan(images: &[ImageEntry], range: Range) -> Option<BouncePlan> {
    if range.interior_len() == 0 {
        return None;
    }
    let sources = mirror_indices(range);

    let end = &images[range.end];
    let dir = end.parent();
    let template = NamingTemplate::from_anchor(&end.path);
    let slots = naming::allocate(dir, &template, sources.len());

    let steps = sources
        .iter()
        .zip(slots)
        .map(|(&i, slot)| CopyStep {
            source: images[i].path.clone(),
            dest: dir.join(slot),
        })
        .collect();

    Some(BouncePlan {
        range,
        total: images.len(),
        end_name: end.name.clone(),
        steps,
    })
}

/// Perform the copies in order, calling `on_copied` after each one.
pub fn apply(
    plan: &BouncePlan,
    mut on_copied: impl FnMut(&CopyStep),
) -> Result<(), BounceError> {
    for step in &plan.steps {
        copy_with_metadata(&step.source, &step.dest).map_err(|source| BounceError::Copy {
            from: step.source.clone(),
            to: step.dest.clone(),
            source,
        })?;
        on_copied(step);
    }
    Ok(())
}

/// Copy bytes and permissions, then carry over access/modification times.
///
/// Timestamps are best-effort: failing to set them only logs a warning.
pub fn copy_with_metadata(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let meta = fs::metadata(from)?;
    let atime = filetime::FileTime::from_last_access_time(&meta);
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    if let Err(e) = filetime::set_file_times(to, atime, mtime) {
        log::warn!("could not copy timestamps to {}: {e}", to.display());
    }
    Ok(())
}

/// Names around the end frame as they would sort once the copies exist.
///
/// The created names are spliced in right after the end frame; the window
/// runs from two entries before the end frame to two entries past the last
/// created one, clipped to the list.
pub fn preview_window(images: &[ImageEntry], range: Range, created: &[String]) -> Vec<String> {
    let e = range.end;
    let merged: Vec<&str> = images[..=e]
        .iter()
        .map(|img| img.name.as_str())
        .chain(created.iter().map(String::as_str))
        .chain(images[e + 1..].iter().map(|img| img.name.as_str()))
        .collect();
    let from = e.saturating_sub(2);
    let to = (e + 3 + created.len()).min(merged.len());
    merged[from..to].iter().map(|s| s.to_string()).collect()
}
