//! Frame range selection.
//!
//! A range is picked in one of three ways:
//!
//! | Flags | Meaning |
//! |-------|---------|
//! | none | the whole set, `1..=N` |
//! | `--start S --end E` | 1-based, inclusive positions in the sorted set |
//! | `--from-name A --to-name B` | exact file names present in the sorted set |
//!
//! Bounds come in pairs; giving only one side of a pair, or mixing positions
//! with names, is rejected before anything touches the filesystem.

use crate::scan::{self, ImageEntry};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    #[error("Invalid range arguments: {0}")]
    MalformedArguments(String),
    #[error("File not found in the image set: {0}")]
    NameNotFound(String),
    #[error("Invalid range {} to {} for {len} image(s)", .start + 1, .end + 1)]
    InvalidRange { start: i64, end: i64, len: usize },
}

/// How the user asked for a range. Built by [`RangeSpec::from_flags`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RangeSpec {
    #[default]
    Whole,
    /// 1-based, inclusive.
    Positions { start: i64, end: i64 },
    Names { from: String, to: String },
}

/// A validated inclusive range: `0 <= start <= end < len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    /// Number of frames strictly before the end frame.
    pub fn interior_len(&self) -> usize {
        self.end - self.start
    }
}

impl RangeSpec {
    /// Combine the four optional range flags into a spec.
    ///
    /// Every problem found is reported in a single
    /// [`RangeError::MalformedArguments`].
    pub fn from_flags(
        start: Option<i64>,
        end: Option<i64>,
        from_name: Option<String>,
        to_name: Option<String>,
    ) -> Result<Self, RangeError> {
        let mut problems = Vec::new();

        if (start.is_some() || end.is_some()) && (from_name.is_some() || to_name.is_some()) {
            problems.push("index bounds and file-name bounds are mutually exclusive");
        }

        let positions = match (start, end) {
            (Some(s), Some(e)) => Some((s, e)),
            (None, None) => None,
            _ => {
                problems.push("--start and --end must be given together");
                None
            }
        };
        let names = match (from_name, to_name) {
            (Some(f), Some(t)) => Some((f, t)),
            (None, None) => None,
            _ => {
                problems.push("--from-name and --to-name must be given together");
                None
            }
        };
        if !problems.is_empty() {
            return Err(RangeError::MalformedArguments(problems.join("; ")));
        }

        Ok(match (positions, names) {
            (Some((start, end)), None) => RangeSpec::Positions { start, end },
            (None, Some((from, to))) => RangeSpec::Names { from, to },
            _ => RangeSpec::Whole,
        })
    }

    /// Map the spec onto `images`, validating the bounds.
    pub fn resolve(&self, images: &[ImageEntry]) -> Result<Range, RangeError> {
        let (start, end) = match self {
            RangeSpec::Whole => (0, images.len() as i64 - 1),
            RangeSpec::Positions { start, end } => (start.saturating_sub(1), end.saturating_sub(1)),
            RangeSpec::Names { from, to } => (lookup(images, from)?, lookup(images, to)?),
        };
        validate(start, end, images.len())
    }
}

fn lookup(images: &[ImageEntry], name: &str) -> Result<i64, RangeError> {
    scan::position_of(images, name)
        .map(|i| i as i64)
        .ok_or_else(|| RangeError::NameNotFound(name.to_string()))
}

/// Check `0 <= start <= end < len` on 0-based bounds.
pub fn validate(start: i64, end: i64, len: usize) -> Result<Range, RangeError> {
    if start < 0 || end >= len as i64 || start > end {
        return Err(RangeError::InvalidRange { start, end, len });
    }
    Ok(Range {
        start: start as usize,
        end: end as usize,
    })
}
