//! Generated filename convention and slot allocation.
//!
//! New frames are named after the frame they follow, with a zero-padded
//! counter appended to the stem:
//!
//! ```text
//! d.png  →  d_001.png, d_002.png, d_003.png
//! ```
//!
//! Because `_` sorts after `.`, the generated files sort after their anchor
//! in the case-folded order used by [`crate::scan`].
//!
//! ## Allocation
//!
//! [`find_free_block`] looks for the lowest `n` such that `n..n+count` are all
//! unused, sliding the window one step at a time. With `d_001..d_003` and
//! `d_007..d_009` taken, a block of three starts at `4`.
//!
//! The check is read-only: nothing is reserved, so a concurrent writer in the
//! same directory can still take a slot between allocation and copy.

use std::path::Path;

/// Digits in the generated counter.
pub const COUNTER_WIDTH: usize = 3;

/// `stem_NNN.ext` generator anchored on an existing file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate {
    pub stem: String,
    /// Extension as written in the anchor file name (case kept), no dot.
    pub extension: Option<String>,
    pub width: usize,
}

impl NamingTemplate {
    /// Template for files following `anchor` (a file name or path).
    pub fn from_anchor(anchor: &Path) -> Self {
        let stem = anchor
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = anchor
            .extension()
            .map(|e| e.to_string_lossy().to_string());
        Self {
            stem,
            extension,
            width: COUNTER_WIDTH,
        }
    }

    /// File name for counter `n`, e.g. `d_007.png`.
    pub fn slot_name(&self, n: u32) -> String {
        match &self.extension {
            Some(ext) => format!("{}_{:0w$}.{}", self.stem, n, ext, w = self.width),
            None => format!("{}_{:0w$}", self.stem, n, w = self.width),
        }
    }
}

/// Lowest starting counter of `count` consecutive unused slots in `dir`.
///
/// Counters start at 1. A `count` of zero trivially fits at 1.
pub fn find_free_block(dir: &Path, template: &NamingTemplate, count: usize) -> u32 {
    let mut n: u32 = 1;
    loop {
        let fits = (0..count as u32).all(|i| !dir.join(template.slot_name(n + i)).exists());
        if fits {
            log::debug!(
                "free block for {} x{} in {}: starts at {}",
                template.slot_name(n),
                count,
                dir.display(),
                n
            );
            return n;
        }
        n += 1;
    }
}

/// Allocate `count` slot names in `dir`, in counter order.
pub fn allocate(dir: &Path, template: &NamingTemplate, count: usize) -> Vec<String> {
    let first = find_free_block(dir, template, count);
    (first..first + count as u32)
        .map(|n| template.slot_name(n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn template(anchor: &str) -> NamingTemplate {
        NamingTemplate::from_anchor(Path::new(anchor))
    }

    #[test]
    fn template_keeps_stem_and_extension_case() {
        let t = template("Shot.PNG");
        assert_eq!(t.stem, "Shot");
        assert_eq!(t.extension.as_deref(), Some("PNG"));
        assert_eq!(t.slot_name(1), "Shot_001.PNG");
    }

    #[test]
    fn template_uses_last_dot_for_extension() {
        let t = template("frame.v2.jpg");
        assert_eq!(t.slot_name(12), "frame.v2_012.jpg");
    }

    #[test]
    fn template_without_extension() {
        assert_eq!(template("raw").slot_name(5), "raw_005");
    }

    #[test]
    fn counter_grows_past_width() {
        assert_eq!(template("d.png").slot_name(1234), "d_1234.png");
    }

    #[test]
    fn empty_directory_starts_at_one() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_free_block(tmp.path(), &template("d.png"), 3), 1);
    }

    #[test]
    fn first_fully_free_block_is_chosen() {
        let tmp = TempDir::new().unwrap();
        touch_images(
            tmp.path(),
            &[
                "d_001.png", "d_002.png", "d_003.png", "d_007.png", "d_008.png", "d_009.png",
            ],
        );

        assert_eq!(find_free_block(tmp.path(), &template("d.png"), 3), 4);
    }

    #[test]
    fn window_slides_past_a_gap_that_is_too_small() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["d_002.png", "d_005.png"]);

        // 1 alone is free, 3..4 too short for three; 6..8 is the first fit.
        assert_eq!(find_free_block(tmp.path(), &template("d.png"), 3), 6);
        assert_eq!(find_free_block(tmp.path(), &template("d.png"), 2), 3);
        assert_eq!(find_free_block(tmp.path(), &template("d.png"), 1), 1);
    }

    #[test]
    fn other_stems_and_extensions_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["e_001.png", "d_001.jpg"]);

        assert_eq!(find_free_block(tmp.path(), &template("d.png"), 2), 1);
    }

    #[test]
    fn allocate_returns_consecutive_names() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["d_001.png"]);

        assert_eq!(
            allocate(tmp.path(), &template("d.png"), 3),
            vec!["d_002.png", "d_003.png", "d_004.png"]
        );
    }

    #[test]
    fn allocate_zero_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(allocate(tmp.path(), &template("d.png"), 0).is_empty());
    }
}
