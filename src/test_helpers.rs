//! Shared test utilities for the img2vid test suite.
//!
//! Image files are never decoded by this crate, so fixtures are plain stub
//! files whose contents identify them. That lets copy tests check which
//! source ended up in which slot.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! touch_images(tmp.path(), &["a.png", "b.png"]);
//! let images = scan_pngs(tmp.path());
//! assert_eq!(names(&images), vec!["a.png", "b.png"]);
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use crate::scan::{self, ImageEntry};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create one stub file per name. Each file's content is `"data:<name>"`.
pub fn touch_images(dir: &Path, files: &[&str]) {
    for name in files {
        std::fs::write(dir.join(name), stub_content(name)).unwrap();
    }
}

/// Content written by [`touch_images`] for `name`.
pub fn stub_content(name: &str) -> String {
    format!("data:{name}")
}

/// Read a file written into `dir` back as a string.
pub fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name))
        .unwrap_or_else(|e| panic!("could not read {name}: {e}"))
}

/// Sorted file names currently present in `dir` (files only).
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// =========================================================================
// Scan helpers
// =========================================================================

pub fn png_only() -> BTreeSet<String> {
    scan::extension_set(["png"])
}

/// Scan `dir` (flat, png only) and panic on failure.
pub fn scan_pngs(dir: &Path) -> Vec<ImageEntry> {
    scan::scan_images(dir, false, &png_only()).unwrap()
}

/// File names of a scanned set, in order.
pub fn names(images: &[ImageEntry]) -> Vec<&str> {
    images.iter().map(|i| i.name.as_str()).collect()
}
