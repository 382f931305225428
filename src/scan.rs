//! Image discovery.
//!
//! Lists the image files of a directory and returns them in a deterministic,
//! case-insensitive alphabetical order. Both tools start here: the encoder
//! feeds the ordered set to ffmpeg, the bounce tool resolves ranges against it.
//!
//! ## Ordering
//!
//! Files are ordered by their **file name** only, case-folded (see
//! [`fold_case`]), ascending:
//!
//! ```text
//! frames/
//! ├── B_002.png      # 2nd
//! ├── a_001.PNG      # 1st
//! ├── c_003.jpg      # 3rd
//! └── notes.txt      # skipped (extension not accepted)
//! ```
//!
//! In recursive mode the parent directory does not take part in the sort key,
//! so `x/b.png` sorts after `y/a.png`. Directory entries are walked in
//! file-name order, which makes ties (same name in two subdirectories)
//! resolve the same way on every run.
//!
//! An empty result is not an error here; callers decide whether zero images
//! is fatal.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input folder does not exist: {0}")]
    InvalidDirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Extensions accepted by the encoder when `--exts` is not given.
pub const ENCODE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];

/// Extensions accepted by the bounce tool when `--exts` is not given.
pub const BOUNCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

/// One discovered image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Path as found under the scanned root.
    pub path: PathBuf,
    /// File name including extension, e.g. `Frame_010.PNG`.
    pub name: String,
    /// Lowercased extension without the dot, e.g. `png`.
    pub extension: String,
}

impl ImageEntry {
    fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_string();
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        Some(Self {
            path: path.to_path_buf(),
            name,
            extension,
        })
    }

    /// Directory containing the file.
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Normalize a user-supplied extension: trim, strip leading dots, lowercase.
///
/// `".PNG"`, `"png"` and `" Png "` all become `"png"`.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Build an extension set from user input, dropping empty entries.
pub fn extension_set<I, S>(exts: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    exts.into_iter()
        .map(|e| normalize_extension(e.as_ref()))
        .filter(|e| !e.is_empty())
        .collect()
}

/// Enumerate images under `root`.
///
/// Only regular files (symlinks are followed for the check) whose lowercased
/// extension is in `extensions` are kept. `extensions` is expected to be
/// normalized (see [`extension_set`]).
pub fn scan_images(
    root: &Path,
    recursive: bool,
    extensions: &BTreeSet<String>,
) -> Result<Vec<ImageEntry>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidDirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name();

    let mut images = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Anything below the root that cannot be read is skipped.
            Err(e) if e.depth() > 0 => {
                log::warn!("skipping unreadable entry: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(image) = ImageEntry::from_path(path)
            && extensions.contains(&image.extension)
        {
            images.push(image);
        }
    }

    // Stable sort: equal keys keep walk order.
    images.sort_by_cached_key(|img| fold_case(&img.name));

    log::debug!(
        "scanned {} ({}): {} image(s)",
        root.display(),
        if recursive { "recursive" } else { "flat" },
        images.len()
    );
    Ok(images)
}

/// Caseless sort key: lowercase, then expand the characters whose full case
/// fold is more than a plain lowercase (`ß` → `ss`, `ﬁ` → `fi`, final `ς` → `σ`).
pub fn fold_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase) {
        match c {
            'ß' => out.push_str("ss"),
            'ς' => out.push('σ'),
            'ſ' => out.push('s'),
            '\u{fb00}' => out.push_str("ff"),
            '\u{fb01}' => out.push_str("fi"),
            '\u{fb02}' => out.push_str("fl"),
            '\u{fb03}' => out.push_str("ffi"),
            '\u{fb04}' => out.push_str("ffl"),
            '\u{fb05}' | '\u{fb06}' => out.push_str("st"),
            other => out.push(other),
        }
    }
    out
}

/// Position of the entry whose file name is exactly `name`.
pub fn position_of(images: &[ImageEntry], name: &str) -> Option<usize> {
    images.iter().position(|img| img.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts(list: &[&str]) -> BTreeSet<String> {
        extension_set(list.iter().copied())
    }

    #[test]
    fn sorts_case_insensitively_by_name() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["b.png", "A.png", "c.PNG", "a2.png"]);

        let images = scan_images(tmp.path(), false, &exts(&["png"])).unwrap();

        assert_eq!(names(&images), vec!["A.png", "a2.png", "b.png", "c.PNG"]);
    }

    #[test]
    fn fold_expands_sharp_s_and_ligatures() {
        assert_eq!(fold_case("Straße.PNG"), "strasse.png");
        assert_eq!(fold_case("STRASSE.png"), "strasse.png");
        assert_eq!(fold_case("\u{fb01}le.png"), "file.png");
        assert_eq!(fold_case("ΟΔΟΣ"), fold_case("οδος"));
    }

    #[test]
    fn sharp_s_sorts_as_double_s() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["sz.png", "ßa.png", "sr.png"]);

        let images = scan_images(tmp.path(), false, &exts(&["png"])).unwrap();

        // ßa folds to ssa, which falls between sr and sz.
        assert_eq!(names(&images), vec!["sr.png", "ßa.png", "sz.png"]);
    }

    #[test]
    fn filters_by_extension() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["a.png", "b.jpg", "c.txt", "d", "e.JPG"]);

        let images = scan_images(tmp.path(), false, &exts(&["jpg"])).unwrap();

        assert_eq!(names(&images), vec!["b.jpg", "e.JPG"]);
        assert!(images.iter().all(|i| i.extension == "jpg"));
    }

    #[test]
    fn flat_scan_ignores_subdirectories() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["a.png"]);
        let sub = tmp.path().join("nested");
        fs::create_dir(&sub).unwrap();
        touch_images(&sub, &["b.png"]);

        let images = scan_images(tmp.path(), false, &exts(&["png"])).unwrap();

        assert_eq!(names(&images), vec!["a.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn recursive_scan_skips_unreadable_subdirectory() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["a.png"]);
        let locked = tmp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        touch_images(&locked, &["b.png"]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let result = scan_images(tmp.path(), true, &exts(&["png"]));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let images = result.unwrap();
        // Privileged users can still read the directory.
        assert_eq!(names(&images)[0], "a.png");
        assert!(images.len() <= 2);
    }

    #[test]
    fn recursive_scan_sorts_by_file_name_not_path() {
        let tmp = TempDir::new().unwrap();
        let x = tmp.path().join("x");
        let y = tmp.path().join("y");
        fs::create_dir(&x).unwrap();
        fs::create_dir(&y).unwrap();
        touch_images(&x, &["b.png"]);
        touch_images(&y, &["a.png"]);

        let images = scan_images(tmp.path(), true, &exts(&["png"])).unwrap();

        assert_eq!(names(&images), vec!["a.png", "b.png"]);
        assert!(images[0].parent().ends_with("y"));
        assert!(images[1].parent().ends_with("x"));
    }

    #[test]
    fn directory_named_like_image_is_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("folder.png")).unwrap();
        touch_images(tmp.path(), &["real.png"]);

        let images = scan_images(tmp.path(), true, &exts(&["png"])).unwrap();

        assert_eq!(names(&images), vec!["real.png"]);
    }

    #[test]
    fn scanning_twice_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();
        touch_images(&a, &["same.png", "z.png"]);
        touch_images(&b, &["same.png", "Y.png"]);

        let first = scan_images(tmp.path(), true, &exts(&["png"])).unwrap();
        let second = scan_images(tmp.path(), true, &exts(&["png"])).unwrap();

        assert_eq!(first, second);
        // Tie on "same.png" resolves by walk order: a/ before b/.
        assert!(first[0].parent().ends_with("a"));
        assert!(first[1].parent().ends_with("b"));
    }

    #[test]
    fn empty_directory_is_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let images = scan_images(tmp.path(), false, &exts(&["png"])).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn missing_directory_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let result = scan_images(&missing, false, &exts(&["png"]));
        assert!(matches!(result, Err(ScanError::InvalidDirectory(_))));
    }

    #[test]
    fn file_root_is_invalid() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["a.png"]);
        let result = scan_images(&tmp.path().join("a.png"), false, &exts(&["png"]));
        assert!(matches!(result, Err(ScanError::InvalidDirectory(_))));
    }

    // =========================================================================
    // Extension normalization
    // =========================================================================

    #[test]
    fn normalize_strips_dot_and_lowercases() {
        assert_eq!(normalize_extension(".PNG"), "png");
        assert_eq!(normalize_extension(" Jpg "), "jpg");
        assert_eq!(normalize_extension("tiff"), "tiff");
    }

    #[test]
    fn extension_set_drops_empty_entries() {
        let set = extension_set(["png", "", " ", ".JPG", "png"]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["jpg", "png"]);
    }

    #[test]
    fn position_of_requires_exact_name() {
        let tmp = TempDir::new().unwrap();
        touch_images(tmp.path(), &["a.png", "B.png"]);
        let images = scan_images(tmp.path(), false, &exts(&["png"])).unwrap();

        assert_eq!(position_of(&images, "B.png"), Some(1));
        assert_eq!(position_of(&images, "b.png"), None);
    }
}
