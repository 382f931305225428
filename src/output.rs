//! CLI output formatting for both tools.
//!
//! Each report has a `format_*` function returning `Vec<String>` so tests can
//! check exact lines, and callers print them with [`print_lines`]. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Bounce
//!
//! ```text
//! Images: 4
//! Range: 1 ~ 4
//! End frame: d.png
//! Creating: 3 (end frame not duplicated)
//! c.png -> d_001.png
//! b.png -> d_002.png
//! a.png -> d_003.png
//!
//! Adjacent order after sorting:
//!  ... b.png, c.png, d.png, d_001.png, d_002.png, d_003.png ...
//! ```
//!
//! Dry runs prefix each copy line with `[DRY] `.
//!
//! # Encode
//!
//! ```text
//! Found 120 images. Encoding to output.mp4 ...
//! Done.
//! ```
//!
//! Diagnostics go through the `log` facade to stderr; see [`init_logging`].

use crate::bounce::{BouncePlan, CopyStep};
use std::path::Path;

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Set up `env_logger` on stderr.
///
/// `verbosity` counts `-v` flags: 0 = warn, 1 = info, 2 = debug, 3+ = trace.
/// `RUST_LOG`, when set, takes precedence.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

// ============================================================================
// Bounce
// ============================================================================

/// Header lines describing what a bounce run is about to do.
pub fn format_bounce_plan(plan: &BouncePlan) -> Vec<String> {
    vec![
        format!("Images: {}", plan.total),
        format!("Range: {} ~ {}", plan.range.start + 1, plan.range.end + 1),
        format!("End frame: {}", plan.end_name),
        format!("Creating: {} (end frame not duplicated)", plan.steps.len()),
    ]
}

/// `src -> dst`, marked `[DRY]` when nothing is written.
pub fn format_copy_step(step: &CopyStep, dry_run: bool) -> String {
    let line = format!("{} -> {}", step.source_name(), step.dest_name());
    if dry_run {
        format!("[DRY] {line}")
    } else {
        line
    }
}

pub fn format_nothing_to_duplicate() -> Vec<String> {
    vec!["Nothing to duplicate (start == end).".to_string()]
}

pub fn format_preview(window: &[String]) -> Vec<String> {
    vec![
        String::new(),
        "Adjacent order after sorting:".to_string(),
        format!(" ... {} ...", window.join(", ")),
    ]
}

// ============================================================================
// Encode
// ============================================================================

pub fn format_encode_start(count: usize, output: &Path) -> Vec<String> {
    vec![format!(
        "Found {} images. Encoding to {} ...",
        count,
        output.display()
    )]
}

pub fn format_encode_done() -> Vec<String> {
    vec!["Done.".to_string()]
}

/// Lines written to stderr when ffmpeg exits unsuccessfully.
pub fn format_encode_failure(command: &str) -> Vec<String> {
    vec!["ffmpeg failed. Command was:".to_string(), command.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range;
    use std::path::PathBuf;

    fn step(src: &str, dst: &str) -> CopyStep {
        CopyStep {
            source: PathBuf::from("/frames").join(src),
            dest: PathBuf::from("/frames").join(dst),
        }
    }

    fn sample_plan() -> BouncePlan {
        BouncePlan {
            range: range::validate(0, 3, 4).unwrap(),
            total: 4,
            end_name: "d.png".into(),
            steps: vec![
                step("c.png", "d_001.png"),
                step("b.png", "d_002.png"),
                step("a.png", "d_003.png"),
            ],
        }
    }

    #[test]
    fn bounce_plan_header() {
        assert_eq!(
            format_bounce_plan(&sample_plan()),
            vec![
                "Images: 4",
                "Range: 1 ~ 4",
                "End frame: d.png",
                "Creating: 3 (end frame not duplicated)",
            ]
        );
    }

    #[test]
    fn copy_step_shows_file_names_only() {
        let s = step("c.png", "d_001.png");
        assert_eq!(format_copy_step(&s, false), "c.png -> d_001.png");
        assert_eq!(format_copy_step(&s, true), "[DRY] c.png -> d_001.png");
    }

    #[test]
    fn preview_line() {
        let window = vec!["c.png".to_string(), "d.png".to_string()];
        assert_eq!(
            format_preview(&window),
            vec!["", "Adjacent order after sorting:", " ... c.png, d.png ..."]
        );
    }

    #[test]
    fn encode_start_line() {
        assert_eq!(
            format_encode_start(5, Path::new("out.mp4")),
            vec!["Found 5 images. Encoding to out.mp4 ..."]
        );
    }

    #[test]
    fn encode_failure_echoes_command() {
        assert_eq!(
            format_encode_failure("ffmpeg -y out.mp4"),
            vec!["ffmpeg failed. Command was:", "ffmpeg -y out.mp4"]
        );
    }
}
