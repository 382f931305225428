use clap::{ArgAction, Parser};
use img2vid::bounce::{self, BounceError};
use img2vid::config::BounceConfig;
use img2vid::output;
use img2vid::scan;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "img2vid-bounce")]
#[command(about = "Make an image sequence play forward then backward")]
#[command(long_about = "\
Make an image sequence play forward then backward

Frames end-1 down to start are copied, in that order, to new files named
after the end frame (end_001, end_002, ...), so that sorting by name plays
the range forward and then back. Existing files are never overwritten; the
counter skips past names already taken.

  a.png b.png c.png d.png  ->  d_001.png (c)  d_002.png (b)  d_003.png (a)

Without range flags the whole folder is used.")]
#[command(version)]
struct Cli {
    /// Folder with images
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// First frame, 1-based (needs --end)
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Last frame, 1-based (needs --start)
    #[arg(long, allow_negative_numbers = true)]
    end: Option<i64>,

    /// First frame by file name (needs --to-name)
    #[arg(long)]
    from_name: Option<String>,

    /// Last frame by file name (needs --from-name)
    #[arg(long)]
    to_name: Option<String>,

    /// Extensions to include, with or without the dot [default: png jpg jpeg bmp webp tif tiff]
    #[arg(long, num_args = 0..)]
    exts: Vec<String>,

    /// Show what would be copied without writing anything
    #[arg(long)]
    dry_run: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), BounceError> {
    let cfg = BounceConfig::new(
        cli.dir,
        cli.start,
        cli.end,
        cli.from_name,
        cli.to_name,
        &cli.exts,
        cli.dry_run,
    )?;

    let images = scan::scan_images(&cfg.dir, false, &cfg.extensions)?;
    if images.is_empty() {
        return Err(BounceError::NoImagesFound(cfg.dir));
    }

    let range = cfg.range.resolve(&images)?;
    log::info!(
        "range {} ~ {} of {} ({} .. {})",
        range.start + 1,
        range.end + 1,
        images.len(),
        images[range.start].name,
        images[range.end].name
    );

    let Some(plan) = bounce::plan(&images, range) else {
        output::print_lines(&output::format_nothing_to_duplicate());
        return Ok(());
    };

    output::print_lines(&output::format_bounce_plan(&plan));
    if cfg.dry_run {
        for step in &plan.steps {
            println!("{}", output::format_copy_step(step, true));
        }
    } else {
        bounce::apply(&plan, |step| {
            println!("{}", output::format_copy_step(step, false))
        })?;
    }

    let window = bounce::preview_window(&images, range, &plan.created_names());
    output::print_lines(&output::format_preview(&window));
    Ok(())
}
