use clap::{ArgAction, Parser};
use img2vid::config::{self, EncodeConfig, EncodeFlags, FrameSize};
use img2vid::encode::{self, EncodeError};
use img2vid::output;
use img2vid::scan::{self, ScanError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "img2vid")]
#[command(about = "Encode a folder of images into a video with ffmpeg")]
#[command(long_about = "\
Encode a folder of images into a video with ffmpeg

Images are ordered by file name (case-insensitive) and shown for 1/fps
seconds each. Settings are taken from the command line, then from an
optional img2vid.toml in the input folder, then from stock defaults.

Exit status:
  0  success
  2  input folder missing or not a directory
  3  no images matched
  N  ffmpeg's own exit status when encoding fails

Run 'img2vid --gen-config' to print a documented img2vid.toml.")]
#[command(version)]
struct Cli {
    /// Folder with images
    #[arg(short, long, default_value = ".")]
    input: PathBuf,

    /// Output video path [default: output.mp4]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frames per second [default: 16]
    #[arg(long)]
    fps: Option<f64>,

    /// Quality, lower is better [default: 16, or 22 for libx265]
    #[arg(long)]
    crf: Option<f64>,

    /// Encoder preset [default: slow]
    #[arg(long)]
    preset: Option<String>,

    /// Pixel format [default: yuv420p, or yuv444p with --lossless]
    #[arg(long)]
    pix_fmt: Option<String>,

    /// Scale to WIDTHxHEIGHT, keeping the aspect ratio
    #[arg(long, value_parser = config::parse_size)]
    size: Option<FrameSize>,

    /// Video codec [default: libx264]
    #[arg(long)]
    codec: Option<String>,

    /// Include images in subfolders
    #[arg(long)]
    recursive: bool,

    /// Comma-separated extensions [default: jpg,jpeg,png,webp,bmp,tif,tiff]
    #[arg(long)]
    exts: Option<String>,

    /// ffmpeg binary to use instead of searching PATH
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Print the ffmpeg command without running it
    #[arg(long)]
    dry_run: bool,

    /// Lossless-ish settings for libx264 (crf 0, yuv444p)
    #[arg(long)]
    lossless: bool,

    /// Print a stock img2vid.toml with all options documented
    #[arg(long)]
    gen_config: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_flags(self) -> EncodeFlags {
        EncodeFlags {
            input: self.input,
            output: self.output,
            fps: self.fps,
            crf: self.crf,
            preset: self.preset,
            pix_fmt: self.pix_fmt,
            size: self.size,
            codec: self.codec,
            recursive: self.recursive,
            exts: self.exts,
            ffmpeg: self.ffmpeg,
            dry_run: self.dry_run,
            lossless: self.lossless,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::init_logging(cli.verbose);

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(cli.into_flags()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                EncodeError::ExternalProcessFailure { command, .. } => {
                    for line in output::format_encode_failure(command) {
                        eprintln!("{}", line);
                    }
                }
                other => eprintln!("ERROR: {other}"),
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(flags: EncodeFlags) -> Result<(), EncodeError> {
    if !flags.input.is_dir() {
        return Err(ScanError::InvalidDirectory(flags.input).into());
    }

    let defaults = config::load_defaults(&flags.input)?;
    let cfg = EncodeConfig::resolve(flags, defaults)?;

    let images = scan::scan_images(&cfg.input, cfg.recursive, &cfg.extensions)?;
    if images.is_empty() {
        return Err(EncodeError::NoImagesFound(cfg.input));
    }

    let ffmpeg = encode::find_ffmpeg(cfg.ffmpeg.as_deref())?;
    encode::encode(&cfg, &images, &ffmpeg)?;
    Ok(())
}
