use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epd_imgdecode::models::{AppConfig, DisplaySpec};
use epd_imgdecode::services::{ConversionPipeline, ImageDecoder, ImageFormat};

#[derive(Parser)]
#[command(name = "epd-imgdecode")]
#[command(about = "Decode PNG/JPEG/BMP images and prepare them for six-color e-paper panels")]
struct Cli {
    /// Configuration file (defaults to $EPD_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode, fit to the display, dither and write a BMP
    Convert {
        /// Input image
        #[arg(short, long)]
        input: PathBuf,

        /// Output BMP file path
        #[arg(short, long)]
        output: PathBuf,

        /// Input format (guessed from the extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Target width, overrides the configured display
        #[arg(long, requires = "height")]
        width: Option<u32>,

        /// Target height, overrides the configured display
        #[arg(long, requires = "width")]
        height: Option<u32>,

        /// Skip dithering
        #[arg(long)]
        no_dither: bool,
    },
    /// Decode an image and write it unchanged as a BMP
    Decode {
        /// Input image
        #[arg(short, long)]
        input: PathBuf,

        /// Output BMP file path
        #[arg(short, long)]
        output: PathBuf,

        /// Input format (guessed from the extension when omitted)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
    /// Print the six-color palette
    Palette,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Jpeg,
    Bmp,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Bmp => ImageFormat::Bmp,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epd_imgdecode=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_path = cli
        .config
        .or_else(|| std::env::var("EPD_CONFIG").ok().map(PathBuf::from));
    let config = AppConfig::load(config_path.as_deref());

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            width,
            height,
            no_dither,
        } => run_convert_command(config, &input, &output, format, width.zip(height), no_dither),
        Commands::Decode {
            input,
            output,
            format,
        } => run_decode_command(&config, &input, &output, format),
        Commands::Palette => {
            run_palette_command();
            Ok(())
        }
    }
}

fn resolve_format(input: &Path, format: Option<FormatArg>) -> anyhow::Result<ImageFormat> {
    match format {
        Some(format) => Ok(format.into()),
        None => ImageFormat::from_path(input).with_context(|| {
            format!(
                "Cannot tell the format of {} from its extension, pass --format",
                input.display()
            )
        }),
    }
}

fn run_convert_command(
    mut config: AppConfig,
    input: &Path,
    output: &Path,
    format: Option<FormatArg>,
    size: Option<(u32, u32)>,
    no_dither: bool,
) -> anyhow::Result<()> {
    let format = resolve_format(input, format)?;
    if let Some((width, height)) = size {
        config.display = DisplaySpec::new(width, height).context("Invalid target size")?;
    }
    if no_dither {
        config.dither = false;
    }

    let pipeline = ConversionPipeline::from_config(&config);
    let report = pipeline
        .convert(input, format, output)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!(
        "{} ({}x{}) -> {} ({}x{}{}{})",
        input.display(),
        report.source_width,
        report.source_height,
        output.display(),
        report.width,
        report.height,
        if report.scaled { ", scaled" } else { "" },
        if report.dithered { ", dithered" } else { "" },
    );
    Ok(())
}

fn run_decode_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    format: Option<FormatArg>,
) -> anyhow::Result<()> {
    let format = resolve_format(input, format)?;
    let decoder = ImageDecoder::from_config(&config.decode);

    let image = decoder
        .decode_file(input, format)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    decoder
        .encode_bmp_file(&image, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} ({}x{}) -> {}",
        input.display(),
        image.width(),
        image.height(),
        output.display()
    );
    Ok(())
}

fn run_palette_command() {
    println!("Six-color palette:");
    for (color, rgb) in eink_dither::PALETTE.iter() {
        println!("  {}  {:<6}  {}", color.index(), color.name(), rgb);
    }
}
