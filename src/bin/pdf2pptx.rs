//! CLI binary for pdf2pptx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2pptx::{
    convert, ConversionConfig, ConversionProgressCallback, Converter, DocumentInfo, ImageFormat,
    ProgressCallback, ProgressUpdate, Stage,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar from 0 to 100 percent, prefixed with
/// the current stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold:<10} [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_progress(&self, update: &ProgressUpdate) {
        match update.stage {
            Stage::Failed => {
                self.bar.abandon_with_message(red(&update.message));
            }
            Stage::Done => {
                self.bar.set_position(100);
                self.bar.finish_and_clear();
            }
            stage => {
                if stage == Stage::Started {
                    self.bar
                        .println(format!("{} {}", cyan("◆"), bold(&update.message)));
                }
                self.bar.set_prefix(stage.label());
                self.bar.set_message(update.message.clone());
                if let Some(p) = update.percent {
                    self.bar.set_position(p.round() as u64);
                }
            }
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Deck and images beside the PDF
  pdf2pptx slides.pdf

  # Write into another folder
  pdf2pptx slides.pdf -o out/

  # Lower resolution, lossless page images
  pdf2pptx --dpi 150 --format png handout.pdf

  # Show page sizes and the planned render size of each page
  pdf2pptx --inspect-only poster.pdf

  # Machine-readable result
  pdf2pptx --json report.pdf > result.json

OUTPUT:
  <name>.pptx       one slide per page, each page stretched to fill its slide
  <name>_images/    page_001.jpg, page_002.jpg, … (replaced on every run)

  The slide size is the first page's rendered size at one point per pixel.
  Pages are rendered at --dpi, but never larger than 90% of --max-pixels on
  either edge (PowerPoint rejects slides beyond 56 inches / 4032 points).

ENVIRONMENT VARIABLES:
  PDF2PPTX_*          Every flag, e.g. PDF2PPTX_DPI=200
  PDFIUM_LIB_PATH     Path to libpdfium (file or directory)
  RUST_LOG            Override the log filter, e.g. RUST_LOG=pdf2pptx=debug

SETUP:
  pdf2pptx loads pdfium at runtime. Download a build for your platform from
  https://github.com/bblanchon/pdfium-binaries/releases and either set
  PDFIUM_LIB_PATH, pass --pdfium-lib, place the library next to the
  executable, or drop it into ~/.cache/pdf2pptx/.
"#;

/// Convert PDF files to PowerPoint decks, one rendered page per slide.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pptx",
    version,
    about = "Convert PDF files to PowerPoint decks, one rendered page per slide",
    long_about = "Render every page of a PDF with pdfium and build a .pptx whose slides each \
show one page image, stretched to fill the slide. The rendered images are kept in a \
<name>_images folder beside the deck.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to convert.
    input: PathBuf,

    /// Folder for the deck and images folder (default: the PDF's folder).
    #[arg(short, long, env = "PDF2PPTX_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI (72–600).
    #[arg(long, env = "PDF2PPTX_DPI", default_value_t = 300,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Largest rendered width or height in pixels.
    #[arg(long, env = "PDF2PPTX_MAX_PIXELS", default_value_t = 4032,
          value_parser = clap::value_parser!(u32).range(100..))]
    max_pixels: u32,

    /// Page image format: jpeg or png.
    #[arg(long, env = "PDF2PPTX_FORMAT", value_enum, default_value = "jpeg")]
    format: FormatArg,

    /// JPEG quality (1–100). Ignored for PNG.
    #[arg(long, env = "PDF2PPTX_JPEG_QUALITY", default_value_t = 90,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2PPTX_PASSWORD")]
    password: Option<String>,

    /// Path to the pdfium shared library, or a folder containing it.
    #[arg(long, env = "PDF2PPTX_PDFIUM_LIB")]
    pdfium_lib: Option<PathBuf>,

    /// Parent folder for the temporary scratch directory.
    #[arg(long, env = "PDF2PPTX_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Print the result (or inspection) as JSON on stdout.
    #[arg(long, env = "PDF2PPTX_JSON")]
    json: bool,

    /// Print PDF metadata and planned render sizes only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2PPTX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PPTX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2PPTX_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    #[value(alias = "jpg")]
    Jpeg,
    Png,
}

impl From<FormatArg> for ImageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Png => ImageFormat::Png,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Library INFO logs would tear the progress bar, so they are off while
    // it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;
    tracing::debug!("Effective config: {:?}", config);

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let converter = Converter::new(config);
        let input = cli.input.clone();
        let output_dir = cli.output.clone();
        let info = tokio::task::spawn_blocking(move || {
            converter.inspect(&input, output_dir.as_deref())
        })
        .await
        .context("Inspect worker failed")?
        .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize inspection")?
            );
        } else {
            print_inspection(&info);
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let output = convert(&cli.input, cli.output.clone(), &config, progress_cb)
        .await
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} slides  {}x{}  {}ms  →  {}",
            green("✔"),
            stats.total_pages,
            output.slide_width_px,
            output.slide_height_px,
            stats.total_duration_ms,
            bold(&output.deck_path.display().to_string()),
        );
        eprintln!(
            "   {}  {}",
            dim(&format!(
                "render {}ms / deck {}ms / copy {}ms, {} KiB",
                stats.render_duration_ms,
                stats.assemble_duration_ms,
                stats.copy_duration_ms,
                stats.deck_bytes / 1024
            )),
            dim(&format!("images: {}", output.images_dir.display())),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .max_pixels(cli.max_pixels)
        .image_format(cli.format.into())
        .jpeg_quality(cli.jpeg_quality);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(lib.clone());
    }
    if let Some(ref dir) = cli.work_dir {
        builder = builder.scratch_root(dir.clone());
    }

    builder.build().context("Invalid configuration")
}

fn print_inspection(info: &DocumentInfo) {
    println!("File:         {}", info.path.display());
    if let Some(ref t) = info.title {
        println!("Title:        {}", t);
    }
    if let Some(ref a) = info.author {
        println!("Author:       {}", a);
    }
    println!("Pages:        {}", info.page_count);
    println!("PDF Version:  {}", info.pdf_version);
    if let Some(ref p) = info.producer {
        println!("Producer:     {}", p);
    }
    if let Some(ref c) = info.creator {
        println!("Creator:      {}", c);
    }
    println!("Deck:         {}", info.planned_deck_path.display());
    println!("Images:       {}", info.planned_images_dir.display());

    if let Some(first) = info.pages.first() {
        println!(
            "Slide size:   {}x{} pt",
            first.width_px, first.height_px
        );
    }
    println!();
    for page in &info.pages {
        println!(
            "  {:>4}  {:>7.1} x {:<7.1} pt  zoom {:.3}  →  {}x{} px",
            page.page_num, page.width_pt, page.height_pt, page.zoom, page.width_px, page.height_px
        );
    }
}
