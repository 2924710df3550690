//! CLI binary for swiss-knife.
//!
//! A thin shim over the library crate that maps subcommands and flags to
//! library requests and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use swiss_knife::download::{spotify, youtube};
use swiss_knife::{
    convert, AudioFormat, ConversionConfig, ConversionProgressCallback, ConversionRequest,
    ConversionStats, PageSize, SpotifyRequest, Stage, VideoFormat, YoutubeRequest,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that shows the current pipeline stage and logs finished ones.
struct CliProgressCallback {
    bar: ProgressBar,
    verbose: bool,
}

impl CliProgressCallback {
    fn new(verbose: bool) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("mdtopdf");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, verbose })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, input: &std::path::Path) {
        self.bar.set_message(format!("{}…", input.display()));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        // Only the browser step takes long enough to be worth a line.
        if self.verbose || stage == Stage::Render {
            self.bar.println(format!(
                "  {} {:<20} {}",
                green("✓"),
                stage.label(),
                dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
            ));
        }
    }

    fn on_conversion_complete(&self, _stats: &ConversionStats) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Markdown to PDF next to the input
  swiss-knife mdtopdf notes.md

  # Explicit output and stylesheet
  swiss-knife mdtopdf notes.md -o out/notes.pdf --css print.css

  # Download a single Spotify track, or a whole playlist
  swiss-knife spotifydown "https://open.spotify.com/track/xxxxx"
  swiss-knife spotifydown "https://open.spotify.com/playlist/xxxxx" --playlist

  # Download a YouTube video as webm
  swiss-knife ytdown "https://youtube.com/watch?v=xxxxx" -f webm

  Always wrap URLs in quotes to handle special characters correctly.

EXTERNAL TOOLS:
  mdtopdf      Chrome or Chromium (auto-detected, or --chrome / $CHROME)
  spotifydown  spotdl             pip install spotdl
  ytdown       yt-dlp             pip install yt-dlp

ENVIRONMENT VARIABLES:
  RUST_LOG                      Override the log filter (e.g. swiss_knife=debug)
  CHROME                        Path to the Chrome/Chromium executable
  SWISS_KNIFE_RENDER_TIMEOUT    PDF render deadline in seconds
  SWISS_KNIFE_NO_SANDBOX        Launch Chrome with --no-sandbox (containers, root)
"#;

/// Markdown to PDF, Spotify and YouTube downloads.
#[derive(Parser, Debug)]
#[command(
    name = "swiss-knife",
    version,
    about = "A pocket CLI: Markdown to PDF, Spotify and YouTube downloads",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "SWISS_KNIFE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "SWISS_KNIFE_QUIET")]
    quiet: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "SWISS_KNIFE_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Markdown to PDF that just works.
    #[command(
        long_about = "Convert a Markdown file to PDF. The Markdown is rendered to HTML \
(GitHub-flavored: tables, strikethrough, task lists, autolinks) with a clean built-in stylesheet and \
printed by headless Chrome."
    )]
    Mdtopdf(MdToPdfArgs),

    /// Download Spotify tracks and playlists.
    Spotifydown(SpotifyArgs),

    /// Download YouTube videos.
    Ytdown(YoutubeArgs),
}

#[derive(Args, Debug)]
struct MdToPdfArgs {
    /// Markdown file to convert.
    input: PathBuf,

    /// Output PDF file (default: input filename with .pdf extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page size: A4, Letter, Legal.
    #[arg(long, default_value = "A4")]
    page_size: PageSize,

    /// Page margins (e.g. 1in, 2cm).
    #[arg(long, default_value = "1in")]
    margins: String,

    /// Custom CSS file path for styling.
    #[arg(long)]
    css: Option<PathBuf>,

    /// PDF render deadline in seconds.
    #[arg(long, env = "SWISS_KNIFE_RENDER_TIMEOUT", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Chrome/Chromium executable (auto-detected if not set).
    #[arg(long, env = "CHROME")]
    chrome: Option<PathBuf>,

    /// Launch Chrome without its sandbox.
    #[arg(long, env = "SWISS_KNIFE_NO_SANDBOX")]
    no_sandbox: bool,

    /// Print conversion stats as JSON on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SpotifyArgs {
    /// Spotify track or playlist URL.
    url: String,

    /// Output directory for downloaded music (default: ~/Music/Spotify).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Audio format: mp3, m4a, flac, ogg, opus, wav.
    #[arg(short, long, default_value = "mp3")]
    format: AudioFormat,

    /// Download entire playlist.
    #[arg(short, long)]
    playlist: bool,
}

#[derive(Args, Debug)]
struct YoutubeArgs {
    /// YouTube video or shorts URL.
    url: String,

    /// Output directory for downloaded videos (default: ~/Downloads).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Video format: mp4, webm, mkv.
    #[arg(short, long, default_value = "mp4")]
    format: VideoFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters, so library INFO logs
    // are silenced while it runs.
    let show_progress = !cli.quiet
        && !cli.no_progress
        && matches!(cli.command, Command::Mdtopdf(ref a) if !a.json);
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

    match cli.command {
        Command::Mdtopdf(ref args) => run_mdtopdf(args, &cli, show_progress).await,
        Command::Spotifydown(ref args) => run_spotifydown(args, &cli).await,
        Command::Ytdown(ref args) => run_ytdown(args, &cli).await,
    }
}

async fn run_mdtopdf(args: &MdToPdfArgs, cli: &Cli, show_progress: bool) -> Result<()> {
    let mut request = ConversionRequest::new(&args.input)
        .page_size(args.page_size)
        .margins(&args.margins);
    if let Some(ref output) = args.output {
        request = request.output_path(output);
    }
    if let Some(ref css) = args.css {
        request = request.custom_css_path(css);
    }

    let mut builder = ConversionConfig::builder()
        .render_timeout_secs(args.timeout)
        .no_sandbox(args.no_sandbox);
    if let Some(ref chrome) = args.chrome {
        builder = builder.chrome_executable(chrome);
    }
    if show_progress {
        let cb = CliProgressCallback::new(cli.verbose);
        builder = builder.progress_callback(cb as Arc<dyn ConversionProgressCallback>);
    }
    let config = builder.build().context("Invalid configuration")?;

    let stats = convert(&request, &config)
        .await
        .context("Error converting file")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    } else if !cli.quiet {
        println!(
            "{} Successfully converted {} to {}",
            green("✔"),
            request.input_path.display(),
            bold(&request.output_path.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} bytes PDF, {}ms render, {}ms total",
                stats.pdf_bytes, stats.render_duration_ms, stats.total_duration_ms
            )),
        );
    }
    Ok(())
}

async fn run_spotifydown(args: &SpotifyArgs, cli: &Cli) -> Result<()> {
    let mut request = SpotifyRequest::new(&args.url);
    request.format = args.format;
    request.playlist = args.playlist;
    if let Some(ref dir) = args.output {
        request.output_dir = dir.clone();
    }

    spotify::download(&request)
        .await
        .context("Error downloading from Spotify")?;

    if !cli.quiet {
        println!("{} Download completed successfully!", green("✔"));
    }
    Ok(())
}

async fn run_ytdown(args: &YoutubeArgs, cli: &Cli) -> Result<()> {
    let mut request = YoutubeRequest::new(&args.url);
    request.format = args.format;
    if let Some(ref dir) = args.output {
        request.output_dir = dir.clone();
    }

    youtube::download(&request)
        .await
        .context("Error downloading video")?;

    if !cli.quiet {
        println!("{} Download completed successfully!", green("✔"));
    }
    Ok(())
}
