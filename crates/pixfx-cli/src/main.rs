//! pixfx - blur, convolution and smear engines from the command line
//!
//! Renders a synthetic source, runs one engine or a YAML job over it and
//! prints a summary of the result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pixfx_cli::{Pattern, SourceSpec};
use pixfx_ops::{EdgeAction, SmearShape};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pixfx")]
#[command(author, version, about = "Pixel blur, convolution and smear engines")]
#[command(long_about = "
Runs the pixfx filter engines on a synthetic source image and prints a
summary (dimensions, channel means, changed pixels, SHA-256 digest).

Examples:
  pixfx blur --radius 2.5 --iterations 3
  pixfx blur --pattern noise --h-radius 4 --v-radius 0
  pixfx convolve --kernel gaussian --size 5 --sigma 1.5 --edge wrap
  pixfx smear --shape circles --density 0.2 --seed 7 -j 8
  pixfx --json run job.yaml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of smear worker threads (0 = auto, 1 = run inline)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Separable box blur
    #[command(visible_alias = "b")]
    Blur(BlurArgs),

    /// Kernel convolution
    #[command(visible_alias = "c")]
    Convolve(ConvolveArgs),

    /// Stochastic smear
    #[command(visible_alias = "s")]
    Smear(SmearArgs),

    /// Run a YAML job file
    Run(RunArgs),
}

/// Synthetic source options shared by the single-engine commands.
#[derive(Args, Clone)]
struct SourceArgs {
    /// Source pattern
    #[arg(short, long, value_enum, default_value_t = Pattern::Checker)]
    pattern: Pattern,

    /// Source width
    #[arg(short = 'W', long, default_value = "256")]
    width: usize,

    /// Source height
    #[arg(short = 'H', long, default_value = "256")]
    height: usize,

    /// Seed for the noise pattern
    #[arg(long, default_value = "0")]
    source_seed: u64,

    /// Checker square size
    #[arg(long, default_value = "8")]
    cell: usize,

    /// Checker/solid color, RRGGBB or AARRGGBB hex
    #[arg(long, default_value = "ff808080")]
    color: String,
}

impl SourceArgs {
    fn spec(&self) -> SourceSpec {
        SourceSpec {
            pattern: self.pattern,
            width: self.width,
            height: self.height,
            seed: self.source_seed,
            cell: self.cell,
            color: self.color.clone(),
        }
    }
}

#[derive(Args)]
struct BlurArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Radius for both directions
    #[arg(short, long, default_value = "2")]
    radius: f32,

    /// Horizontal radius (overrides --radius)
    #[arg(long)]
    h_radius: Option<f32>,

    /// Vertical radius (overrides --radius)
    #[arg(long)]
    v_radius: Option<f32>,

    /// Horizontal + vertical rounds; 3 approximates a Gaussian
    #[arg(short, long, default_value = "1")]
    iterations: u32,

    /// Blur straight (non-premultiplied) pixels
    #[arg(long)]
    no_premultiply: bool,
}

#[derive(Args)]
struct ConvolveArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Kernel preset: identity, box, gaussian, sharpen, edge, emboss, random
    #[arg(short, long, default_value = "gaussian")]
    kernel: pixfx_cli::KernelPreset,

    /// Kernel size for identity, box, gaussian and random
    #[arg(short, long, default_value = "3")]
    size: usize,

    /// Gaussian sigma
    #[arg(long, default_value = "1.0")]
    sigma: f32,

    /// Sharpen amount
    #[arg(long, default_value = "1.0")]
    amount: f32,

    /// Seed for the random kernel
    #[arg(long, default_value = "0")]
    kernel_seed: u64,

    /// Edge handling: zero, clamp, wrap
    #[arg(short, long, default_value = "clamp")]
    edge: EdgeAction,

    /// Leave alpha out of the convolution (output is opaque)
    #[arg(long)]
    exclude_alpha: bool,

    /// Convolve straight (non-premultiplied) pixels
    #[arg(long)]
    no_premultiply: bool,
}

#[derive(Args)]
struct SmearArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Stamp shape: crosses, lines, circles, squares, diamonds
    #[arg(long, default_value = "lines")]
    shape: SmearShape,

    /// Stamp density
    #[arg(short, long, default_value = "0.5")]
    density: f32,

    /// Stamp size in pixels
    #[arg(long, default_value = "8")]
    distance: u32,

    /// Line angle in degrees
    #[arg(short, long, default_value = "0")]
    angle: f32,

    /// Mix toward the stamp color, 0..1
    #[arg(short, long, default_value = "0.5")]
    mix: f32,

    /// Master seed
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[derive(Args)]
struct RunArgs {
    /// Job file (YAML)
    job: PathBuf,
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to install tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let opts = commands::Options {
        verbose: cli.verbose,
        threads: cli.threads,
        json: cli.json,
    };

    match cli.command {
        Commands::Blur(args) => commands::blur::run(args, &opts),
        Commands::Convolve(args) => commands::convolve::run(args, &opts),
        Commands::Smear(args) => commands::smear::run(args, &opts),
        Commands::Run(args) => commands::run::run(args, &opts),
    }
}
