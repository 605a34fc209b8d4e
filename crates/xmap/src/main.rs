//! x-map command line tool.
//!
//! Reads delimited `lat,lon,value...` rows and writes one PNG per value
//! column, drawn over OpenStreetMap tiles sized and zoomed to fit the data.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use renderer::ValueRange;
use xmap::{output_paths, save_images, select_view, Dataset, PixelSize, XMap, XMapConfig};

#[derive(Parser, Debug)]
#[command(name = "x-map")]
#[command(about = "Plot coordinate-tagged data onto OpenStreetMap tiles")]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true, env = "X_MAP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw every value column over a map and save one PNG per column
    Plot(PlotArgs),

    /// Save the map covering the data without drawing on it
    Map(MapArgs),

    /// Print the plot area and zoom level without fetching tiles
    Bounds(ViewArgs),
}

/// Options shared by all commands.
#[derive(Args, Debug)]
struct ViewArgs {
    /// Input file with `lat,lon,value...` rows ("-" for stdin)
    input: PathBuf,

    /// Minimum image width in pixels
    #[arg(long)]
    min_width: Option<u32>,

    /// Minimum image height in pixels
    #[arg(long)]
    min_height: Option<u32>,

    /// Margin around the data in percent of its extent
    #[arg(short, long)]
    extend: Option<f64>,
}

#[derive(Args, Debug)]
struct MapArgs {
    #[command(flatten)]
    view: ViewArgs,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Directory for cached tiles
    #[arg(long, env = "X_MAP_TILE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[command(flatten)]
    view: ViewArgs,

    /// Output PNG path; repeat once per value column or give one to number them
    #[arg(short, long, required = true)]
    output: Vec<PathBuf>,

    /// Caption text; repeat once per value column or give one for all
    #[arg(long)]
    caption: Vec<String>,

    /// Colormap name (plasma, viridis, inferno, grayscale; `_r` reverses)
    #[arg(long)]
    colormap: Option<String>,

    /// Lower end of a fixed value range
    #[arg(long, requires = "value_max")]
    value_min: Option<f64>,

    /// Upper end of a fixed value range
    #[arg(long, requires = "value_min")]
    value_max: Option<f64>,

    /// Do not draw markers
    #[arg(long)]
    no_markers: bool,

    /// Do not connect consecutive rows with lines
    #[arg(long)]
    no_lines: bool,

    /// Directory for cached tiles
    #[arg(long, env = "X_MAP_TILE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => XMapConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => XMapConfig::default(),
    };
    config.apply_env_overrides();

    match cli.command {
        Command::Plot(args) => run_plot(config, args),
        Command::Map(args) => run_map(config, args),
        Command::Bounds(args) => run_bounds(config, args),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_dataset(path: &Path) -> Result<Dataset> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };

    let dataset = Dataset::from_delimited_str(&text)
        .with_context(|| format!("Invalid input in {}", path.display()))?;
    info!(
        rows = dataset.len(),
        series = dataset.value_columns(),
        "Loaded dataset"
    );
    Ok(dataset)
}

fn apply_view_args(config: &mut XMapConfig, args: &ViewArgs) -> Result<()> {
    config.min_size = PixelSize::new(
        args.min_width.unwrap_or(config.min_size.width),
        args.min_height.unwrap_or(config.min_size.height),
    );
    if let Some(extend) = args.extend {
        config.extend_percentage = extend;
    }
    config.validate().context("Invalid options")?;
    Ok(())
}

fn run_plot(mut config: XMapConfig, args: PlotArgs) -> Result<()> {
    if let Some(colormap) = args.colormap {
        config.colormap = colormap;
    }
    if let (Some(min), Some(max)) = (args.value_min, args.value_max) {
        config.value_range = Some(ValueRange::new(min, max));
    }
    config.markers &= !args.no_markers;
    config.gradient_lines &= !args.no_lines;
    if args.cache_dir.is_some() {
        config.tiles.cache_dir = args.cache_dir;
    }
    apply_view_args(&mut config, &args.view)?;

    let dataset = read_dataset(&args.view.input)?;
    let paths = output_paths(&args.output, dataset.value_columns().max(1))?;

    let provider = config
        .tiles
        .build_provider()
        .context("Failed to set up tile provider")?;
    let xmap = XMap::new(&provider, config)?;

    let images = xmap.plot(&dataset, &args.caption)?;
    save_images(&images, &paths)?;

    let stats = provider.fetcher().stats();
    info!(
        images = images.len(),
        tile_misses = stats.misses(),
        cache_hit_rate = stats.hit_rate(),
        "Done"
    );
    Ok(())
}

fn run_map(mut config: XMapConfig, args: MapArgs) -> Result<()> {
    if args.cache_dir.is_some() {
        config.tiles.cache_dir = args.cache_dir;
    }
    apply_view_args(&mut config, &args.view)?;

    let dataset = read_dataset(&args.view.input)?;
    let provider = config
        .tiles
        .build_provider()
        .context("Failed to set up tile provider")?;
    let view = XMap::new(&provider, config)?.plot_map(&dataset)?;

    save_images(&[view.image()], &[args.output])?;
    Ok(())
}

fn run_bounds(mut config: XMapConfig, args: ViewArgs) -> Result<()> {
    apply_view_args(&mut config, &args)?;

    let dataset = read_dataset(&args.input)?;
    let raw = dataset.bounding_box()?;
    let (bbox, selection) = select_view(
        &dataset,
        config.min_size,
        config.extend_percentage,
        config.tiles.tile_size,
        config.tiles.max_zoom,
        config.tiles.max_tiles,
    )?;
    let (center_lat, center_lon) = bbox.center();

    println!("data    {}", raw);
    println!("plot    {}", bbox);
    println!("center  {:.6}, {:.6}", center_lat, center_lon);
    println!(
        "zoom    {}{}",
        selection.zoom,
        if selection.capped { " (capped)" } else { "" }
    );
    println!(
        "size    {:.0} x {:.0} px",
        selection.span.0.ceil(),
        selection.span.1.ceil()
    );
    Ok(())
}
