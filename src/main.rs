use clap::{Parser, Subcommand};
use std::path::PathBuf;

use bgline::config::{DEFAULT_BACKGROUND, DEFAULT_IMAGE_ROOT};
use bgline::detection::hough::HoughParams;
use bgline::detection::preprocessing::EdgeOperator;
use bgline::detection::segments::SegmentFilter;
use bgline::lenet::{Backend, ImageDataFormat, LeNet};
use bgline::{InspectConfig, Inspector, LogSink};

#[derive(Parser)]
#[command(name = "bgline")]
#[command(about = "Subtract a reference background and look for straight lines in what remains")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correct every image against the background and show the detected lines
    Inspect {
        /// Reference background image
        #[arg(long, default_value = DEFAULT_BACKGROUND)]
        background: PathBuf,

        /// Directory scanned recursively, or a single image
        #[arg(long, default_value = DEFAULT_IMAGE_ROOT)]
        images: PathBuf,

        /// Edge operator: sobel, canny or laplacian
        #[arg(long, default_value = "sobel")]
        edge: EdgeOperator,

        /// Minimum accumulator votes for a line
        #[arg(long, default_value_t = 50)]
        hough_threshold: u32,

        #[arg(long, default_value_t = 100)]
        min_line_length: u32,

        #[arg(long, default_value_t = 10)]
        max_line_gap: u32,

        /// Keep only near-horizontal segments of medium length
        #[arg(long)]
        filter_segments: bool,

        /// Save every step's image to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,

        /// Log results instead of opening a window
        #[arg(long)]
        headless: bool,
    },

    /// Show one image until a key is pressed
    Show {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },

    /// Print the input shape a LeNet network would be built with
    LenetShape {
        #[arg(long)]
        channels: usize,

        #[arg(long)]
        rows: usize,

        #[arg(long)]
        cols: usize,

        #[arg(long)]
        classes: usize,

        /// channels_first or channels_last; defaults to BGLINE_IMAGE_DATA_FORMAT
        #[arg(long)]
        data_format: Option<ImageDataFormat>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Inspect {
            background,
            images,
            edge,
            hough_threshold,
            min_line_length,
            max_line_gap,
            filter_segments,
            debug_out,
            headless,
        } => {
            let hough = HoughParams {
                threshold: hough_threshold,
                min_line_length,
                max_line_gap,
                ..HoughParams::default()
            };
            let config = InspectConfig::new()
                .with_background(background)
                .with_images(resolve_path(images))
                .with_edge_operator(edge)
                .with_hough(hough)
                .with_segment_filter(filter_segments.then(SegmentFilter::default))
                .with_debug_out(debug_out)
                .with_verbose(cli.verbose);
            run_inspect(&config, headless)
        }
        Commands::Show { image } => run_show(resolve_path(image)),
        Commands::LenetShape {
            channels,
            rows,
            cols,
            classes,
            data_format,
        } => {
            let backend = match data_format {
                Some(format) => Backend::new(format),
                None => Backend::from_env()?,
            };
            let stub = LeNet::build(channels, rows, cols, classes, None, None, &backend)?;
            println!("{}", stub.input_shape);
            Ok(())
        }
    }
}

/// Fall back to a file dialog when `path` does not exist
#[cfg(feature = "gui")]
fn resolve_path(path: PathBuf) -> PathBuf {
    if path.exists() {
        return path;
    }
    tracing::warn!("{} does not exist, asking for a file", path.display());
    let start = path
        .ancestors()
        .find(|p| p.is_dir())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    bgline::gui::pick_image(&start).unwrap_or(path)
}

#[cfg(not(feature = "gui"))]
fn resolve_path(path: PathBuf) -> PathBuf {
    path
}

fn run_inspect(config: &InspectConfig, headless: bool) -> anyhow::Result<()> {
    let inspector = Inspector::from_config(config)?;

    #[cfg(feature = "gui")]
    if !headless {
        return bgline::gui::review(inspector);
    }

    #[cfg(not(feature = "gui"))]
    if !headless {
        tracing::info!("Built without the gui feature, logging results only");
    }

    let mut sink = LogSink::default();
    let summary = inspector.run(&mut sink)?;
    println!(
        "Inspected {} file(s), {} skipped",
        summary.presented, summary.failed
    );
    Ok(())
}

#[cfg(feature = "gui")]
fn run_show(path: PathBuf) -> anyhow::Result<()> {
    let image = bgline::detection::background::load_color(&path)?;
    bgline::gui::show_image(image::DynamicImage::ImageRgb8(image))
}

#[cfg(not(feature = "gui"))]
fn run_show(path: PathBuf) -> anyhow::Result<()> {
    anyhow::bail!("Cannot show {}: built without the gui feature", path.display())
}
