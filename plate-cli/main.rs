use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use plate_cli::{AlignConfig, Aligner, PngSink, load_grayscale};
use plate_core::init_thread_pool;

/// Register the three color exposures of a glass plate scan into one image
#[derive(Parser, Debug)]
#[command(name = "plate", version, about)]
struct Args {
    /// Plate scan with blue, green and red exposures stacked top to bottom
    #[arg(default_value = "emir.jpg")]
    image: PathBuf,

    /// Directory the band previews, match plots and composite are written to
    #[arg(long, default_value = "aligned")]
    out_dir: PathBuf,

    /// TOML or JSON configuration file
    #[cfg(feature = "serde")]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keypoints per channel
    #[arg(long)]
    max_features: Option<usize>,

    /// Fraction of best matches kept for estimation
    #[arg(long)]
    keep_fraction: Option<f32>,

    /// RANSAC seed
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(long)]
    threads: Option<usize>,
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Seconds))
        .init();
}

fn build_config(args: &Args) -> Result<AlignConfig, Box<dyn Error>> {
    #[cfg(feature = "serde")]
    let mut config = match &args.config {
        Some(path) => AlignConfig::load(path)?,
        None => AlignConfig::default(),
    };
    #[cfg(not(feature = "serde"))]
    let mut config = AlignConfig::default();

    if let Some(n) = args.max_features {
        config.max_features = n;
    }
    if let Some(f) = args.keep_fraction {
        config.keep_fraction = f;
    }
    if let Some(seed) = args.seed {
        config.ransac.seed = seed;
    }
    if let Some(n) = args.threads {
        config.n_threads = n;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let args = Args::parse();

    let config = build_config(&args)?;
    init_thread_pool(config.n_threads)?;
    log::info!("Configuration: {}", config.summary());

    let plate = load_grayscale(&args.image)?;
    let mut sink = PngSink::new(&args.out_dir)?;
    let report = Aligner::new(config)?.align(&plate, &mut sink)?;

    for (name, pair) in [("blue", &report.blue_to_green), ("red", &report.red_to_green)] {
        log::info!(
            "{} -> green: {} matches, {} kept, {} inliers",
            name,
            pair.n_matches,
            pair.n_kept,
            pair.n_inliers
        );
    }
    log::info!("Wrote {} images to {}", sink.written().len(), args.out_dir.display());
    Ok(())
}
