use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, Level};

use glitch_compositor::{
    config::Config,
    glitch::EffectVariant,
    render::GlitchEngine,
};

#[derive(Parser)]
#[command(
    name = "glitch-compositor",
    version,
    about = "Render a data-glitch effect over a still image",
    long_about = "Glitch-Compositor draws randomized streaks over an image, composites them \
                  as a blurred halo, a reveal mask or palette bars, then tears the result \
                  with shifted pixel bands."
)]
struct Cli {
    /// Source image path (PNG, JPEG)
    #[arg(short, long)]
    input: PathBuf,

    /// Output PNG path
    #[arg(short, long)]
    output: PathBuf,

    /// Effect variant (blur-halo, mask-reveal, color-bars)
    #[arg(long)]
    variant: Option<String>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Glitch-Compositor v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", cli.input);
    info!("Output: {:?}", cli.output);

    let variant = cli
        .variant
        .as_deref()
        .map(str::parse::<EffectVariant>)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    // Load configuration
    let mut config = match cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file_with_variant(&config_path, variant)?
        }
        None => {
            info!("Using default configuration");
            Config::for_variant(variant.unwrap_or_default())
        }
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let mut rng = match config.seed {
        Some(seed) => {
            info!("Seeding random stream with {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    info!("Using {} variant", config.variant);
    let engine = GlitchEngine::new(config)?;

    let frame = engine
        .render_file(&cli.input, &mut rng)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    frame.save_png(&cli.output)?;
    info!("Render complete! Output saved to: {:?}", cli.output);
    Ok(())
}
