mod render;

use app_state::{DEFAULT_SETTINGS_PATH, load_app_settings_from};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use leaf_analysis::{AnalysisSession, LeafAnalyzer, RawImage};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Classify a potato leaf photo as early blight, late blight, healthy, or not a leaf.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Photo of the leaf (jpg, png, gif, webp, ...).
    image: PathBuf,
    #[clap(long, short, default_value = DEFAULT_SETTINGS_PATH)]
    config: PathBuf,
    /// Print the verdict as JSON.
    #[clap(long, default_value_t = false, action)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let settings = load_app_settings_from(&args.config)?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.level.as_str().into()),
        )
        .init();

    let session = AnalysisSession::new(LeafAnalyzer::from_settings(&settings)?);
    let image = RawImage::from_path(&args.image).await?;

    match session.analyze(&image.to_data_url()).await {
        Ok(verdict) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                print!("{}", render::render_verdict(&verdict)?);
            }
            Ok(())
        }
        Err(e) => {
            error!("Analysis of {} failed: {e}", args.image.display());
            Err(eyre!(e.to_string()))
        }
    }
}
