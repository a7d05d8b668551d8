use app_state::load_app_settings;
use leaf_analysis::{LeafAnalyzer, RawImage};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    color_eyre::install()?;

    let settings = load_app_settings()?;
    let analyzer = LeafAnalyzer::from_settings(&settings)?;

    let images: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();
    if images.is_empty() {
        eprintln!("usage: run_leaf_analysis <image>...");
        return Ok(());
    }

    for image in &images {
        let now = Instant::now();
        let raw = RawImage::from_path(image).await?;
        match analyzer.analyze(&raw).await {
            Ok(verdict) => println!(
                "{}: {} ({}%) - {}\n\tanalyze {:?}",
                image.display(),
                verdict.label,
                verdict.confidence_percent(),
                verdict.explanation,
                now.elapsed()
            ),
            Err(e) => eprintln!("{}: {e}", image.display()),
        }
    }

    Ok(())
}
