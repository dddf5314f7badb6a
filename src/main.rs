use magnetite::config::Config;
use magnetite::service::downloader::LogDownloader;
use magnetite::service::pipeline::Pipeline;
use std::sync::Arc;

fn init_logs() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "magnetite=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(cfg!(debug_assertions)))
        .try_init();
}

#[tokio::main]
async fn main() {
    init_logs();

    let config = match Config::from_env() {
        Ok(value) => value,
        Err(cause) => {
            tracing::error!("unable to load configuration: {cause}");
            std::process::exit(1);
        }
    };

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        eprintln!("usage: magnetite <search terms>");
        std::process::exit(2);
    }

    let scraper = match config.scraper.build() {
        Ok(value) => value,
        Err(cause) => {
            tracing::error!("unable to build scraper: {cause}");
            std::process::exit(1);
        }
    };
    let pipeline = Pipeline::new(
        Box::new(scraper),
        config.artifacts.build(),
        Arc::new(LogDownloader),
    );

    match pipeline.search(&query).await {
        Ok(listings) => {
            for listing in &listings {
                println!(
                    "{} [{}] original {}, repack {} -> {}",
                    listing.name,
                    listing.id,
                    listing.original_size,
                    listing.repack_size,
                    listing.link
                );
            }
        }
        Err(error) => {
            tracing::error!("search failed: {error}");
            std::process::exit(1);
        }
    }
}
