use magnetite_scraper_prelude::RepackListing;

/// External acquisition engine. The pipeline's responsibility ends at the
/// handoff; implementations own queuing, resumption and persistence.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, listing: RepackListing);
}

/// Stand-in collaborator that only records the handoff in the logs.
#[derive(Debug, Default)]
pub struct LogDownloader;

#[async_trait::async_trait]
impl Downloader for LogDownloader {
    async fn download(&self, listing: RepackListing) {
        tracing::info!(
            "download requested for {:?} ({})",
            listing.name,
            listing.magnet.as_deref().unwrap_or("no magnet link")
        );
    }
}
