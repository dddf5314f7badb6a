use magnetite_scraper_prelude::{RepackListing, Scraper, ScraperError};
use std::sync::Arc;

use super::artifact::ArtifactStore;
use super::downloader::Downloader;

pub struct Pipeline {
    scraper: Box<dyn Scraper + Send + Sync>,
    artifacts: ArtifactStore,
    downloader: Arc<dyn Downloader>,
}

impl Pipeline {
    pub fn new(
        scraper: Box<dyn Scraper + Send + Sync>,
        artifacts: ArtifactStore,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        Self {
            scraper,
            artifacts,
            downloader,
        }
    }

    fn persist_artifacts(&self, errors: &[ScraperError]) {
        for error in errors {
            // Transport failures carry no markup to preserve.
            let Some(fragment) = error.reason.fragment() else {
                continue;
            };
            match self.artifacts.record(error.reason.kind(), fragment) {
                Ok(path) => {
                    tracing::debug!("artifact for {} written to {path:?}", error.reason.kind());
                }
                // A failing store must not change the skip decision already
                // made for the listing.
                Err(cause) => {
                    tracing::warn!("unable to persist {} artifact: {cause}", error.reason.kind());
                }
            }
        }
    }

    /// Runs a search and returns the listings that parsed. Extraction
    /// losses become artifacts and the remaining listings still come back;
    /// a transport failure aborts with no listings.
    pub async fn search(&self, query: &str) -> Result<Vec<RepackListing>, ScraperError> {
        let result = self.scraper.search(query).await;
        self.persist_artifacts(&result.errors);

        if let Some(fatal) = result.errors.iter().find(|error| error.reason.is_fatal()) {
            return Err(fatal.clone());
        }

        tracing::info!(
            "search {query:?}: {} listings parsed, {} discarded",
            result.listings.len(),
            result.errors.len()
        );
        Ok(result.listings)
    }

    /// Resolves the listing's magnet link, then hands the listing to the
    /// downloader on its own task. Completion of the download is never
    /// awaited; the pipeline's contract ends at the spawn.
    pub async fn download(&self, mut listing: RepackListing) -> Result<String, ScraperError> {
        let magnet = match self.scraper.magnet(&listing).await {
            Ok(value) => value,
            Err(error) => {
                self.persist_artifacts(std::slice::from_ref(&error));
                return Err(error);
            }
        };

        listing.magnet = Some(magnet.clone());
        let downloader = Arc::clone(&self.downloader);
        tokio::spawn(async move {
            downloader.download(listing).await;
        });

        Ok(magnet)
    }
}
