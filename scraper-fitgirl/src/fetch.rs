use magnetite_scraper_prelude::{FetchedPage, ScraperError, ScraperErrorReason};
use reqwest::header::HOST;

use super::NAME;

/// Client pair sharing one policy: full certificate verification first, one
/// retry without it. Connecting to the bare address presents a certificate
/// issued for the domain name, so verification against the IP can fail even
/// though the content comes from the expected host.
#[derive(Debug)]
pub struct PageFetcher {
    verified: reqwest::Client,
    insecure: reqwest::Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            verified: reqwest::Client::builder().build()?,
            insecure: reqwest::Client::builder()
                .danger_accept_invalid_certs(true)
                .build()?,
        })
    }

    async fn attempt(
        &self,
        client: &reqwest::Client,
        url: &str,
        host: &str,
    ) -> Result<reqwest::Response, reqwest::Error> {
        client.get(url).header(HOST, host).send().await
    }

    /// GET `url` with `Host: {host}`, retrying exactly once without
    /// certificate verification if the verified attempt fails.
    pub async fn fetch(&self, url: &str, host: &str) -> Result<FetchedPage, ScraperError> {
        let (response, used_insecure_fallback) =
            match self.attempt(&self.verified, url, host).await {
                Ok(response) => (response, false),
                Err(cause) => {
                    tracing::warn!(
                        "{NAME} verified fetch of {url} failed ({cause}), retrying without verification"
                    );
                    let response =
                        self.attempt(&self.insecure, url, host)
                            .await
                            .map_err(|cause| {
                                ScraperError::new(
                                    NAME,
                                    ScraperErrorReason::UnableToQuery {
                                        url: url.to_string(),
                                        cause: cause.to_string(),
                                    },
                                )
                            })?;
                    (response, true)
                }
            };

        response
            .text()
            .await
            .map(|body| FetchedPage {
                body,
                used_insecure_fallback,
            })
            .map_err(|cause| {
                ScraperError::new(
                    NAME,
                    ScraperErrorReason::UnableToRead {
                        url: url.to_string(),
                        cause: cause.to_string(),
                    },
                )
            })
    }
}
