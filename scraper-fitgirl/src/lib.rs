use magnetite_scraper_prelude::{
    RepackListing, ResolvedEndpoint, ScrapeResult, Scraper, ScraperError, ScraperErrorReason,
};
use std::net::{IpAddr, Ipv4Addr};
use url::Url;

mod detail;
mod dns;
mod fetch;
mod search;

const DOMAIN: &str = "fitgirl-repacks.site";
// Public resolver used to sidestep the default one, which may be the
// component blocking the domain.
const DNS_SERVER: IpAddr = IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8));
pub const NAME: &str = "fitgirl";

#[derive(Debug, serde::Deserialize)]
pub struct FitgirlScraperConfig {
    #[serde(default = "FitgirlScraperConfig::default_domain")]
    pub domain: String,
    #[serde(default = "FitgirlScraperConfig::default_dns_server")]
    pub dns_server: IpAddr,
}

impl Default for FitgirlScraperConfig {
    fn default() -> Self {
        Self {
            domain: Self::default_domain(),
            dns_server: Self::default_dns_server(),
        }
    }
}

impl FitgirlScraperConfig {
    fn default_domain() -> String {
        DOMAIN.into()
    }

    fn default_dns_server() -> IpAddr {
        DNS_SERVER
    }

    pub fn build(self) -> Result<FitgirlScraper, reqwest::Error> {
        tracing::info!("building {NAME} scraper for {:?}", self.domain);
        Ok(FitgirlScraper {
            domain: self.domain,
            dns_server: self.dns_server,
            fetcher: fetch::PageFetcher::new()?,
        })
    }
}

#[derive(Debug)]
pub struct FitgirlScraper {
    domain: String,
    dns_server: IpAddr,
    fetcher: fetch::PageFetcher,
}

impl FitgirlScraper {
    pub fn new() -> Result<Self, reqwest::Error> {
        FitgirlScraperConfig::default().build()
    }

    async fn endpoint(&self) -> Result<ResolvedEndpoint, ScraperError> {
        dns::resolve_a(self.dns_server, &self.domain).await
    }

    /// Search against an already-resolved endpoint.
    pub async fn search_at(&self, endpoint: &ResolvedEndpoint, query: &str) -> ScrapeResult {
        let url = format!("{}/", endpoint.base_url);
        let url = match Url::parse_with_params(&url, &[("s", query)]) {
            Ok(value) => value,
            Err(cause) => {
                return ScrapeResult::from(ScraperError::new(
                    NAME,
                    ScraperErrorReason::UnableToBuildUrl { cause },
                ));
            }
        };

        let page = match self.fetcher.fetch(url.as_str(), &endpoint.domain).await {
            Ok(value) => value,
            Err(error) => return ScrapeResult::from(error),
        };
        if page.used_insecure_fallback {
            tracing::warn!("{NAME} search {query:?} served without certificate verification");
        }

        search::parse(&endpoint.domain, &endpoint.ip_address, &page.body)
    }

    /// Detail fetch for one listing page. The Host header is rebuilt from
    /// this scraper's own domain on every call; the listing link already
    /// points at the resolved address.
    pub async fn magnet_at(&self, url: &str) -> Result<String, ScraperError> {
        let page = self.fetcher.fetch(url, &self.domain).await?;
        detail::parse_magnet(&page.body)
    }
}

#[async_trait::async_trait]
impl Scraper for FitgirlScraper {
    async fn search(&self, query: &str) -> ScrapeResult {
        tracing::debug!("{NAME} searching {query:?}");
        let endpoint = match self.endpoint().await {
            Ok(value) => value,
            Err(error) => return ScrapeResult::from(error),
        };
        self.search_at(&endpoint, query).await
    }

    async fn magnet(&self, listing: &RepackListing) -> Result<String, ScraperError> {
        tracing::debug!("{NAME} resolving magnet for {:?}", listing.name);
        self.magnet_at(&listing.link).await
    }
}

#[cfg(test)]
mod tests {
    use super::FitgirlScraper;
    use magnetite_scraper_prelude::{RepackListing, ResolvedEndpoint};

    #[tokio::test]
    async fn should_search_resolved_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let scraper = FitgirlScraper::new().unwrap();
        let endpoint = ResolvedEndpoint::with_base_url(
            "fitgirl-repacks.site",
            "127.0.0.1",
            server.url(),
        );

        let search_page = server
            .mock("GET", "/?s=cyber+frontier")
            .match_header("host", "fitgirl-repacks.site")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(include_str!("./search.html"))
            .create_async()
            .await;

        let results = scraper.search_at(&endpoint, "cyber frontier").await;
        assert_eq!(results.listings.len(), 2);
        assert_eq!(results.errors.len(), 3);
        assert_eq!(
            results.listings[0].name,
            "Cyber Frontier: Deluxe Edition (v2.1 + 12 DLCs)"
        );
        // Listing links are rewritten to the resolved address so detail
        // fetches bypass the blocked resolver too.
        assert_eq!(
            results.listings[0].link,
            "https://127.0.0.1/cyber-frontier/"
        );
        assert_eq!(results.listings[1].id, "post-4722");

        search_page.assert_async().await;
    }

    #[tokio::test]
    async fn should_surface_fetch_failure_as_fatal_result() {
        let scraper = FitgirlScraper::new().unwrap();
        let endpoint = ResolvedEndpoint::with_base_url(
            "fitgirl-repacks.site",
            "127.0.0.1",
            "http://127.0.0.1:1",
        );

        let results = scraper.search_at(&endpoint, "anything").await;
        assert!(results.listings.is_empty());
        assert_eq!(results.errors.len(), 1);
        assert!(results.errors[0].reason.is_fatal());
    }

    #[tokio::test]
    async fn should_resolve_magnet_from_listing_link() {
        let mut server = mockito::Server::new_async().await;
        let scraper = FitgirlScraper::new().unwrap();

        let detail_page = server
            .mock("GET", "/starlit-manor/")
            .match_header("host", "fitgirl-repacks.site")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(include_str!("./detail.html"))
            .create_async()
            .await;

        let listing = RepackListing {
            id: "post-4722".into(),
            name: "Starlit Manor".into(),
            link: format!("{}/starlit-manor/", server.url()),
            genres: vec!["Adventure".into(), "Horror".into()],
            companies: vec!["Gloom Works".into()],
            languages: vec!["ENG".into()],
            original_size: "12.1 GB".into(),
            repack_size: "6.8 GB".into(),
            magnet: None,
        };

        let magnet = scraper.magnet_at(&listing.link).await.unwrap();
        assert!(magnet.starts_with("magnet:?xt=urn:btih:02c3a9f7e115"));

        detail_page.assert_async().await;
    }
}
