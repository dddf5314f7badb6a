use url::ParseError;

/// Endpoint reached by querying an alternate DNS server for the site's
/// address. Requests go to `base_url` while `domain` travels in the Host
/// header, so name-based blocking never sees the domain on the wire.
#[derive(Clone, Debug)]
pub struct ResolvedEndpoint {
    pub domain: String,
    pub ip_address: String,
    pub base_url: String,
}

impl ResolvedEndpoint {
    pub fn new<D: Into<String>, I: Into<String>>(domain: D, ip_address: I) -> Self {
        let ip_address = ip_address.into();
        Self {
            domain: domain.into(),
            base_url: format!("https://{ip_address}"),
            ip_address,
        }
    }

    /// Endpoint with an explicit base url instead of the `https://{ip}`
    /// derivation. Lets tests point the scraper at a local server.
    pub fn with_base_url<D, I, U>(domain: D, ip_address: I, base_url: U) -> Self
    where
        D: Into<String>,
        I: Into<String>,
        U: Into<String>,
    {
        Self {
            domain: domain.into(),
            ip_address: ip_address.into(),
            base_url: base_url.into(),
        }
    }
}

/// Page body returned by the fetcher, with a record of whether certificate
/// verification had to be dropped to obtain it.
#[derive(Clone, Debug)]
pub struct FetchedPage {
    pub body: String,
    pub used_insecure_fallback: bool,
}

#[async_trait::async_trait]
pub trait Scraper: std::fmt::Debug {
    async fn search(&self, query: &str) -> ScrapeResult;
    async fn magnet(&self, listing: &RepackListing) -> Result<String, ScraperError>;
}

#[derive(Clone, Debug, Default)]
pub struct ScrapeResult {
    pub listings: Vec<RepackListing>,
    pub errors: Vec<ScraperError>,
}

impl From<ScraperError> for ScrapeResult {
    fn from(value: ScraperError) -> Self {
        Self {
            errors: vec![value],
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScraperError {
    pub origin: &'static str,
    pub reason: ScraperErrorReason,
}

#[derive(Clone, Debug)]
pub enum ScraperErrorReason {
    EntryIdNotFound { fragment: String },
    EntryNotARepack { fragment: String },
    EntrySummaryNotFound { fragment: String },
    EntrySummaryLinkNotFound { fragment: String },
    EntryLinkNotFound { fragment: String },
    EntryNameNotFound { fragment: String },
    EntrySummaryTextNotFound { fragment: String },
    EntryInformationIncomplete { fragment: String },
    ArticleNotFound { fragment: String },
    DetailLinksNotFound { fragment: String },
    DetailMagnetNotFound { fragment: String },
    DnsLookupFailed { domain: String, cause: String },
    DnsNoRecords { domain: String },
    UnableToQuery { url: String, cause: String },
    UnableToRead { url: String, cause: String },
    UnableToBuildUrl { cause: ParseError },
}

impl ScraperErrorReason {
    /// Label used in artifact filenames (`error_{kind}_{uuid}.html`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EntryIdNotFound { .. } => "missing_id",
            Self::EntryNotARepack { .. } => "not_a_game",
            Self::EntrySummaryNotFound { .. } => "missing_entry_summary",
            Self::EntrySummaryLinkNotFound { .. } => "missing_entry_summary_a",
            Self::EntryLinkNotFound { .. } => "missing_link",
            Self::EntryNameNotFound { .. } => "missing_name",
            Self::EntrySummaryTextNotFound { .. } => "missing_entry_summary_p",
            Self::EntryInformationIncomplete { .. } => "missing_information",
            Self::ArticleNotFound { .. } => "missing_article",
            Self::DetailLinksNotFound { .. } => "missing_hrefs",
            Self::DetailMagnetNotFound { .. } => "missing_link",
            Self::DnsLookupFailed { .. } => "dns_lookup_failed",
            Self::DnsNoRecords { .. } => "dns_no_records",
            Self::UnableToQuery { .. } => "unable_to_query",
            Self::UnableToRead { .. } => "unable_to_read",
            Self::UnableToBuildUrl { .. } => "unable_to_build_url",
        }
    }

    /// Raw markup that triggered the failure, kept for the forensic
    /// artifact. Transport failures carry none.
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::EntryIdNotFound { fragment }
            | Self::EntryNotARepack { fragment }
            | Self::EntrySummaryNotFound { fragment }
            | Self::EntrySummaryLinkNotFound { fragment }
            | Self::EntryLinkNotFound { fragment }
            | Self::EntryNameNotFound { fragment }
            | Self::EntrySummaryTextNotFound { fragment }
            | Self::EntryInformationIncomplete { fragment }
            | Self::ArticleNotFound { fragment }
            | Self::DetailLinksNotFound { fragment }
            | Self::DetailMagnetNotFound { fragment } => Some(fragment),
            _ => None,
        }
    }

    /// Transport failures abort the whole operation; extraction failures
    /// stay contained to a single listing or page.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DnsLookupFailed { .. }
                | Self::DnsNoRecords { .. }
                | Self::UnableToQuery { .. }
                | Self::UnableToRead { .. }
                | Self::UnableToBuildUrl { .. }
        )
    }
}

impl ScraperError {
    pub fn new(origin: &'static str, reason: ScraperErrorReason) -> Self {
        Self { origin, reason }
    }
}

impl std::fmt::Display for ScraperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ScraperError {{ origin={:?}, reason={:?} }}",
            self.origin, self.reason
        )
    }
}

impl std::error::Error for ScraperError {}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RepackListing {
    pub id: String,
    pub name: String,
    /// Listing page url with the domain portion already rewritten to the
    /// resolved address, so detail fetches bypass the blocked resolver too.
    pub link: String,
    pub genres: Vec<String>,
    pub companies: Vec<String>,
    pub languages: Vec<String>,
    pub original_size: String,
    pub repack_size: String,
    pub magnet: Option<String>,
}
