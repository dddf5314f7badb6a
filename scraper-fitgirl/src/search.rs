use magnetite_scraper_prelude::{RepackListing, ScrapeResult, ScraperError, ScraperErrorReason};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::NAME;

static ARTICLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static CATEGORY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.cat-links").unwrap());
static SUMMARY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.entry-summary").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static NAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.screen-reader-text").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Only articles in this category are repacks; the site also interleaves
/// news posts and updates in search results.
const REPACK_CATEGORY: &str = "Lossless Repack";

// Markers of the description paragraph in the order the site prints them.
// Each field's value is the text strictly between its marker's end and the
// next marker's start. Dual entries cover the singular/plural spellings the
// site alternates between; the first spelling found wins.
const GENRES_MARKERS: &[&str] = &["Genres/Tags:"];
const COMPANIES_MARKERS: &[&str] = &["Companies:", "Company:"];
const LANGUAGES_MARKERS: &[&str] = &["Languages:", "Language:"];
const ORIGINAL_SIZE_MARKERS: &[&str] = &["Original Size:"];
const REPACK_SIZE_MARKERS: &[&str] = &["Repack Size:"];
const MIRRORS_MARKER: &str = "Download Mirrors";

struct MarkerHit {
    start: usize,
    value_start: usize,
}

fn locate(text: &str, labels: &[&str]) -> Option<MarkerHit> {
    labels.iter().find_map(|label| {
        text.find(label).map(|start| MarkerHit {
            start,
            value_start: start + label.len(),
        })
    })
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value
        .split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

struct DescriptionFields {
    genres: Vec<String>,
    companies: Vec<String>,
    languages: Vec<String>,
    original_size: String,
    repack_size: String,
}

/// Slices the free-text description between its markers. All five field
/// markers are required and must appear in canonical order; the mirrors
/// marker only bounds the last field and may be absent, in which case the
/// repack size runs to the end of the text.
fn segment_description(text: &str) -> Option<DescriptionFields> {
    let genres = locate(text, GENRES_MARKERS)?;
    let companies = locate(text, COMPANIES_MARKERS)?;
    let languages = locate(text, LANGUAGES_MARKERS)?;
    let original_size = locate(text, ORIGINAL_SIZE_MARKERS)?;
    let repack_size = locate(text, REPACK_SIZE_MARKERS)?;
    let end = text.find(MIRRORS_MARKER).map_or(text.len(), |start| start);

    let starts = [
        genres.start,
        companies.start,
        languages.start,
        original_size.start,
        repack_size.start,
        end,
    ];
    if starts.windows(2).any(|pair| pair[0] >= pair[1]) {
        return None;
    }

    Some(DescriptionFields {
        genres: split_list(&text[genres.value_start..companies.start], ','),
        companies: split_list(&text[companies.value_start..languages.start], ','),
        languages: split_list(&text[languages.value_start..original_size.start], '/'),
        original_size: text[original_size.value_start..repack_size.start]
            .trim()
            .to_string(),
        repack_size: text[repack_size.value_start..end].trim().to_string(),
    })
}

fn parse_id(article: &ElementRef) -> Result<String, ScraperError> {
    article.value().attr("id").map(String::from).ok_or_else(|| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::EntryIdNotFound {
                fragment: article.html(),
            },
        )
    })
}

fn parse_category(article: &ElementRef) -> Result<(), ScraperError> {
    let category = article
        .select(&CATEGORY_SELECTOR)
        .next()
        .map(|span| span.text().collect::<String>())
        .unwrap_or_default();
    if category == REPACK_CATEGORY {
        Ok(())
    } else {
        Err(ScraperError::new(
            NAME,
            ScraperErrorReason::EntryNotARepack {
                fragment: article.html(),
            },
        ))
    }
}

fn parse_summary<'a>(article: &'a ElementRef) -> Result<ElementRef<'a>, ScraperError> {
    article.select(&SUMMARY_SELECTOR).next().ok_or_else(|| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::EntrySummaryNotFound {
                fragment: article.html(),
            },
        )
    })
}

fn parse_summary_link<'a>(summary: &'a ElementRef) -> Result<ElementRef<'a>, ScraperError> {
    summary.select(&ANCHOR_SELECTOR).next().ok_or_else(|| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::EntrySummaryLinkNotFound {
                fragment: summary.html(),
            },
        )
    })
}

fn parse_link(anchor: &ElementRef, domain: &str, ip: &str) -> Result<String, ScraperError> {
    anchor
        .value()
        .attr("href")
        .map(|href| href.replace(domain, ip))
        .ok_or_else(|| {
            ScraperError::new(
                NAME,
                ScraperErrorReason::EntryLinkNotFound {
                    fragment: anchor.html(),
                },
            )
        })
}

fn parse_name(anchor: &ElementRef) -> Result<String, ScraperError> {
    anchor
        .select(&NAME_SELECTOR)
        .next()
        .map(|span| span.text().collect::<String>().trim().to_string())
        .ok_or_else(|| {
            ScraperError::new(
                NAME,
                ScraperErrorReason::EntryNameNotFound {
                    fragment: anchor.html(),
                },
            )
        })
}

fn parse_description(summary: &ElementRef) -> Result<String, ScraperError> {
    summary
        .select(&PARAGRAPH_SELECTOR)
        .next()
        .map(|paragraph| paragraph.text().collect::<String>())
        .ok_or_else(|| {
            ScraperError::new(
                NAME,
                ScraperErrorReason::EntrySummaryTextNotFound {
                    fragment: summary.html(),
                },
            )
        })
}

fn parse_article(article: ElementRef, domain: &str, ip: &str) -> Result<RepackListing, ScraperError> {
    let id = parse_id(&article)?;
    parse_category(&article)?;
    let summary = parse_summary(&article)?;
    let anchor = parse_summary_link(&summary)?;
    let link = parse_link(&anchor, domain, ip)?;
    let name = parse_name(&anchor)?;
    let description = parse_description(&summary)?;
    let fields = segment_description(&description).ok_or_else(|| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::EntryInformationIncomplete {
                fragment: description.clone(),
            },
        )
    })?;

    Ok(RepackListing {
        id,
        name,
        link,
        genres: fields.genres,
        companies: fields.companies,
        languages: fields.languages,
        original_size: fields.original_size,
        repack_size: fields.repack_size,
        magnet: None,
    })
}

/// One malformed article never aborts the batch: its error is accumulated
/// and the remaining articles are still parsed, in document order.
pub fn parse(domain: &str, ip: &str, html: &str) -> ScrapeResult {
    let mut results = ScrapeResult::default();
    let html = Html::parse_document(html);

    for article in html.select(&ARTICLE_SELECTOR) {
        match parse_article(article, domain, ip) {
            Ok(listing) => results.listings.push(listing),
            Err(error) => results.errors.push(error),
        }
    }

    results
}
