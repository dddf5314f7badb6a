use magnetite_scraper_prelude::{ScraperError, ScraperErrorReason};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use super::NAME;

static ARTICLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

const MAGNET_SCHEME: &str = "magnet:";

/// Href of the first magnet anchor in the page's main article. Later
/// matches are ignored.
pub fn parse_magnet(html: &str) -> Result<String, ScraperError> {
    let document = Html::parse_document(html);

    let article = document.select(&ARTICLE_SELECTOR).next().ok_or_else(|| {
        ScraperError::new(
            NAME,
            ScraperErrorReason::ArticleNotFound {
                fragment: html.to_string(),
            },
        )
    })?;

    let anchors: Vec<_> = article.select(&ANCHOR_SELECTOR).collect();
    if anchors.is_empty() {
        return Err(ScraperError::new(
            NAME,
            ScraperErrorReason::DetailLinksNotFound {
                fragment: article.html(),
            },
        ));
    }

    anchors
        .iter()
        .filter_map(|anchor| anchor.value().attr("href"))
        .find(|href| href.starts_with(MAGNET_SCHEME))
        .map(String::from)
        .ok_or_else(|| {
            ScraperError::new(
                NAME,
                ScraperErrorReason::DetailMagnetNotFound {
                    fragment: article.html(),
                },
            )
        })
}

#[cfg(test)]
mod tests {
    use super::parse_magnet;
    use magnetite_scraper_prelude::ScraperErrorReason;

    #[test]
    fn should_return_first_magnet_anchor() {
        let html = r#"<html><body><article>
            <p><a href="https://fitgirl-repacks.site/all-my-repacks-a-z/">All repacks</a></p>
            <ul>
                <li><a href="magnet:?xt=urn:btih:6ff1d9a1b3&amp;dn=cyber-frontier">magnet</a></li>
                <li><a href="https://mirror.example.org/cyber-frontier">mirror</a></li>
            </ul>
        </article></body></html>"#;

        let magnet = parse_magnet(html).unwrap();
        assert_eq!(magnet, "magnet:?xt=urn:btih:6ff1d9a1b3&dn=cyber-frontier");
    }

    #[test]
    fn should_report_missing_article() {
        let html = "<html><body><div>nothing here</div></body></html>";
        let error = parse_magnet(html).unwrap_err();
        assert!(matches!(
            error.reason,
            ScraperErrorReason::ArticleNotFound { .. }
        ));
        assert_eq!(error.reason.kind(), "missing_article");
    }

    #[test]
    fn should_report_missing_hrefs() {
        let html = "<html><body><article><p>text only</p></article></body></html>";
        let error = parse_magnet(html).unwrap_err();
        assert!(matches!(
            error.reason,
            ScraperErrorReason::DetailLinksNotFound { .. }
        ));
        assert_eq!(error.reason.kind(), "missing_hrefs");
    }

    #[test]
    fn should_report_missing_magnet_link() {
        let html = r#"<html><body><article>
            <a href="https://mirror.example.org/one">one</a>
            <a href="https://mirror.example.org/two">two</a>
        </article></body></html>"#;
        let error = parse_magnet(html).unwrap_err();
        assert!(matches!(
            error.reason,
            ScraperErrorReason::DetailMagnetNotFound { .. }
        ));
        assert_eq!(error.reason.kind(), "missing_link");
    }
}
