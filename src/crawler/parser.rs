//! Link extraction from HTML pages
//!
//! Every start tag is a candidate, whatever its name: the link is its `href`
//! attribute, or its `src` attribute when there is no `href`. That picks up
//! anchors, images, scripts, stylesheets and frames alike; the classifier sorts
//! out which of them are worth following.

use crate::url::Address;
use scraper::Html;
use thiserror::Error;

/// A reference that could not be turned into an address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot resolve {reference:?}: {reason}")]
pub struct MalformedReference {
    pub reference: String,
    pub reason: String,
}

/// A parsed page and the address it was fetched from
///
/// `scraper::Html` is not `Send`, so an extractor must be created and drained
/// without an `.await` in between.
pub struct LinkExtractor {
    document: Html,
    page: Address,
}

impl LinkExtractor {
    /// Parses markup; malformed HTML is repaired the way browsers repair it
    pub fn parse(markup: &str, page: &Address) -> Self {
        Self {
            document: Html::parse_document(markup),
            page: page.clone(),
        }
    }

    pub fn page(&self) -> &Address {
        &self.page
    }

    /// Lazily yields the page's links in document order
    ///
    /// # Rules
    ///
    /// - The reference is cut at its first `#`
    /// - `mailto:` references are skipped, in any letter case
    /// - The rest is resolved against the page address
    /// - A link back to the page itself is skipped
    ///
    /// Unresolvable references are yielded as `Err` so the caller can report them.
    /// Duplicates are not removed here.
    pub fn links(&self) -> impl Iterator<Item = Result<Address, MalformedReference>> + '_ {
        self.document
            .root_element()
            .descendants()
            .filter_map(|node| node.value().as_element())
            .filter_map(|element| element.attr("href").or_else(|| element.attr("src")))
            .filter_map(move |raw| resolve_reference(&self.page, raw))
    }
}

/// Turns one raw attribute value into a candidate, or None if it is skipped
fn resolve_reference(page: &Address, raw: &str) -> Option<Result<Address, MalformedReference>> {
    let reference = raw.find('#').map_or(raw, |end| &raw[..end]).trim();

    if reference
        .get(..7)
        .map_or(false, |scheme| scheme.eq_ignore_ascii_case("mailto:"))
    {
        return None;
    }

    match page.resolve(reference) {
        Ok(address) if address == *page => None,
        Ok(address) => Some(Ok(address)),
        Err(e) => Some(Err(MalformedReference {
            reference: raw.to_string(),
            reason: e.to_string(),
        })),
    }
}

/// Convenience function for extracting the resolvable links of a page
pub fn extract_links(markup: &str, page: &Address) -> Vec<Address> {
    LinkExtractor::parse(markup, page)
        .links()
        .filter_map(Result::ok)
        .collect()
}
