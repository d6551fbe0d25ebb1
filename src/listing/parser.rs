//! Listing and profile page scraping

use crate::entry::EntryRef;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Collects entry references from a listing page
///
/// Links without a numeric `id` query parameter are skipped. An entry linked
/// several times (thumbnail and name, say) is kept once, at its first
/// position.
pub fn parse_listing(document: &Html, page_url: &Url, links: &Selector) -> Vec<EntryRef> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for anchor in document.select(links) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = page_url.join(href.trim()) else {
            tracing::debug!("Skipping unparseable listing link: {}", href);
            continue;
        };
        let Some(id) = numeric_id_param(&url) else {
            tracing::debug!("Skipping listing link without numeric id: {}", url);
            continue;
        };

        if seen.insert(id.clone()) {
            entries.push(EntryRef::new(id, url.to_string()));
        }
    }

    entries
}

/// Reads the logged-in user's id from the profile link, if present
pub fn parse_user_id(document: &Html, page_url: &Url, profile_link: &Selector) -> Option<String> {
    document
        .select(profile_link)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| page_url.join(href.trim()).ok())
        .find_map(|url| numeric_id_param(&url))
}

/// Value of the `id` query parameter when it is all digits
fn numeric_id_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()))
}
