//! Extraction of fields and asset references from catalog pages
//!
//! This module contains:
//! - Field extraction from entry detail pages (`fields`)
//! - Asset URL resolution and embedded-image discovery (`assets`)
//! - A rendered-text helper shared by both (`text`)

mod assets;
mod fields;
mod text;

pub use assets::{extract_embedded_images, resolve_primary_and_thumb, EmbeddedImage, PrimaryAssets};
pub use fields::{
    extract_fields, normalize_name, parse_battle_record, parse_hunting_exp, parse_separator,
    ExtractedFields,
};
pub use text::inner_text;

use crate::config::{check_selector, SelectorConfig};
use crate::ConfigError;
use scraper::Selector;

/// Compiled selectors for every page the archiver reads
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub title: Selector,
    pub separator: Selector,
    pub description: Selector,
    pub text_blocks: Selector,
    pub stats: Option<Selector>,
    pub hunting: Option<Selector>,
    pub listing_links: Selector,
    pub profile_link: Selector,
    /// Images inside the description container
    pub embedded_images: Selector,
    /// Selector text, kept for error messages
    pub sources: SelectorConfig,
}

impl PageSelectors {
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: check_selector("title", &config.title)?,
            separator: check_selector("separator", &config.separator)?,
            description: check_selector("description", &config.description)?,
            text_blocks: check_selector("text-blocks", &config.text_blocks)?,
            stats: config
                .stats
                .as_deref()
                .map(|s| check_selector("stats", s))
                .transpose()?,
            hunting: config
                .hunting
                .as_deref()
                .map(|s| check_selector("hunting", s))
                .transpose()?,
            listing_links: check_selector("listing-links", &config.listing_links)?,
            profile_link: check_selector("profile-link", &config.profile_link)?,
            embedded_images: check_selector("embedded-images", "img[src]")?,
            sources: config.clone(),
        })
    }
}
