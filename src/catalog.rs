//! Catalog URL layout
//!
//! Every URL the archiver touches on the catalog site is built here, from the
//! configured base URL and entity kind.

use crate::config::CatalogConfig;
use crate::entry::{EntryId, EntryRef};
use crate::ConfigError;
use url::Url;

/// URL builder for one catalog site
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Base URL without a trailing slash
    base: String,
    entity_kind: String,
}

impl Catalog {
    pub fn new(base_url: &str, entity_kind: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        Ok(Self {
            base: parsed.as_str().trim_end_matches('/').to_string(),
            entity_kind: entity_kind.to_string(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        Self::new(&config.base_url, &config.entity_kind)
    }

    pub fn entity_kind(&self) -> &str {
        &self.entity_kind
    }

    /// Landing page; carries the logged-in user's profile link
    pub fn home_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/", self.base))
    }

    /// The user's listing with the "all" box selected
    pub fn listing_url(&self, user_id: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/ghf.php?id={}&box=-1", self.base, user_id))
    }

    pub fn detail_url(&self, id: &EntryId) -> String {
        format!("{}/gryff.php?id={}", self.base, id)
    }

    /// Entry reference for an id given directly by the operator
    pub fn entry_ref(&self, id: &EntryId) -> EntryRef {
        EntryRef::new(id.to_string(), self.detail_url(id))
    }

    pub fn primary_image_url(&self, id: &EntryId) -> String {
        format!(
            "{}/static/{}/{}/{}.png",
            self.base,
            self.entity_kind,
            id.bucket(),
            id
        )
    }

    pub fn thumbnail_url(&self, id: &EntryId) -> String {
        format!(
            "{}/static/{}/thumbs/{}/{}.png",
            self.base,
            self.entity_kind,
            id.bucket(),
            id
        )
    }
}
