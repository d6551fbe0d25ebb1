use serde::Deserialize;

/// Main configuration structure for Gryff-Archive
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Where the catalog lives and how its assets are addressed
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root URL of the catalog site
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Entity path segment used in asset URLs and the archive layout
    #[serde(rename = "entity-kind", default = "default_entity_kind")]
    pub entity_kind: String,

    /// User whose entries are archived; discovered from the session when absent
    #[serde(rename = "user-id", default)]
    pub user_id: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            entity_kind: default_entity_kind(),
            user_id: None,
        }
    }
}

/// HTTP session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// `Cookie` header copied from the operator's logged-in browser
    #[serde(default)]
    pub cookie: Option<String>,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory every archived entry is written under
    #[serde(rename = "archive-root")]
    pub archive_root: String,

    /// Optional path of the markdown batch summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

/// CSS selectors locating each field on the catalog pages
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_title_selector")]
    pub title: String,

    /// Block holding "<species> Gryff Level <n> (<n> exp)"
    #[serde(default = "default_separator_selector")]
    pub separator: String,

    #[serde(default = "default_description_selector")]
    pub description: String,

    /// Elements scanned, in document order, when a scoped selector is absent
    #[serde(rename = "text-blocks", default = "default_text_blocks_selector")]
    pub text_blocks: String,

    /// Scoped container for "<n> Wins / <n> Losses"
    #[serde(default)]
    pub stats: Option<String>,

    /// Scoped container for "<n> Hunting Exp"
    #[serde(default)]
    pub hunting: Option<String>,

    #[serde(rename = "listing-links", default = "default_listing_links_selector")]
    pub listing_links: String,

    #[serde(rename = "profile-link", default = "default_profile_link_selector")]
    pub profile_link: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: default_title_selector(),
            separator: default_separator_selector(),
            description: default_description_selector(),
            text_blocks: default_text_blocks_selector(),
            stats: None,
            hunting: None,
            listing_links: default_listing_links_selector(),
            profile_link: default_profile_link_selector(),
        }
    }
}

fn default_base_url() -> String {
    "https://gryffs.com".to_string()
}

fn default_entity_kind() -> String {
    "gryffs".to_string()
}

fn default_user_agent() -> String {
    concat!("gryff-archive/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_title_selector() -> String {
    "h1.page-title".to_string()
}

fn default_separator_selector() -> String {
    "div.pageSeparator".to_string()
}

fn default_description_selector() -> String {
    "#gryffsDesc".to_string()
}

fn default_text_blocks_selector() -> String {
    "div".to_string()
}

fn default_listing_links_selector() -> String {
    r#"#ghfList .ghfGryff a[href*="gryff.php?id="]"#.to_string()
}

fn default_profile_link_selector() -> String {
    r#".profileArea .inner a[href*="profile.php?id="]"#.to_string()
}
