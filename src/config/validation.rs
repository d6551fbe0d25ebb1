use crate::config::types::{CatalogConfig, Config, OutputConfig, SelectorConfig, SessionConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_session_config(&config.session)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates catalog configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    // Used verbatim as a URL path segment and a directory name
    if config.entity_kind.is_empty()
        || !config
            .entity_kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "entity-kind must be non-empty and contain only alphanumerics, '-' or '_', got '{}'",
            config.entity_kind
        )));
    }

    if let Some(user_id) = &config.user_id {
        if user_id.is_empty() || !user_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "user-id must be numeric, got '{}'",
                user_id
            )));
        }
    }

    Ok(())
}

/// Validates session configuration
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be between 1 and 120, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(cookie) = &config.cookie {
        if cookie.trim().is_empty() || cookie.contains(['\r', '\n']) {
            return Err(ConfigError::Validation(
                "cookie must be a single non-empty header line".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.archive_root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "archive-root cannot be empty".to_string(),
        ));
    }

    if let Some(summary) = &config.summary_path {
        if summary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Checks that every configured selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    check_selector("title", &config.title)?;
    check_selector("separator", &config.separator)?;
    check_selector("description", &config.description)?;
    check_selector("text-blocks", &config.text_blocks)?;
    check_selector("listing-links", &config.listing_links)?;
    check_selector("profile-link", &config.profile_link)?;
    if let Some(stats) = &config.stats {
        check_selector("stats", stats)?;
    }
    if let Some(hunting) = &config.hunting {
        check_selector("hunting", hunting)?;
    }
    Ok(())
}

/// Compiles a selector, mapping failure to a config error
pub(crate) fn check_selector(name: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        name,
        selector: selector.to_string(),
    })
}
