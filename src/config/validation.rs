use crate::config::types::{
    Config, FetcherConfig, HeaderConfig, OutputConfig, SelectorConfig, TargetConfig,
};
use crate::storage::Category;
use crate::ConfigError;
use reqwest::header::HeaderValue;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_target_config(&config.target)?;
    validate_selector_config(&config.selectors)?;
    validate_header_config(&config.headers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

/// Validates the target site description
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.category_param.is_empty() || config.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "category_param and page_param cannot be empty".to_string(),
        ));
    }

    if config.category_param == config.page_param {
        return Err(ConfigError::Validation(format!(
            "category_param and page_param must differ, both are '{}'",
            config.page_param
        )));
    }

    validate_category_keys(&config.categories)
}

/// Rejects empty keys and keys that map to the same store file
fn validate_category_keys(keys: &[String]) -> Result<(), ConfigError> {
    for (index, category) in keys.iter().enumerate() {
        if category.is_empty() {
            return Err(ConfigError::Validation(format!(
                "category #{} is empty",
                index
            )));
        }

        // Categories differing only in case share a store file
        let stem = Category::new(category.as_str()).file_stem();
        if keys[..index]
            .iter()
            .any(|earlier| Category::new(earlier.as_str()).file_stem() == stem)
        {
            return Err(ConfigError::Validation(format!(
                "category '{}' is listed more than once",
                category
            )));
        }
    }

    Ok(())
}

/// Categories a run covers: `only` when non-empty, else the configured ones
///
/// An override list is held to the same rules as the configured list.
pub fn select_categories(config: &Config, only: &[String]) -> Result<Vec<Category>, ConfigError> {
    let keys = if only.is_empty() {
        config.target.categories.as_slice()
    } else {
        validate_category_keys(only)?;
        only
    };
    Ok(keys.iter().map(|key| Category::new(key.as_str())).collect())
}

/// Validates that every selector parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for selector in [
        &config.records_container,
        &config.record_link,
        &config.pagination_link,
    ] {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }
    Ok(())
}

/// Validates the user agent pool
fn validate_header_config(config: &HeaderConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    for agent in &config.user_agents {
        if agent.trim().is_empty() {
            return Err(ConfigError::InvalidHeader(
                "user agent cannot be blank".to_string(),
            ));
        }
        HeaderValue::from_str(agent)
            .map_err(|_| ConfigError::InvalidHeader(format!("user agent '{}'", agent)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.error_log.is_empty() || config.summary.is_empty() {
        return Err(ConfigError::Validation(
            "error_log and summary file names cannot be empty".to_string(),
        ));
    }

    if config.error_log == config.summary {
        return Err(ConfigError::Validation(format!(
            "error_log and summary must be different files, both are '{}'",
            config.summary
        )));
    }

    Ok(())
}
