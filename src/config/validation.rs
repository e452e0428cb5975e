use std::collections::HashSet;

use crate::config::types::{Config, CrawlConfig, OutputConfig, SchemaEntry};
use crate::filter::FilterConfig;
use crate::process::{OutputMode, SortBy};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_output_config(&config.output)?;
    validate_filter_config(&config.filter)?;
    validate_schemas(&config.schemas)?;
    Ok(())
}

fn validate_delay(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if let Some(delay) = config.request_delay {
        validate_delay("request-delay", delay)?;
    }

    if let Some(timeout) = config.timeout {
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "timeout must be greater than 0 seconds, got {}",
                timeout
            )));
        }
    }

    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent cannot be empty".to_string(),
            ));
        }
    }

    if let Some(domains) = &config.allowed_domains {
        for domain in domains {
            validate_domain(domain)?;
        }
    }

    Ok(())
}

/// Validates an allowed-domain entry
fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains entries cannot be empty".to_string(),
        ));
    }

    if domain.contains("://") || domain.contains('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "allowed-domains entries must be bare domains, got '{}'",
            domain
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if let Some(directory) = &config.directory {
        if directory.is_empty() {
            return Err(ConfigError::Validation(
                "directory cannot be empty".to_string(),
            ));
        }
    }

    if let Some(mode) = &config.mode {
        mode.parse::<OutputMode>()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
    }

    if let Some(sort_by) = &config.sort_by {
        validate_sort_by(sort_by)?;
    }

    Ok(())
}

fn validate_sort_by(sort_by: &str) -> Result<(), ConfigError> {
    sort_by
        .parse::<SortBy>()
        .map(|_| ())
        .map_err(|e| ConfigError::Validation(e.to_string()))
}

/// Validates filter patterns and size bounds
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if let Some(pattern) = config.first_invalid_pattern() {
        return Err(ConfigError::InvalidPattern(format!(
            "'{}' is not a valid wildcard pattern",
            pattern
        )));
    }

    if let (Some(min), Some(max)) = (config.min_size, config.max_size) {
        if min > max {
            return Err(ConfigError::Validation(format!(
                "min-size ({}) cannot be greater than max-size ({})",
                min, max
            )));
        }
    }

    Ok(())
}

/// Validates schema entries
fn validate_schemas(schemas: &[SchemaEntry]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();

    for entry in schemas {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "schema name cannot be empty".to_string(),
            ));
        }

        if !names.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate schema name '{}'",
                entry.name
            )));
        }

        if let Some(delay) = entry.request_delay {
            validate_delay(&format!("schema '{}' request-delay", entry.name), delay)?;
        }

        entry.to_schema().map_err(|e| {
            ConfigError::InvalidPattern(format!("schema '{}': {}", entry.name, e))
        })?;

        let patterns = FilterConfig {
            filename_include: entry.include.clone(),
            filename_exclude: entry.exclude.clone(),
            url_include: entry.url_include.clone(),
            url_exclude: entry.url_exclude.clone(),
            ..Default::default()
        };
        validate_filter_config(&patterns)?;
    }

    Ok(())
}
