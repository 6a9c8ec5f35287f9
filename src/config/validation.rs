use crate::config::types::{Config, CrawlerConfig, DhtConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_dht_config(&config.dht)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.worker_count < 1 || config.worker_count > 100 {
        return Err(ConfigError::Validation(format!(
            "worker-count must be between 1 and 100, got {}",
            config.worker_count
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.chunk_size < 64 {
        return Err(ConfigError::Validation(format!(
            "chunk-size must be >= 64 bytes, got {}",
            config.chunk_size
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::Validation(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }

    if let Some(index_path) = &config.index_path {
        if index_path.is_empty() {
            return Err(ConfigError::Validation(
                "index-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_dht_config(config: &DhtConfig) -> Result<(), ConfigError> {
    if config.url_topic.is_empty() || config.diff_topic.is_empty() {
        return Err(ConfigError::Validation(
            "dht topics cannot be empty".to_string(),
        ));
    }

    if config.url_topic == config.diff_topic {
        return Err(ConfigError::Validation(format!(
            "url-topic and diff-topic must differ, both are '{}'",
            config.url_topic
        )));
    }

    Ok(())
}
