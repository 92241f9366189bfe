use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};

const MAX_CONCURRENCY: usize = 256;
const MAX_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.timeout_ms < 1 || config.timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "timeout must be between 1ms and {}ms, got {}ms",
            MAX_TIMEOUT_MS, config.timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if config.name.chars().any(char::is_whitespace)
        || config.version.chars().any(char::is_whitespace)
    {
        return Err(ConfigError::Validation(format!(
            "user-agent name and version cannot contain whitespace, got '{}'",
            config.header_value()
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if let Some(path) = &config.report_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report-path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
