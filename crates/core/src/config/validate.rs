use super::{types::Config, ConfigError};

/// Largest page a deployment may configure.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Search page size is within 1..=MAX_PAGE_SIZE
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.search.page_size == 0 || config.search.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "search.page_size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, config.search.page_size
        )));
    }

    Ok(())
}
