use crate::error::ConfigError;

/// Process-level settings, read once at cold start.
#[derive(Debug, Clone)]
pub struct Config {
    pub table_name: String,
    /// Region of the table when it differs from the function's own.
    pub table_region: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let table_name = std::env::var("TABLE_NAME")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingVar("TABLE_NAME"))?;
        let table_region = std::env::var("TABLE_REGION")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            table_name,
            table_region,
        })
    }
}
