//! Common functionality shared by the configuration builders

use crate::error::CycleBreakerError;

/// Generic builder trait for configuration objects
pub trait ConfigBuilder: Sized {
    type Config;

    /// Build the configuration, returning an error if validation fails
    fn build(self) -> Result<Self::Config, CycleBreakerError>;
}

/// Unwrap a required builder field
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, CycleBreakerError> {
    value.ok_or_else(|| CycleBreakerError::ConfigurationError {
        message: format!("Missing required field: {field}"),
    })
}
