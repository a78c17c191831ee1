//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid thresholds, weights or limits. Raised at construction time,
    /// never at call time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// A score set already holds a score for this criterion
    #[error("Duplicate score for criterion: {0}")]
    DuplicateScore(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Shorthand for building a [`DomainError::Configuration`]
    pub fn configuration(message: impl Into<String>) -> Self {
        DomainError::Configuration(message.into())
    }

    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Check if this error comes from invalid configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, DomainError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = DomainError::configuration("t_small must be positive");
        assert_eq!(
            error.to_string(),
            "Configuration error: t_small must be positive"
        );
        assert!(error.is_configuration());
        assert!(!error.is_cancelled());
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(DomainError::Cancelled.is_cancelled());
        assert!(!DomainError::InvalidTask("empty".to_string()).is_cancelled());
    }
}
