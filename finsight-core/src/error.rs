//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub type FinsightResult<T> = Result<T, FinsightError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the FinSight system
#[derive(Error, Debug)]
pub enum FinsightError {
    #[error("Operation timeout: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Server error (HTTP {status}): {body}")]
    Server {
        status: u16,
        body: String,
        context: ErrorContext,
    },

    /// The server answered 200 but reported a failure in the body
    #[error("Backend error: {message}")]
    Backend {
        message: String,
        context: ErrorContext,
    },

    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType {
        extension: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FinsightError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            FinsightError::Timeout { context, .. } => Some(context),
            FinsightError::Network { context, .. } => Some(context),
            FinsightError::Server { context, .. } => Some(context),
            FinsightError::Backend { context, .. } => Some(context),
            FinsightError::Protocol { context, .. } => Some(context),
            FinsightError::UnsupportedFileType { context, .. } => Some(context),
            FinsightError::Validation { context, .. } => Some(context),
            FinsightError::Config { context, .. } => Some(context),
            FinsightError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether this is a transport timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, FinsightError::Timeout { .. })
    }

    /// Check if error is recoverable by simply reissuing the request
    pub fn is_recoverable(&self) -> bool {
        match self {
            FinsightError::Network { .. } => true,
            FinsightError::Timeout { .. } => true,
            FinsightError::Server { status, .. } => *status >= 500,
            FinsightError::Config { .. } => false,
            FinsightError::Validation { .. } => false,
            FinsightError::UnsupportedFileType { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            FinsightError::Network { .. } | FinsightError::Timeout { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Transport error (may be recoverable)"
                );
            }
            FinsightError::Validation { .. } | FinsightError::UnsupportedFileType { .. } => {
                debug!(error = %self, "Rejected at client boundary");
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::FinsightError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::FinsightError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}
