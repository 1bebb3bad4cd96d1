use thiserror::Error;

/// Result type for the `structprobe` library
pub type Result<T> = core::result::Result<T, error_stack::Report<Error>>;

/// Error kinds surfaced by a probe run.
///
/// `Validation` and `ContainedFault` are the two reportable kinds accumulated by the
/// exhaustive wrapper. `Schema` means a registered schema is inconsistent with its
/// accessors and always aborts the run - it indicates a registration bug, not a
/// property of the record being probed.
#[derive(Debug, Error)]
pub enum Error {
    /// A panic raised inside the validate callback, recovered at the invocation boundary
    #[error("contained fault: {0}")]
    ContainedFault(String),

    /// A registered schema promised a probe target its accessor did not deliver
    #[error("schema error for `{type_name}`: {message}")]
    Schema {
        /// Registered name of the record type whose schema is inconsistent
        type_name: String,
        /// What the accessor failed to deliver
        message:   String,
    },

    /// The caller's validate callback rejected the current structural configuration
    #[error("validation failed: {0}")]
    Validation(String),
}

impl Error {
    /// Create a validation failure from the caller's reason
    pub fn validation(reason: impl std::fmt::Display) -> Self {
        Self::Validation(reason.to_string())
    }

    /// Create a schema-registration error for the named record type
    pub fn schema(type_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Schema {
            type_name: type_name.into(),
            message:   message.to_string(),
        }
    }
}
