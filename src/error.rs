//! Error handling for the bagwise library
//!
//! Every fallible operation in the crate returns [`Result`]. Validation always
//! happens before any state change, so a returned error means the collection
//! was left untouched.

use thiserror::Error;

/// Main error type for the bagwise library
#[derive(Error, Debug)]
pub enum BagwiseError {
    /// An argument was outside the accepted domain (e.g. a negative count)
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// The operation is not available on this collection or view
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation
        operation: String,
    },

    /// The receiver is not in a state that permits the call
    #[error("Illegal state: {message}")]
    IllegalState {
        /// Description of the violated precondition
        message: String,
    },

    /// A cursor was advanced past its last element
    #[error("No such element")]
    NoSuchElement,

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// Snapshot encoding or decoding failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message from the codec
        message: String,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BagwiseError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Create an unsupported operation error
    pub fn unsupported<S: Into<String>>(operation: S) -> Self {
        Self::UnsupportedOperation { operation: operation.into() }
    }

    /// Create an illegal state error
    pub fn illegal_state<S: Into<String>>(message: S) -> Self {
        Self::IllegalState { message: message.into() }
    }

    /// Create a no such element error
    pub fn no_such_element() -> Self {
        Self::NoSuchElement
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::InvalidArgument { .. } => false,
            Self::UnsupportedOperation { .. } => false,
            Self::IllegalState { .. } => false,
            Self::NoSuchElement => false,
            Self::Configuration { .. } => false,
            Self::Serialization { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "argument",
            Self::UnsupportedOperation { .. } => "unsupported",
            Self::IllegalState { .. } => "state",
            Self::NoSuchElement => "exhausted",
            Self::Configuration { .. } => "config",
            Self::Serialization { .. } => "serialization",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BagwiseError>;

/// Validate an occurrence count argument and convert it to `usize`
#[inline]
pub fn check_occurrences(occurrences: isize, operation: &str) -> Result<usize> {
    usize::try_from(occurrences).map_err(|_| {
        BagwiseError::invalid_argument(format!(
            "{}: cannot use a negative number of occurrences: {}",
            operation, occurrences
        ))
    })
}
