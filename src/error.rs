//! Error types for anamap.

use thiserror::Error;

/// Result type for anamap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for anamap operations.
///
/// Missing or empty relation data is deliberately *not* an error: a
/// candidate without usable relations scores zero and its branch dies
/// naturally. Invariant violations inside the search (a conflicting
/// commit that slipped past the candidate filter, a score-cache miss for
/// a committed pair) are programming errors and panic instead of
/// returning a variant here.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The requested search algorithm is not one of the supported names.
    #[error("Unsupported algorithm: {0} (expected \"dfs\" or \"beam\")")]
    UnsupportedAlgorithm(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an unsupported-algorithm error.
    pub fn unsupported_algorithm(name: impl Into<String>) -> Self {
        Error::UnsupportedAlgorithm(name.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
