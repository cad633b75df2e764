//! Error types for endpoint identity resolution.

/// Result type alias for endpoint identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving or indexing endpoint identifiers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Endpoint Lifecycle Errors
    // =========================================================================
    /// Endpoint has been deleted (or was never made alive).
    ///
    /// Returned by the liveness-gated accessors instead of blocking on a
    /// record that will never become usable again.
    #[error("endpoint {id} is not alive")]
    EndpointNotAlive { id: u16 },

    // =========================================================================
    // Identifier Errors
    // =========================================================================
    /// Identifier key or prefix could not be parsed.
    #[error("invalid endpoint identifier '{id}': {reason}")]
    InvalidIdentifier { id: String, reason: String },

    /// Identifier key is already owned by another endpoint.
    #[error("identifier '{key}' already belongs to endpoint {owner}, cannot assign to {id}")]
    IdentifierConflict { key: String, owner: u16, id: u16 },

    // =========================================================================
    // Input Errors
    // =========================================================================
    /// Invalid endpoint specification or argument.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A bounded resource is full.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
