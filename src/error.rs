/// Error type for cache store operations.
///
/// The bundled in-memory backends cannot fail, but the store seam is
/// fallible so that backends with real failure modes can slot in behind
/// the same trait.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// A store operation failed.
    #[error("[{tier}] cache error for key '{key}': {message}")]
    Operation {
        tier: String,
        key: String,
        message: String,
    },
}

impl CacheError {
    /// Create a new operation error.
    pub fn operation(
        tier: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CacheError::Operation {
            tier: tier.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}
