#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown {entity}: {name}")]
    NotFound { entity: &'static str, name: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl CoreError {
    /// Shorthand for the most common lookup failure.
    pub fn boss_not_found(name: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: "boss",
            name: name.into(),
        }
    }
}
