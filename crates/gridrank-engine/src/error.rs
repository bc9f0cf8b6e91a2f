use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A stored value the whole aggregation depends on is unusable.
    ///
    /// Raised instead of coercing to zero, since a bad center would silently
    /// misplace every synthesized grid point.
    #[error("malformed upstream value for {field}: {reason}")]
    MalformedUpstream { field: &'static str, reason: String },
}

impl EngineError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedUpstream {
            field,
            reason: reason.into(),
        }
    }
}
