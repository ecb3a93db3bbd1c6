/// Recoverable failures raised while resolving a tier claim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuotaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no budget resolves to tier {code} for subcategory {subcategory_id}")]
    NotFound { code: String, subcategory_id: i64 },
    #[error("budget for tier {code} is inactive or exhausted")]
    Unavailable { code: String },
    #[error("no reward rate configured for tier {code}")]
    TemplateMissing { code: String },
}

impl QuotaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
