use thiserror::Error;

/// Failures of a remote catalog query.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("catalog responded with HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("catalog response did not match the expected schema: {0}")]
    Decoding(#[source] serde_json::Error),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorKind {
    /// Transport failure or non-2xx status.
    Network,
    /// The body could not be decoded.
    Decoding,
}

impl CatalogError {
    pub fn kind(&self) -> CatalogErrorKind {
        match self {
            CatalogError::Network(_) | CatalogError::Status { .. } => CatalogErrorKind::Network,
            CatalogError::Decoding(_) => CatalogErrorKind::Decoding,
        }
    }
}
