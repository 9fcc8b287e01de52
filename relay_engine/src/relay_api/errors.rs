use thiserror::Error;

use crate::traits::StoreError;

#[derive(Debug, Clone, Error)]
pub enum StatusApiError {
    #[error("Missing required fields: id and status")]
    MissingFields,
    #[error("Status backend error: {0}")]
    Backend(#[from] StoreError),
}
