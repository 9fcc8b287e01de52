use thiserror::Error;

use crate::db_types::{PaymentEntry, PaymentId, StatusRecord};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The in-memory mutation succeeded, but the store could not be flushed to durable storage.
    #[error("Could not persist the payment store. {0}")]
    Persistence(String),
    #[error("Could not serialize the payment store. {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// The `StatusManagement` trait defines the behaviour of a payment status backend.
///
/// A backend maps each payment id to exactly one [`StatusRecord`]. A later write for the same id fully replaces the
/// previous record; there is no history and no merging.
#[allow(async_fn_in_trait)]
pub trait StatusManagement {
    /// Inserts or replaces the record for `id`. The call only returns once the backend has attempted to make the
    /// change durable.
    ///
    /// An `Err` means the change was applied but could not be persisted.
    async fn set_status(&self, id: &PaymentId, record: StatusRecord) -> Result<(), StoreError>;

    /// Fetches the current record for `id`, or `None` if the payment is unknown.
    async fn fetch_status(&self, id: &PaymentId) -> Result<Option<StatusRecord>, StoreError>;

    /// Fetches every record, annotated with its id, in the order the ids were first written.
    async fn fetch_all_statuses(&self) -> Result<Vec<PaymentEntry>, StoreError>;
}
