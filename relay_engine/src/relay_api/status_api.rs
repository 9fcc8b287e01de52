//! Unified API for recording and querying payment statuses.

use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    db_types::{PaymentEntry, PaymentId, StatusRecord},
    events::WebhookEvent,
    relay_api::{
        errors::StatusApiError,
        status_objects::{EventOutcome, ManualStatusUpdate},
    },
    traits::{StatusManagement, StoreError},
};

/// The `StatusApi` is the single entry point through which webhooks and the HTTP query API touch the status backend.
///
/// Persistence failures on writes are logged and otherwise ignored: the backend keeps the new value in memory, and the
/// caller is told the write succeeded.
pub struct StatusApi<B> {
    db: B,
}

impl<B: Debug> Debug for StatusApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatusApi ({:?})", self.db)
    }
}

impl<B> StatusApi<B>
where B: StatusManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Writes the status carried by a verified webhook event. Events that do not map to a status are ignored.
    pub async fn process_webhook_event(&self, event: WebhookEvent) -> EventOutcome {
        let event_type = event.event_type().to_string();
        let Some(status) = event.payment_status() else {
            debug!("🪝️ Ignoring webhook event of type '{event_type}'");
            return EventOutcome::Ignored { event_type };
        };
        let Some(id) = event.payment_id() else {
            warn!("🪝️ Webhook event '{event_type}' did not contain a payment id. No status was recorded.");
            return EventOutcome::MissingPaymentId { event_type };
        };
        let record = StatusRecord::now(status, event.into_payload());
        self.write(&id, record).await;
        info!("🪝️ Payment {id} is now '{status}' ({event_type})");
        EventOutcome::Recorded { id, status }
    }

    /// Writes a status supplied directly by a client. `id` and `status` must be present in the body.
    pub async fn save_payment(&self, body: Value) -> Result<PaymentId, StatusApiError> {
        let ManualStatusUpdate { id, record } = ManualStatusUpdate::from_body(body)?;
        match record.known_status() {
            Some(status) => debug!("💾️ Manual status update for payment {id}: {status}"),
            None => info!("💾️ Manual status update for payment {id} uses a custom status: '{}'", record.status),
        }
        self.write(&id, record).await;
        Ok(id)
    }

    pub async fn fetch_payment_status(&self, id: &PaymentId) -> Result<Option<StatusRecord>, StatusApiError> {
        let result = self.db.fetch_status(id).await?;
        trace!("💾️ Status lookup for {id}: {result:?}");
        Ok(result)
    }

    pub async fn list_payments(&self) -> Result<Vec<PaymentEntry>, StatusApiError> {
        Ok(self.db.fetch_all_statuses().await?)
    }

    async fn write(&self, id: &PaymentId, record: StatusRecord) {
        match self.db.set_status(id, record).await {
            Ok(()) => trace!("💾️ Status for {id} persisted"),
            Err(StoreError::Persistence(e)) | Err(StoreError::Serialization(e)) => {
                error!("💾️ Status for payment {id} was updated in memory but could not be saved. {e}");
            },
        }
    }
}
