use serde_json::Value;

use crate::{
    db_types::{PaymentId, PaymentStatus, StatusRecord},
    relay_api::errors::StatusApiError,
};

/// A status write requested through the manual write endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualStatusUpdate {
    pub id: PaymentId,
    pub record: StatusRecord,
}

impl ManualStatusUpdate {
    /// Builds an update from a raw request body.
    ///
    /// `id` and `status` must be present as non-empty strings. `timestamp` is optional and defaults to now. The whole
    /// body, including any extra fields, becomes the record's `data`.
    pub fn from_body(body: Value) -> Result<Self, StatusApiError> {
        let id = non_empty_str(&body, "id").ok_or(StatusApiError::MissingFields)?;
        let status = non_empty_str(&body, "status").ok_or(StatusApiError::MissingFields)?;
        let timestamp = non_empty_str(&body, "timestamp");
        let id = PaymentId::from(id);
        let record = StatusRecord::new(status, timestamp, body);
        Ok(Self { id, record })
    }
}

fn non_empty_str(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).filter(|s| !s.is_empty()).map(String::from)
}

/// What happened to a webhook event once it reached the status API.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// A status record was written for the payment.
    Recorded { id: PaymentId, status: PaymentStatus },
    /// The event type does not affect payment status.
    Ignored { event_type: String },
    /// The event should have changed a status, but carried no payment id.
    MissingPaymentId { event_type: String },
}
