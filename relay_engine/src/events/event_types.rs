use serde_json::Value;

use crate::db_types::{PaymentId, PaymentStatus};

pub const PAYMENT_SUCCEEDED: &str = "payment.succeeded";
pub const PAYMENT_FAILED: &str = "payment.failed";
pub const PAYMENT_PROCESSING: &str = "payment.processing";
pub const PAYMENT_CANCELLED: &str = "payment.cancelled";

/// A verified webhook delivery from the payment processor.
///
/// Each variant carries the full event envelope (`{business_id, type, timestamp, data}`) as received.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    PaymentSucceeded(Value),
    PaymentFailed(Value),
    PaymentProcessing(Value),
    PaymentCancelled(Value),
    /// Any event type this relay does not act on. Observers still see it.
    Other { event_type: String, payload: Value },
}

impl WebhookEvent {
    /// Classifies an event envelope by its `type` field.
    pub fn from_envelope(payload: Value) -> Self {
        let event_type = payload.get("type").and_then(Value::as_str).unwrap_or_default().to_string();
        match event_type.as_str() {
            PAYMENT_SUCCEEDED => Self::PaymentSucceeded(payload),
            PAYMENT_FAILED => Self::PaymentFailed(payload),
            PAYMENT_PROCESSING => Self::PaymentProcessing(payload),
            PAYMENT_CANCELLED => Self::PaymentCancelled(payload),
            _ => Self::Other { event_type, payload },
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            Self::PaymentSucceeded(_) => PAYMENT_SUCCEEDED,
            Self::PaymentFailed(_) => PAYMENT_FAILED,
            Self::PaymentProcessing(_) => PAYMENT_PROCESSING,
            Self::PaymentCancelled(_) => PAYMENT_CANCELLED,
            Self::Other { event_type, .. } => event_type,
        }
    }

    pub fn payload(&self) -> &Value {
        match self {
            Self::PaymentSucceeded(p) |
            Self::PaymentFailed(p) |
            Self::PaymentProcessing(p) |
            Self::PaymentCancelled(p) |
            Self::Other { payload: p, .. } => p,
        }
    }

    pub fn into_payload(self) -> Value {
        match self {
            Self::PaymentSucceeded(p) |
            Self::PaymentFailed(p) |
            Self::PaymentProcessing(p) |
            Self::PaymentCancelled(p) |
            Self::Other { payload: p, .. } => p,
        }
    }

    /// The status this event writes to the store, or `None` if the event does not touch the store.
    pub fn payment_status(&self) -> Option<PaymentStatus> {
        match self {
            Self::PaymentSucceeded(_) => Some(PaymentStatus::Success),
            Self::PaymentFailed(_) => Some(PaymentStatus::Failed),
            Self::PaymentProcessing(_) => Some(PaymentStatus::Processing),
            Self::PaymentCancelled(_) => Some(PaymentStatus::Cancelled),
            Self::Other { .. } => None,
        }
    }

    /// The payment id, taken from `data.payment_id` in the envelope.
    pub fn payment_id(&self) -> Option<PaymentId> {
        self.payload()
            .get("data")
            .and_then(|d| d.get("payment_id"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(PaymentId::from)
    }
}
