use std::{
    fmt::Display,
    str::FromStr,
};

use relay_common::iso8601_now;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

//--------------------------------------       PaymentId       ---------------------------------------------------------
/// Opaque identifier for a single payment attempt, assigned by the payment processor (or by whoever calls the manual
/// write endpoint).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub String);

impl FromStr for PaymentId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for PaymentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PaymentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PaymentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
/// The status tags written by the webhook dispatcher. Manual writes may store any string, so the `status` field of a
/// [`StatusRecord`] is not restricted to these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// The processor captured the payment.
    Success,
    /// The payment attempt failed.
    Failed,
    /// The payment is in flight.
    Processing,
    /// The customer or merchant cancelled the payment.
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Processing => "processing",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unknown payment status: {0}")]
pub struct ConversionError(String);

impl FromStr for PaymentStatus {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "processing" => Ok(Self::Processing),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      StatusRecord     ---------------------------------------------------------
/// The latest known state of one payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: String,
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// The webhook envelope, or the manual write request body.
    #[serde(default)]
    pub data: Value,
}

impl StatusRecord {
    pub fn new<S: Into<String>>(status: S, timestamp: Option<String>, data: Value) -> Self {
        let timestamp = timestamp.unwrap_or_else(iso8601_now);
        Self { status: status.into(), timestamp, data }
    }

    /// A record stamped with the current time.
    pub fn now(status: PaymentStatus, data: Value) -> Self {
        Self::new(status.as_str(), None, data)
    }

    pub fn known_status(&self) -> Option<PaymentStatus> {
        self.status.parse().ok()
    }
}

//--------------------------------------      PaymentEntry     ---------------------------------------------------------
/// A [`StatusRecord`] annotated with its payment id, as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub id: PaymentId,
    #[serde(flatten)]
    pub record: StatusRecord,
}

impl PaymentEntry {
    pub fn new(id: PaymentId, record: StatusRecord) -> Self {
        Self { id, record }
    }
}
