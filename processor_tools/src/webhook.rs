//! Standard Webhooks signature verification.
//!
//! Every delivery carries three headers:
//! * `webhook-id`: unique message id,
//! * `webhook-timestamp`: unix time in seconds,
//! * `webhook-signature`: space separated list of `v1,<base64 HMAC-SHA256>` entries.
//!
//! The HMAC is computed over `{id}.{timestamp}.{body}` with the base64-decoded signing secret. A delivery is accepted
//! if any `v1` entry matches and the timestamp is within the tolerance window.
use chrono::{DateTime, Duration, Utc};
use hmac::Mac;
use log::*;
use relay_common::Secret;

use crate::{
    helpers::{decode_webhook_secret, webhook_mac},
    WebhookVerificationError,
};

pub const WEBHOOK_ID_HEADER: &str = "webhook-id";
pub const WEBHOOK_TIMESTAMP_HEADER: &str = "webhook-timestamp";
pub const WEBHOOK_SIGNATURE_HEADER: &str = "webhook-signature";

const DEFAULT_TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> WebhookHeaders<'a> {
    pub fn new(
        id: Option<&'a str>,
        timestamp: Option<&'a str>,
        signature: Option<&'a str>,
    ) -> Result<Self, WebhookVerificationError> {
        Ok(Self {
            id: id.ok_or(WebhookVerificationError::MissingHeader(WEBHOOK_ID_HEADER))?,
            timestamp: timestamp.ok_or(WebhookVerificationError::MissingHeader(WEBHOOK_TIMESTAMP_HEADER))?,
            signature: signature.ok_or(WebhookVerificationError::MissingHeader(WEBHOOK_SIGNATURE_HEADER))?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    key: Secret<Vec<u8>>,
    tolerance: Duration,
}

impl WebhookVerifier {
    /// Fails if the secret is empty or not valid base64.
    pub fn new(secret: &Secret<String>) -> Result<Self, WebhookVerificationError> {
        let key = decode_webhook_secret(secret.reveal())?;
        Ok(Self { key: Secret::new(key), tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS) })
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn verify(&self, headers: &WebhookHeaders<'_>, body: &[u8]) -> Result<(), WebhookVerificationError> {
        self.verify_at(headers, body, Utc::now())
    }

    pub fn verify_at(
        &self,
        headers: &WebhookHeaders<'_>,
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Result<(), WebhookVerificationError> {
        let ts = headers
            .timestamp
            .trim()
            .parse::<i64>()
            .map_err(|e| WebhookVerificationError::InvalidTimestamp(format!("{}. {e}", headers.timestamp)))?;
        if now.timestamp().abs_diff(ts) > self.tolerance.num_seconds().unsigned_abs() {
            debug!("🔐️ Webhook {} has timestamp {ts}, which is outside the tolerance window", headers.id);
            return Err(WebhookVerificationError::TimestampOutOfTolerance);
        }
        let mac = webhook_mac(self.key.reveal(), headers.id, headers.timestamp, body)?;
        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == "v1")
            .filter_map(|(_, sig)| base64::decode(sig).ok())
            .any(|sig| mac.clone().verify_slice(&sig).is_ok());
        if matched {
            trace!("🔐️ Webhook {} signature verified", headers.id);
            Ok(())
        } else {
            Err(WebhookVerificationError::InvalidSignature)
        }
    }
}
