use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::WebhookVerificationError;

pub type HmacSha256 = Hmac<Sha256>;

pub const SECRET_PREFIX: &str = "whsec_";

/// Decodes a webhook signing secret. The secret is base64, optionally prefixed with `whsec_`.
pub fn decode_webhook_secret(secret: &str) -> Result<Vec<u8>, WebhookVerificationError> {
    let secret = secret.trim();
    let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
    if encoded.is_empty() {
        return Err(WebhookVerificationError::InvalidSecret("no secret configured".into()));
    }
    base64::decode(encoded).map_err(|e| WebhookVerificationError::InvalidSecret(e.to_string()))
}

/// A keyed HMAC over the Standard Webhooks signed content, `{id}.{timestamp}.{body}`.
pub fn webhook_mac(key: &[u8], id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, WebhookVerificationError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| WebhookVerificationError::InvalidSecret(e.to_string()))?;
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    Ok(mac)
}

/// Produces a `webhook-signature` header value (`v1,<base64>`) for the given delivery.
pub fn sign_webhook_payload(
    secret: &str,
    id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, WebhookVerificationError> {
    let key = decode_webhook_secret(secret)?;
    let mac = webhook_mac(&key, id, timestamp, body)?;
    Ok(format!("v1,{}", base64::encode(mac.finalize().into_bytes())))
}
