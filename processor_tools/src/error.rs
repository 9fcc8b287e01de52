use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessorApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid checkout request: {0}")]
    InvalidRequest(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The processor did not return a checkout link")]
    MissingCheckoutUrl,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookVerificationError {
    #[error("The webhook signing secret is invalid. {0}")]
    InvalidSecret(String),
    #[error("Missing webhook header: {0}")]
    MissingHeader(&'static str),
    #[error("Invalid webhook timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Webhook timestamp is too far from the current time")]
    TimestampOutOfTolerance,
    #[error("No matching webhook signature found")]
    InvalidSignature,
}
