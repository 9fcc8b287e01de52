//! Client side of the payment processor integration.
//!
//! * [`ProcessorApi`] starts hosted checkout sessions, either as a static link built locally or as a dynamic session
//!   created through the processor's REST API.
//! * [`WebhookVerifier`] authenticates webhook deliveries using the Standard Webhooks signature scheme.
mod api;
mod config;
mod error;
mod webhook;

pub mod data_objects;
pub mod helpers;

pub use api::ProcessorApi;
pub use config::{ProcessorConfig, ProcessorEnvironment};
pub use error::{ProcessorApiError, WebhookVerificationError};
pub use webhook::{WebhookHeaders, WebhookVerifier, WEBHOOK_ID_HEADER, WEBHOOK_SIGNATURE_HEADER, WEBHOOK_TIMESTAMP_HEADER};
