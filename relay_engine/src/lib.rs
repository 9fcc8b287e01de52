//! Payment Relay Engine
//!
//! The engine keeps the latest known status of every payment the relay has heard about, and turns verified webhook
//! events from the payment processor into status updates. It is transport-agnostic; the HTTP layer lives in
//! `relay_server`.
//!
//! The library is divided into three parts:
//! 1. Storage ([`mod@db`]). A single JSON file backend, [`JsonFileStore`]. Backends implement the
//!    [`StatusManagement`] trait.
//! 2. Events ([`mod@events`]). The [`events::WebhookEvent`] enum classifies processor events, and a small hook system
//!    lets observers see every event as it arrives.
//! 3. The public API ([`StatusApi`]), used by the webhook receiver and the query/write endpoints.
mod db;

pub mod db_types;
pub mod events;
mod relay_api;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use db::JsonFileStore;
pub use relay_api::{
    errors::StatusApiError,
    status_api::StatusApi,
    status_objects::{EventOutcome, ManualStatusUpdate},
};
pub use traits::{StatusManagement, StoreError};
