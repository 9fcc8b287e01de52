//! # Payment relay server
//! This crate hosts the HTTP server for the payment relay. It is responsible for:
//! * Starting hosted checkout sessions with the payment processor.
//! * Receiving signed webhook events from the processor and recording each payment's latest status.
//! * Serving payment statuses back to clients, and accepting manual status writes.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/` and `/payment-return`: Landing and post-payment pages.
//! * `/api/checkout` (GET, POST): Static and dynamic checkout.
//! * `/api/webhook`: The webhook route for payment events from the processor.
//! * `/api/save-payment`, `/api/payment-status/{paymentId}`, `/api/payments`: Status write, lookup and listing.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;
