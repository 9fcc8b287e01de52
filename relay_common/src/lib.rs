//! Small helpers shared by every crate in the payment relay workspace.
mod helpers;
mod secret;

pub use helpers::{env_flag, iso8601_now, iso8601_timestamp, parse_boolean_flag};
pub use secret::Secret;
