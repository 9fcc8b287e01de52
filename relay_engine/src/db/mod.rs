//! Storage backends for payment status records.
//!
//! Only a flat JSON file backend exists. It keeps the whole mapping in memory and rewrites the file on every mutation.
mod json_store;

pub use json_store::JsonFileStore;
