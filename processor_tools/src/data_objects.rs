use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ProcessorApiError;

/// Customer prefill fields that are passed through to the hosted checkout page unchanged.
pub const PREFILL_FIELDS: [&str; 9] =
    ["fullName", "firstName", "lastName", "email", "country", "addressLine", "city", "state", "zipCode"];

/// Query parameters prefixed with this are passed through to the checkout as metadata.
pub const METADATA_PREFIX: &str = "metadata_";

/// Parameters for a static (link-based) checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCheckoutParams {
    pub product_id: String,
    pub quantity: u32,
    /// Prefill and metadata parameters, sorted by name.
    pub extra: Vec<(String, String)>,
}

impl StaticCheckoutParams {
    pub fn new<S: Into<String>>(product_id: S, quantity: u32) -> Self {
        Self { product_id: product_id.into(), quantity, extra: Vec::new() }
    }

    /// Builds the parameters from a request's query string. `productId` is required; `quantity` defaults to 1.
    /// Unknown parameters are dropped.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ProcessorApiError> {
        let product_id = query
            .get("productId")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProcessorApiError::InvalidRequest("productId is required".into()))?;
        let quantity = match query.get("quantity") {
            Some(q) => q
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|q| *q > 0)
                .ok_or_else(|| ProcessorApiError::InvalidRequest(format!("Invalid quantity: {q}")))?,
            None => 1,
        };
        let mut extra = query
            .iter()
            .filter(|(k, _)| PREFILL_FIELDS.contains(&k.as_str()) || k.starts_with(METADATA_PREFIX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Vec<_>>();
        extra.sort();
        Ok(Self { product_id: product_id.to_string(), quantity, extra })
    }
}

/// What the relay returns to clients that start a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl CheckoutSession {
    pub fn from_url<S: Into<String>>(checkout_url: S) -> Self {
        Self { checkout_url: checkout_url.into(), payment_id: None, subscription_id: None }
    }
}

/// The kind of session a dynamic checkout body asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicCheckoutKind {
    /// One-off payment for a `product_cart`.
    Payment,
    /// Subscription to a single `product_id`.
    Subscription,
}

impl DynamicCheckoutKind {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Payment => "/payments",
            Self::Subscription => "/subscriptions",
        }
    }
}
