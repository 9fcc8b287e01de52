use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    config::ProcessorConfig,
    data_objects::{CheckoutSession, DynamicCheckoutKind, StaticCheckoutParams},
    ProcessorApiError,
};

/// Thin client for the processor's checkout flows.
#[derive(Clone)]
pub struct ProcessorApi {
    config: ProcessorConfig,
    client: Arc<Client>,
}

impl ProcessorApi {
    pub fn new(config: ProcessorConfig) -> Result<Self, ProcessorApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.reveal()))
            .map_err(|e| ProcessorApiError::Initialization(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProcessorApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, ProcessorApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| ProcessorApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| ProcessorApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProcessorApiError::RestResponseError(e.to_string()))?;
            Err(ProcessorApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url())
    }

    /// Builds a hosted checkout link for a single product. No request is made to the processor.
    pub fn static_checkout_url(&self, params: &StaticCheckoutParams) -> Result<CheckoutSession, ProcessorApiError> {
        let base = format!("{}/buy/{}", self.config.checkout_url(), params.product_id);
        let mut url = Url::parse(&base).map_err(|e| ProcessorApiError::InvalidRequest(format!("{base}: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("quantity", &params.quantity.to_string());
            if !self.config.return_url.is_empty() {
                query.append_pair("redirect_url", &self.config.return_url);
            }
            for (k, v) in &params.extra {
                query.append_pair(k, v);
            }
        }
        debug!("🛒️ Static checkout link created for product {}", params.product_id);
        Ok(CheckoutSession::from_url(url.to_string()))
    }

    /// Creates a checkout session through the processor API.
    ///
    /// A body with a `product_cart` creates a one-off payment, a body with a `product_id` creates a subscription. The
    /// configured return url is injected and a payment link is always requested.
    pub async fn create_checkout_session(&self, body: Value) -> Result<CheckoutSession, ProcessorApiError> {
        let Value::Object(mut body) = body else {
            return Err(ProcessorApiError::InvalidRequest("Request body must be a JSON object".into()));
        };
        let kind = if body.contains_key("product_cart") {
            DynamicCheckoutKind::Payment
        } else if body.contains_key("product_id") {
            DynamicCheckoutKind::Subscription
        } else {
            return Err(ProcessorApiError::InvalidRequest(
                "Request body must contain either product_cart or product_id".into(),
            ));
        };
        body.insert("payment_link".into(), Value::Bool(true));
        if !self.config.return_url.is_empty() {
            body.insert("return_url".into(), Value::String(self.config.return_url.clone()));
        }
        debug!("🛒️ Creating {kind:?} checkout session");
        let response = self.rest_query::<Value, Value>(Method::POST, kind.path(), Some(Value::Object(body))).await?;
        let checkout_url = response
            .get("payment_link")
            .and_then(Value::as_str)
            .ok_or(ProcessorApiError::MissingCheckoutUrl)?
            .to_string();
        let field = |name: &str| response.get(name).and_then(Value::as_str).map(String::from);
        let session =
            CheckoutSession { checkout_url, payment_id: field("payment_id"), subscription_id: field("subscription_id") };
        info!(
            "🛒️ Checkout session created. payment: {}, subscription: {}",
            session.payment_id.as_deref().unwrap_or("-"),
            session.subscription_id.as_deref().unwrap_or("-")
        );
        Ok(session)
    }
}
