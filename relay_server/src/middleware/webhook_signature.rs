//! Webhook signature middleware for Actix Web.
//!
//! The payment processor signs every webhook delivery following the Standard Webhooks scheme (see
//! [`processor_tools::WebhookVerifier`]). Wrap the webhook route with this middleware so that unsigned or tampered
//! requests are rejected with `401 Unauthorized` before any handler runs.
//!
//! The request body is consumed to compute the signature and then put back, so handlers can extract it as usual.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use processor_tools::{
    WebhookHeaders,
    WebhookVerifier,
    WEBHOOK_ID_HEADER,
    WEBHOOK_SIGNATURE_HEADER,
    WEBHOOK_TIMESTAMP_HEADER,
};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct WebhookSignatureFactory {
    // None if no usable signing secret was configured. All signed requests are then rejected.
    verifier: Option<WebhookVerifier>,
    // If false, then the middleware will not check the signature and always allow the call
    enabled: bool,
}

impl WebhookSignatureFactory {
    pub fn new(verifier: Option<WebhookVerifier>, enabled: bool) -> Self {
        WebhookSignatureFactory { verifier, enabled }
    }
}

impl<S, B> Transform<S, ServiceRequest> for WebhookSignatureFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = WebhookSignatureService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WebhookSignatureService {
            verifier: self.verifier.clone().map(Rc::new),
            enabled: self.enabled,
            service: Rc::new(service),
        }))
    }
}

pub struct WebhookSignatureService<S> {
    verifier: Option<Rc<WebhookVerifier>>,
    enabled: bool,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for WebhookSignatureService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();
        let enabled = self.enabled;
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature for request");
            if !enabled {
                trace!("🔐️ Webhook signature checks are disabled. Allowing request.");
                return service.call(req).await;
            }
            let Some(verifier) = verifier else {
                warn!("🔐️ A webhook arrived but no signing secret is configured. Denying access.");
                return Err(ServerError::InvalidSignature("No webhook signing secret is configured.".into()).into());
            };
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ServerError::InvalidRequestBody("Failed to extract request data.".into())
            })?;
            verify_request(&verifier, req.headers(), data.as_ref()).map_err(|e| {
                warn!("🔐️ Invalid webhook signature. Denying access. {e}");
                e
            })?;
            trace!("🔐️ Webhook signature check ✅️");
            req.set_payload(bytes_to_payload(data));
            service.call(req).await
        })
    }
}

fn verify_request(verifier: &WebhookVerifier, headers: &HeaderMap, body: &[u8]) -> Result<(), ServerError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let headers =
        WebhookHeaders::new(header(WEBHOOK_ID_HEADER), header(WEBHOOK_TIMESTAMP_HEADER), header(WEBHOOK_SIGNATURE_HEADER))?;
    verifier.verify(&headers, body)?;
    Ok(())
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
