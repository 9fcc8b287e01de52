use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use log::debug;
use processor_tools::{helpers::sign_webhook_payload, WebhookVerifier};
use relay_common::Secret;
use relay_engine::{events::EventProducers, JsonFileStore, StatusApi};

use crate::{
    errors::ServerError,
    middleware::WebhookSignatureFactory,
    routes::{PaymentStatusRoute, PaymentWebhookRoute, PaymentsRoute, SavePaymentRoute},
};

// Test signing secret. DO NOT re-use it anywhere.
pub const WEBHOOK_SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

/// Sends `req` to an app built by `configure` and returns the status and body. Errors raised by middleware are
/// rendered the same way the server would render them.
pub async fn send_request<F>(req: TestRequest, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|e, _req| ServerError::InvalidRequestBody(e.to_string()).into());
    let app = App::new().app_data(json_config).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = res.into_body().try_into_bytes().unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn signature_factory(enabled: bool) -> WebhookSignatureFactory {
    let verifier = WebhookVerifier::new(&Secret::from(WEBHOOK_SECRET)).expect("valid test secret");
    WebhookSignatureFactory::new(Some(verifier), enabled)
}

/// Registers every payment status route under `/api`, backed by `store`.
pub fn configure_status_routes(
    cfg: &mut ServiceConfig,
    store: JsonFileStore,
    producers: EventProducers,
    signatures: WebhookSignatureFactory,
) {
    cfg.app_data(web::Data::new(StatusApi::new(store)))
        .app_data(web::Data::new(producers))
        .service(
            web::scope("/api")
                .service(PaymentWebhookRoute::<JsonFileStore>::new(signatures))
                .service(SavePaymentRoute::<JsonFileStore>::new())
                .service(PaymentStatusRoute::<JsonFileStore>::new())
                .service(PaymentsRoute::<JsonFileStore>::new()),
        );
}

/// A webhook request signed with [`WEBHOOK_SECRET`] and the current time.
pub fn signed_webhook(body: &str) -> TestRequest {
    let timestamp = unix_now().to_string();
    let signature = sign_webhook_payload(WEBHOOK_SECRET, "msg_test", &timestamp, body.as_bytes()).unwrap();
    TestRequest::post()
        .uri("/api/webhook")
        .insert_header(("webhook-id", "msg_test"))
        .insert_header(("webhook-timestamp", timestamp))
        .insert_header(("webhook-signature", signature))
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_string())
}

fn unix_now() -> u64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default()
}
