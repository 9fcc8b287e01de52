use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use processor_tools::{ProcessorApi, WebhookVerifier};
use relay_engine::{
    events::{logging_observer, EventHandlers, EventHooks, EventProducers},
    JsonFileStore,
    StatusApi,
};

use crate::{
    config::RelayConfig,
    errors::ServerError,
    middleware::WebhookSignatureFactory,
    routes::{
        dynamic_checkout,
        health,
        index_page,
        payment_return_page,
        static_checkout,
        PaymentStatusRoute,
        PaymentWebhookRoute,
        PaymentsRoute,
        SavePaymentRoute,
    },
};

const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: RelayConfig) -> Result<(), ServerError> {
    let store = JsonFileStore::load(&config.store_path).await;
    info!("💾️ Payment statuses are stored in {}", store.path().display());
    let mut hooks = EventHooks::default();
    hooks.on_webhook_event = Some(logging_observer());
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, store, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Builds the webhook middleware from the configuration. A missing or malformed signing secret does not stop the
/// server, but every signed webhook will be refused until it is fixed.
pub fn webhook_signature_factory(config: &RelayConfig) -> WebhookSignatureFactory {
    let verifier = match WebhookVerifier::new(&config.processor.webhook_secret) {
        Ok(v) => Some(v),
        Err(e) => {
            if config.webhook_checks {
                error!("🪛️ Webhook signatures cannot be verified, so all webhooks will be rejected. {e}");
            }
            None
        },
    };
    WebhookSignatureFactory::new(verifier, config.webhook_checks)
}

pub fn create_server_instance(
    config: RelayConfig,
    store: JsonFileStore,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let processor_api = ProcessorApi::new(config.processor.clone())?;
    let signature_check = webhook_signature_factory(&config);
    let srv = HttpServer::new(move || {
        let status_api = StatusApi::new(store.clone());
        let json_config = web::JsonConfig::default()
            .error_handler(|e, _req| ServerError::InvalidRequestBody(e.to_string()).into());
        let api_scope = web::scope("/api")
            .service(static_checkout)
            .service(dynamic_checkout)
            .service(PaymentWebhookRoute::<JsonFileStore>::new(signature_check.clone()))
            .service(SavePaymentRoute::<JsonFileStore>::new())
            .service(PaymentStatusRoute::<JsonFileStore>::new())
            .service(PaymentsRoute::<JsonFileStore>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("relay::access_log"))
            .app_data(json_config)
            .app_data(web::Data::new(status_api))
            .app_data(web::Data::new(processor_api.clone()))
            .app_data(web::Data::new(producers.clone()))
            .service(health)
            .service(index_page)
            .service(payment_return_page)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Payment relay listening on {}:{}", config.host, config.port);
    Ok(srv)
}
