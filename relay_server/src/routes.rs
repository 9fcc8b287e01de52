//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any I/O (the status file, calls to the payment processor) must be
//! awaited, never performed synchronously in a handler.
use std::collections::HashMap;

use actix_web::{get, http::header::ContentType, post, web, HttpResponse, Responder};
use log::*;
use processor_tools::{data_objects::StaticCheckoutParams, ProcessorApi};
use relay_engine::{
    db_types::PaymentId,
    events::{EventProducers, WebhookEvent},
    EventOutcome,
    StatusApi,
    StatusManagement,
};
use serde_json::Value;

use crate::{data_objects::JsonResponse, errors::ServerError, middleware::WebhookSignatureFactory};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where wrap $mw:ty)  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>($mw, core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            pub fn new(middleware: $mw) -> Self {
                Self(middleware, core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap(self.0);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

const INDEX_HTML: &str = include_str!("../static/index.html");
const PAYMENT_RETURN_HTML: &str = include_str!("../static/payment-return.html");

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Pages  ----------------------------------------------------
#[get("/")]
pub async fn index_page() -> impl Responder {
    HttpResponse::Ok().insert_header(ContentType::html()).body(INDEX_HTML)
}

#[get("/payment-return")]
pub async fn payment_return_page() -> impl Responder {
    HttpResponse::Ok().insert_header(ContentType::html()).body(PAYMENT_RETURN_HTML)
}

//----------------------------------------------   Checkout  ----------------------------------------------------
/// Static checkout. Builds a hosted checkout link for `productId` (and optional `quantity`, customer prefill and
/// `metadata_*` parameters) and returns it as `{ "checkout_url": "..." }`.
#[get("/checkout")]
pub async fn static_checkout(
    query: web::Query<HashMap<String, String>>,
    api: web::Data<ProcessorApi>,
) -> Result<HttpResponse, ServerError> {
    trace!("🛒️ Received static checkout request");
    let params = StaticCheckoutParams::from_query(&query)?;
    let session = api.static_checkout_url(&params)?;
    Ok(HttpResponse::Ok().json(session))
}

/// Dynamic checkout. The request body is forwarded to the processor, which creates a checkout session and returns a
/// payment link.
#[post("/checkout")]
pub async fn dynamic_checkout(
    body: web::Json<Value>,
    api: web::Data<ProcessorApi>,
) -> Result<HttpResponse, ServerError> {
    trace!("🛒️ Received dynamic checkout request");
    let session = api.create_checkout_session(body.into_inner()).await.map_err(|e| {
        warn!("🛒️ Could not create checkout session. {e}");
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(session))
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(payment_webhook => Post "/webhook" impl StatusManagement where wrap WebhookSignatureFactory);
/// Receives payment events from the processor. By the time this handler runs, the signature middleware has
/// already authenticated the request.
///
/// Every event is passed to the webhook observers. Payment events then update the status of the payment named in
/// `data.payment_id`.
pub async fn payment_webhook<B: StatusManagement>(
    body: web::Bytes,
    api: web::Data<StatusApi<B>>,
    producers: web::Data<EventProducers>,
) -> HttpResponse {
    trace!("🪝️ Received webhook request");
    // Webhook responses must always be in 200 range, otherwise the processor will retry
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("🪝️ Could not parse webhook payload. {e}");
            return HttpResponse::Ok().json(JsonResponse::failure(format!("Invalid payload. {e}")));
        },
    };
    let event = WebhookEvent::from_envelope(payload);
    producers.publish_webhook_event(&event).await;
    let result = match api.process_webhook_event(event).await {
        EventOutcome::Recorded { id, status } => JsonResponse::success(format!("Payment {id} is now {status}.")),
        EventOutcome::Ignored { event_type } => JsonResponse::success(format!("Event {event_type} received.")),
        EventOutcome::MissingPaymentId { event_type } => {
            JsonResponse::failure(format!("Event {event_type} did not contain a payment id."))
        },
    };
    HttpResponse::Ok().json(result)
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(save_payment => Post "/save-payment" impl StatusManagement);
/// Records a payment status supplied by the caller. `id` and `status` are required; `timestamp` defaults to now. The
/// full request body is stored as the record's `data`.
pub async fn save_payment<B: StatusManagement>(
    body: web::Json<Value>,
    api: web::Data<StatusApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received save payment request");
    let id = api.save_payment(body.into_inner()).await.map_err(|e| {
        debug!("💻️ Rejected save payment request. {e}");
        ServerError::from(e)
    })?;
    debug!("💻️ Status saved for payment {id}");
    Ok(HttpResponse::Ok().json(JsonResponse::success("Payment status saved")))
}

route!(payment_status => Get "/payment-status/{payment_id}" impl StatusManagement);
pub async fn payment_status<B: StatusManagement>(
    path: web::Path<String>,
    api: web::Data<StatusApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = PaymentId::from(path.into_inner());
    trace!("💻️ GET payment status for {id}");
    let record = api.fetch_payment_status(&id).await?.ok_or(ServerError::PaymentNotFound)?;
    Ok(HttpResponse::Ok().json(record))
}

route!(payments => Get "/payments" impl StatusManagement);
pub async fn payments<B: StatusManagement>(api: web::Data<StatusApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET all payments");
    let entries = api.list_payments().await?;
    Ok(HttpResponse::Ok().json(entries))
}
