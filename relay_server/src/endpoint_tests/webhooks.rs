use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_web::{http::StatusCode, test::TestRequest};
use relay_engine::{
    db_types::PaymentId,
    events::{EventHandler, EventProducers, WebhookEvent},
    test_utils::temp_store,
};
use serde_json::{json, Value};

use super::helpers::{configure_status_routes, send_request, signature_factory, signed_webhook, WEBHOOK_SECRET};
use crate::middleware::WebhookSignatureFactory;

fn payment_event(event_type: &str, payment_id: &str) -> String {
    json!({
        "business_id": "bus_1",
        "type": event_type,
        "timestamp": "2024-05-01T10:00:00Z",
        "data": {"payment_id": payment_id, "total_amount": 1500, "currency": "USD"}
    })
    .to_string()
}

#[actix_web::test]
async fn signed_webhook_updates_status() {
    let (_dir, store) = temp_store().await;
    let body = payment_event("payment.succeeded", "pay_w1");
    let s = store.clone();
    let (status, res) = send_request(signed_webhook(&body), move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(res.contains(r#""success":true"#));
    let record = store.get(&PaymentId::from("pay_w1")).await.unwrap();
    assert_eq!(record.status, "success");
    assert_eq!(record.data, serde_json::from_str::<Value>(&body).unwrap());

    // A later event for the same payment replaces the status
    let body = payment_event("payment.cancelled", "pay_w1");
    let s = store.clone();
    let (status, _) = send_request(signed_webhook(&body), move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.get(&PaymentId::from("pay_w1")).await.unwrap().status, "cancelled");
    assert_eq!(store.len().await, 1);
}

#[actix_web::test]
async fn tampered_webhook_is_rejected() {
    let (_dir, store) = temp_store().await;
    let signed = payment_event("payment.succeeded", "pay_w2");
    let req = signed_webhook(&signed).set_payload(payment_event("payment.succeeded", "pay_evil"));
    let s = store.clone();
    let (status, res) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(res.starts_with(r#"{"error":"Webhook rejected."#));
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn unsigned_webhook_is_rejected() {
    let (_dir, store) = temp_store().await;
    let req = TestRequest::post()
        .uri("/api/webhook")
        .insert_header(("content-type", "application/json"))
        .set_payload(payment_event("payment.failed", "pay_w3"));
    let s = store.clone();
    let (status, _) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn stale_webhook_is_rejected() {
    let (_dir, store) = temp_store().await;
    let body = payment_event("payment.failed", "pay_w4");
    let timestamp = "1600000000";
    let signature =
        processor_tools::helpers::sign_webhook_payload(WEBHOOK_SECRET, "msg_old", timestamp, body.as_bytes()).unwrap();
    let req = TestRequest::post()
        .uri("/api/webhook")
        .insert_header(("webhook-id", "msg_old"))
        .insert_header(("webhook-timestamp", timestamp))
        .insert_header(("webhook-signature", signature))
        .set_payload(body);
    let s = store.clone();
    let (status, _) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn overflowing_timestamp_is_rejected() {
    let (_dir, store) = temp_store().await;
    let req = TestRequest::post()
        .uri("/api/webhook")
        .insert_header(("webhook-id", "msg_min"))
        .insert_header(("webhook-timestamp", i64::MIN.to_string()))
        .insert_header(("webhook-signature", "v1,aGVsbG8="))
        .set_payload(payment_event("payment.succeeded", "pay_min"));
    let s = store.clone();
    let (status, res) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(res.contains("too far from the current time"));
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn unknown_events_are_acknowledged_without_writes() {
    let (_dir, store) = temp_store().await;
    let body = json!({"type": "subscription.active", "data": {"subscription_id": "sub_1"}}).to_string();
    let s = store.clone();
    let (status, res) = send_request(signed_webhook(&body), move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(res.contains(r#""success":true"#));
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn payment_events_without_an_id_are_not_recorded() {
    let (_dir, store) = temp_store().await;
    let body = json!({"type": "payment.succeeded", "data": {"total_amount": 10}}).to_string();
    let s = store.clone();
    let (status, res) = send_request(signed_webhook(&body), move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(res.contains(r#""success":false"#));
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn disabled_checks_accept_unsigned_webhooks() {
    let (_dir, store) = temp_store().await;
    let req = TestRequest::post().uri("/api/webhook").set_payload(payment_event("payment.processing", "pay_w5"));
    let s = store.clone();
    let (status, _) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(false))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.get(&PaymentId::from("pay_w5")).await.unwrap().status, "processing");
}

#[actix_web::test]
async fn missing_secret_rejects_everything() {
    let (_dir, store) = temp_store().await;
    let body = payment_event("payment.succeeded", "pay_w6");
    let s = store.clone();
    let (status, _) = send_request(signed_webhook(&body), move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), WebhookSignatureFactory::new(None, true))
    })
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn observers_see_every_verified_event() {
    let (_dir, store) = temp_store().await;
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let log = Arc::clone(&seen);
    let handler = EventHandler::new(
        4,
        Arc::new(move |event: WebhookEvent| {
            let log = Arc::clone(&log);
            Box::pin(async move {
                log.lock().unwrap().push(event.event_type().to_string());
            }) as std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>
        }),
    );
    let producers = EventProducers { webhook_event_producer: vec![handler.subscribe()] };
    tokio::spawn(handler.start_handler());

    for body in [
        payment_event("payment.succeeded", "pay_w7"),
        json!({"type": "refund.succeeded", "data": {"payment_id": "pay_w7"}}).to_string(),
    ] {
        let s = store.clone();
        let p = producers.clone();
        let (status, _) =
            send_request(signed_webhook(&body), move |cfg| configure_status_routes(cfg, s, p, signature_factory(true)))
                .await;
        assert_eq!(status, StatusCode::OK);
    }
    // Rejected deliveries never reach the observers
    let s = store.clone();
    let p = producers.clone();
    let req = TestRequest::post().uri("/api/webhook").set_payload(payment_event("payment.failed", "pay_w8"));
    let (status, _) = send_request(req, move |cfg| configure_status_routes(cfg, s, p, signature_factory(true))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    drop(producers);

    let mut attempts = 0;
    while seen.lock().unwrap().len() < 2 && attempts < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        attempts += 1;
    }
    assert_eq!(*seen.lock().unwrap(), vec!["payment.succeeded".to_string(), "refund.succeeded".to_string()]);
    assert_eq!(store.get(&PaymentId::from("pay_w7")).await.unwrap().status, "success");
}
