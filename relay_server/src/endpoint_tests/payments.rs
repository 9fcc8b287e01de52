use actix_web::{http::StatusCode, test::TestRequest, web};
use log::*;
use relay_engine::{
    db_types::{PaymentEntry, PaymentId, StatusRecord},
    events::EventProducers,
    test_utils::temp_store,
    StatusApi,
    StoreError,
};
use serde_json::{json, Value};

use super::{
    helpers::{configure_status_routes, send_request, signature_factory},
    mocks::MockStatusStore,
};
use crate::routes::{PaymentStatusRoute, PaymentsRoute, SavePaymentRoute};

#[actix_web::test]
async fn save_then_fetch_payment_status() {
    let (_dir, store) = temp_store().await;
    let body = json!({"id": "pay_42", "status": "success", "timestamp": "2024-01-01T00:00:00.000Z", "amount": 500});
    let req = TestRequest::post().uri("/api/save-payment").set_json(&body);
    let s = store.clone();
    let (status, res) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, r#"{"success":true,"message":"Payment status saved"}"#);

    let req = TestRequest::get().uri("/api/payment-status/pay_42");
    let s = store.clone();
    let (status, res) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let record: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(record, json!({"status": "success", "timestamp": "2024-01-01T00:00:00.000Z", "data": body}));

    // The write survives a reload from disk
    let reloaded = relay_engine::JsonFileStore::load(store.path()).await;
    assert_eq!(reloaded.get(&PaymentId::from("pay_42")).await.unwrap().status, "success");
}

#[actix_web::test]
async fn save_without_id_is_rejected() {
    let (_dir, store) = temp_store().await;
    let req = TestRequest::post().uri("/api/save-payment").set_json(json!({"status": "success"}));
    let s = store.clone();
    let (status, res) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(res, r#"{"error":"Missing required fields: id and status"}"#);
    assert!(store.is_empty().await);
    assert!(!store.path().exists());
}

#[actix_web::test]
async fn save_with_malformed_body_is_rejected() {
    let (_dir, store) = temp_store().await;
    let req = TestRequest::post()
        .uri("/api/save-payment")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json");
    let s = store.clone();
    let (status, _) = send_request(req, move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn unknown_payment_is_not_found() {
    let (_dir, store) = temp_store().await;
    let req = TestRequest::get().uri("/api/payment-status/pay_missing");
    let (status, res) = send_request(req, move |cfg| {
        configure_status_routes(cfg, store, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(res, r#"{"error":"Payment not found"}"#);
}

#[actix_web::test]
async fn list_payments() {
    let (_dir, store) = temp_store().await;
    let s = store.clone();
    let (status, res) = send_request(TestRequest::get().uri("/api/payments"), move |cfg| {
        configure_status_routes(cfg, s, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, "[]");

    store.set("pay_a".into(), StatusRecord::new("success", None, json!({}))).await.unwrap();
    store.set("pay_b".into(), StatusRecord::new("failed", None, json!({}))).await.unwrap();
    let (status, res) = send_request(TestRequest::get().uri("/api/payments"), move |cfg| {
        configure_status_routes(cfg, store, EventProducers::default(), signature_factory(true))
    })
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries: Vec<PaymentEntry> = serde_json::from_str(&res).unwrap();
    let mut ids = entries.iter().map(|e| e.id.as_str().to_string()).collect::<Vec<_>>();
    ids.sort();
    assert_eq!(ids, vec!["pay_a", "pay_b"]);
    let b = entries.iter().find(|e| e.id.as_str() == "pay_b").unwrap();
    assert_eq!(b.record.status, "failed");
}

#[actix_web::test]
async fn persistence_failure_still_reports_success() {
    let _ = env_logger::try_init();
    let mut store = MockStatusStore::new();
    store
        .expect_set_status()
        .withf(|id, record| id.as_str() == "pay_1" && record.status == "failed")
        .times(1)
        .returning(|_, _| Err(StoreError::Persistence("disk full".into())));
    let req = TestRequest::post().uri("/api/save-payment").set_json(json!({"id": "pay_1", "status": "failed"}));
    let (status, res) = send_request(req, move |cfg| {
        cfg.app_data(web::Data::new(StatusApi::new(store)))
            .service(web::scope("/api").service(SavePaymentRoute::<MockStatusStore>::new()));
    })
    .await;
    debug!("Response: {res}");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(res, r#"{"success":true,"message":"Payment status saved"}"#);
}

#[actix_web::test]
async fn backend_read_failures_are_server_errors() {
    let mut store = MockStatusStore::new();
    store.expect_fetch_status().returning(|_| Err(StoreError::Persistence("gone".into())));
    store.expect_fetch_all_statuses().returning(|| Err(StoreError::Persistence("gone".into())));
    let api = web::Data::new(StatusApi::new(store));
    let routes = |api: web::Data<StatusApi<MockStatusStore>>| {
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(api).service(
                web::scope("/api")
                    .service(PaymentStatusRoute::<MockStatusStore>::new())
                    .service(PaymentsRoute::<MockStatusStore>::new()),
            );
        }
    };
    let (status, _) = send_request(TestRequest::get().uri("/api/payment-status/pay_1"), routes(api.clone())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = send_request(TestRequest::get().uri("/api/payments"), routes(api)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
