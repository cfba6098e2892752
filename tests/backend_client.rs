mod support;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use serde_json::json;

use blood_portal::backend::{BackendClient, MessageUpdate};
use blood_portal::error::{AppError, GENERIC_FAILURE};
use blood_portal::models::{BloodType, ContactStatus};
use blood_portal::session::Session;
use support::MockBackend;

fn client_for(backend: &MockBackend) -> BackendClient {
    BackendClient::new(&backend.url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn list_reads_items_and_stats() {
    let backend = MockBackend::start().await;
    backend.reply(
        Method::GET,
        "/bloodbanks",
        StatusCode::OK,
        json!({
            "success": true,
            "data": [{"_id": "b1", "name": "Central", "address": "1 Main St",
                      "bloodStock": {"AB+": "5", "_id": "x"}}],
            "stats": {"banks": 1}
        }),
    );

    let page = client_for(&backend)
        .list_blood_banks(&Session::anonymous())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].blood_stock.units(BloodType::AbPositive), 5);
    assert_eq!(page.stats, Some(json!({"banks": 1})));
    assert_eq!(backend.hits()[0].authorization, None);
}

#[tokio::test]
async fn rejected_request_carries_server_message() {
    let backend = MockBackend::start().await;
    backend.reply(
        Method::GET,
        "/events/missing",
        StatusCode::NOT_FOUND,
        json!({ "success": false, "message": "Event not found" }),
    );

    let err = client_for(&backend)
        .get_event(&Session::anonymous(), "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Business { status, .. } if status == StatusCode::NOT_FOUND));
    assert_eq!(err.user_message("Failed to load event"), "Event not found");
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn success_false_on_ok_status_is_a_business_error() {
    let backend = MockBackend::start().await;
    backend.reply(
        Method::POST,
        "/events/e1/register",
        StatusCode::OK,
        json!({ "success": false }),
    );

    let err = client_for(&backend)
        .register_for_event(&Session::anonymous().with_user_token("t"), "e1")
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Failed to register for event"), "Failed to register for event");
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(&format!("http://{addr}/api"), Duration::from_secs(2)).unwrap();
    let err = client.list_events(&Session::anonymous()).await.unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));
    assert_eq!(err.user_message(GENERIC_FAILURE), GENERIC_FAILURE);
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn mutations_need_a_session_before_any_call() {
    let backend = MockBackend::start().await;
    let err = client_for(&backend)
        .delete_message(&Session::anonymous(), "m1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert!(backend.hits().is_empty());
}

#[tokio::test]
async fn message_update_sends_only_set_fields() {
    let backend = MockBackend::start().await;
    backend.reply(
        Method::PUT,
        "/contact/messages/m1",
        StatusCode::OK,
        json!({ "success": true, "message": "Updated" }),
    );

    let update = MessageUpdate {
        status: Some(ContactStatus::InProgress),
        ..Default::default()
    };
    let ack = client_for(&backend)
        .update_message(&Session::anonymous().with_blood_bank_token("bank"), "m1", &update)
        .await
        .unwrap();
    assert_eq!(ack.message.as_deref(), Some("Updated"));

    let hit = &backend.hits()[0];
    assert_eq!(hit.authorization.as_deref(), Some("Bearer bank"));
    let sent: serde_json::Value = serde_json::from_str(&hit.body).unwrap();
    assert_eq!(sent, json!({ "status": "in-progress" }));
}

#[tokio::test]
async fn email_in_path_is_escaped() {
    let backend = MockBackend::start().await;
    backend.reply(
        Method::GET,
        "/contact/my-messages/ana%2Bdrive%40example.org",
        StatusCode::OK,
        json!({ "success": true, "data": [] }),
    );

    let page = client_for(&backend)
        .my_messages(&Session::anonymous(), "ana+drive@example.org")
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn dot_ids_never_leave_the_portal() {
    let backend = MockBackend::start().await;
    let client = client_for(&backend);
    let session = Session::anonymous().with_user_token("admin-token");

    let err = client.delete_message(&session, "..").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    let err = client.approve_event(&session, ".").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(backend.hits().is_empty());
}
