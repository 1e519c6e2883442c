use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stay_bookings::api::{BookingStore, BookingStoreClient};
use stay_bookings::booking::BookingStatus;
use stay_bookings::config::StoreConfig;
use stay_bookings::error::StoreError;

/// Create a store config pointed at the mock server
fn test_config(base_url: &str) -> StoreConfig {
    StoreConfig {
        base_url: base_url.to_string(),
        api_token: Some("test-token-123".to_string()),
        timeout_secs: 5,
    }
}

fn booking_json(id: u64, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "status": status,
        "checkIn": "2025-12-01T14:00:00Z",
        "checkOut": "2025-12-04T11:00:00Z",
        "guests": 3,
        "totalAmount": 2400.0,
        "property": {
            "id": 77,
            "title": "Lusail Marina View",
            "area": "Lusail",
            "city": "Doha",
            "host": { "id": 8, "name": "Fahad" },
            "photo": "https://cdn.example.qa/77.jpg"
        },
        "hasReviewed": false
    })
}

// ── get_bookings tests ───────────────────────────────────────────

#[tokio::test]
async fn get_bookings_preserves_server_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bookings/my-bookings"))
        .and(header("authorization", "Bearer test-token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookings": [
                booking_json(9, "confirmed"),
                booking_json(3, "cancelled"),
                booking_json(5, "pending")
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let bookings = client.get_bookings().await.unwrap();

    assert_eq!(bookings.len(), 3);
    assert_eq!(bookings[0].id, 9);
    assert_eq!(bookings[0].status, BookingStatus::Confirmed);
    assert_eq!(bookings[0].property.host.name, "Fahad");
    assert_eq!(bookings[1].status, BookingStatus::Cancelled);
    assert_eq!(bookings[2].id, 5);
}

#[tokio::test]
async fn get_bookings_tolerates_unknown_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bookings/my-bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookings": [booking_json(1, "awaiting_host")]
        })))
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let bookings = client.get_bookings().await.unwrap();

    assert_eq!(
        bookings[0].status,
        BookingStatus::Unknown("awaiting_host".to_string())
    );
}

#[tokio::test]
async fn get_bookings_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bookings/my-bookings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookings": [] })),
        )
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let bookings = client.get_bookings().await.unwrap();
    assert!(bookings.is_empty());
}

#[tokio::test]
async fn get_bookings_unauthorized_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bookings/my-bookings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let err = client.get_bookings().await.unwrap_err();
    assert!(matches!(err, StoreError::Auth(_)), "Got: {}", err);
}

#[tokio::test]
async fn get_bookings_server_error_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bookings/my-bookings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let err = client.get_bookings().await.unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("503"), "Got: {}", msg);
}

// ── cancel_booking tests ─────────────────────────────────────────

#[tokio::test]
async fn cancel_booking_sends_reason() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings/42/cancel"))
        .and(body_json(serde_json::json!({ "reason": "Flight cancelled" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let result = client.cancel_booking(42, "Flight cancelled").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn cancel_booking_rejected_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings/42/cancel"))
        .respond_with(ResponseTemplate::new(422).set_body_string("Cancellation window closed"))
        .mount(&server)
        .await;

    let client = BookingStoreClient::new(&test_config(&server.uri())).unwrap();
    let err = client.cancel_booking(42, "Change of plans").await.unwrap_err();

    match err {
        StoreError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Cancellation window closed");
        }
        other => panic!("Expected rejection, got: {}", other),
    }
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bookings/7/cancel"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&format!("{}/", server.uri()));
    let client = BookingStoreClient::new(&config).unwrap();
    client.cancel_booking(7, "Change of plans").await.unwrap();
}
