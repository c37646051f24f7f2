// Integration tests for `HubClient` using wiremock.
#![allow(clippy::unwrap_used)]

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use powerview_api::{Error, HubClient, Motion, PositionEntry, ShadeId, ShadePositions, ShadeUpdate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HubClient) {
    let server = MockServer::start().await;
    let client = HubClient::with_client(reqwest::Client::new(), server.uri().parse().unwrap());
    (server, client)
}

fn shade_body(id: u32) -> serde_json::Value {
    json!({
        "shade": {
            "id": id,
            "name": "TGl2aW5nIFJvb20=",
            "roomId": 4,
            "type": 8,
            "batteryStatus": 3,
            "batteryStrength": 182,
            "positions": { "posKind1": 1, "position1": 65535 }
        }
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_get_shades() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/home/shades"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "shadeIds": [11, 12],
            "shadeData": [
                { "id": 11, "positions": { "posKind1": 1, "position1": 0 } },
                { "id": 12 }
            ]
        })))
        .mount(&server)
        .await;

    let shades = client.get_shades().await.unwrap();

    assert_eq!(shades.shade_ids, vec![ShadeId(11), ShadeId(12)]);
    assert_eq!(shades.shade_data.len(), 2);
    assert!(shades.shade_data[1].positions.is_none());
}

#[tokio::test]
async fn test_get_shade_without_refresh() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/home/shades/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shade_body(11)))
        .mount(&server)
        .await;

    let shade = client.get_shade(ShadeId(11), false).await.unwrap();

    assert_eq!(shade.id, ShadeId(11));
    assert_eq!(shade.room_id, Some(4));
    assert_eq!(shade.battery_strength, Some(182));
    assert_eq!(
        shade.positions.unwrap().entries(),
        &[PositionEntry { kind: 1, value: 65535 }]
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_get_shade_with_refresh() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/home/shades/11"))
        .and(query_param("refresh", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shade_body(11)))
        .expect(1)
        .mount(&server)
        .await;

    let shade = client.get_shade(ShadeId(11), true).await.unwrap();
    assert_eq!(shade.id, ShadeId(11));
}

#[tokio::test]
async fn test_put_shade_positions() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/home/shades/11"))
        .and(body_json(json!({
            "shade": { "positions": {
                "posKind1": 1, "position1": 32768,
                "posKind2": 2, "position2": 0,
            } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(shade_body(11)))
        .expect(1)
        .mount(&server)
        .await;

    let update = ShadeUpdate::Positions {
        positions: ShadePositions::new(vec![
            PositionEntry { kind: 1, value: 32768 },
            PositionEntry { kind: 2, value: 0 },
        ]),
    };
    let shade = client.put_shade(ShadeId(11), &update).await.unwrap();
    assert_eq!(shade.id, ShadeId(11));
}

#[tokio::test]
async fn test_put_shade_motion() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/home/shades/12"))
        .and(body_json(json!({ "shade": { "motion": "jog" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(shade_body(12)))
        .expect(1)
        .mount(&server)
        .await;

    let update = ShadeUpdate::Motion { motion: Motion::Jog };
    client.put_shade(ShadeId(12), &update).await.unwrap();
}

#[tokio::test]
async fn test_get_user_data() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/home/userdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userData": {
                "hubName": "SG9tZQ==",
                "serialNumber": "A1B2C3",
                "macAddress": "00:26:74:aa:bb:cc",
                "ip": "192.168.1.20",
                "rfID": "0x1234",
                "enableScheduledEvents": true
            }
        })))
        .mount(&server)
        .await;

    let user_data = client.get_user_data().await.unwrap();

    assert_eq!(user_data.serial_number.as_deref(), Some("A1B2C3"));
    assert_eq!(user_data.ip.as_deref(), Some("192.168.1.20"));
    assert_eq!(user_data.extra["enableScheduledEvents"], json!(true));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_200_is_status_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/home/shades/11"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let update = ShadeUpdate::Motion {
        motion: Motion::Calibrate,
    };
    let err = client.put_shade(ShadeId(11), &update).await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 500 }));
    assert_eq!(err.to_string(), "HTTP Error 500");
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/home/shades/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.get_shade(ShadeId(99), false).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/home/shades/11"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&server)
        .await;

    let err = client.get_shade(ShadeId(11), false).await.unwrap_err();

    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>busy</html>"),
        other => panic!("expected Deserialization, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_hub_is_transport_error() {
    // Port 9 (discard) on localhost is closed in test environments.
    let client = HubClient::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:9".parse().unwrap(),
    );

    let err = client.get_shades().await.unwrap_err();
    assert!(err.is_transport());
}
