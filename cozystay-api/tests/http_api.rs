use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use cozystay_api::{app, AppState, HttpConfig, SessionAuthenticator};
use async_trait::async_trait;
use cozystay_core::{BookingRepository, PriceRange, RepoResult, Room, RoomRepository};
use cozystay_store::InMemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Room store that never answers within the request deadline.
struct StalledRooms;

#[async_trait]
impl RoomRepository for StalledRooms {
    async fn list_rooms(&self, _range: PriceRange) -> RepoResult<Vec<Room>> {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        Ok(Vec::new())
    }

    async fn get_room(&self, _id: Uuid) -> RepoResult<Option<Room>> {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        Ok(None)
    }

    async fn set_available(&self, _id: Uuid, _available: bool) -> RepoResult<()> {
        Ok(())
    }
}

const SECRET: &str = "integration-secret";
const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

struct TestApp {
    router: Router,
    store: InMemoryStore,
    sessions: SessionAuthenticator,
}

impl TestApp {
    async fn new() -> Self {
        let store = InMemoryStore::new();
        let sessions = SessionAuthenticator::new(SECRET, 3600, "token");
        let state = AppState::from_store(Arc::new(store.clone()), sessions.clone(), HttpConfig::default());
        Self {
            router: app(state),
            store,
            sessions,
        }
    }

    async fn add_room(&self, price: f64) -> Uuid {
        let mut details = serde_json::Map::new();
        details.insert("name".into(), json!(format!("Room at {price}")));
        let room = Room {
            id: Uuid::new_v4(),
            price_per_night: price,
            available: true,
            details,
        };
        let id = room.id;
        self.store.insert_room(room).await;
        id
    }

    fn cookie(&self, identity: &str) -> String {
        format!("token={}", self.sessions.issue(identity).unwrap())
    }

    async fn send(&self, method: &str, uri: &str, identity: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(identity) = identity {
            builder = builder.header(header::COOKIE, self.cookie(identity));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, value)
    }

    async fn create_booking(&self, owner: &str, room_id: Uuid, check_in_offset: Duration) -> Uuid {
        let check_in = Utc::now() + check_in_offset;
        let (status, body) = self
            .send(
                "POST",
                "/bookings",
                Some(owner),
                Some(json!({
                    "email": owner,
                    "room_id": room_id,
                    "checkInDate": check_in.to_rfc3339(),
                    "checkOutDate": (check_in + Duration::days(2)).to_rfc3339(),
                    "numRooms": 1,
                    "numAdults": 2,
                    "numChildren": 0,
                    "pricePerNight": 150,
                    "totalCost": 300
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
    }
}

fn stay_body(check_in_days: i64, total: f64) -> Value {
    let check_in = Utc::now() + Duration::days(check_in_days);
    json!({
        "checkInDate": check_in.to_rfc3339(),
        "checkOutDate": (check_in + Duration::days(2)).to_rfc3339(),
        "numRooms": 1,
        "numAdults": 2,
        "numChildren": 1,
        "pricePerNight": 150,
        "totalCost": total
    })
}

#[tokio::test]
async fn test_health_text() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("hotel booking server is running".into()));
}

#[tokio::test]
async fn test_jwt_sets_secure_cookie_and_logout_clears_it() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/jwt")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": ALICE, "name": "Alice" }).to_string()))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("SameSite=None"));

    let token = set_cookie
        .trim_start_matches("token=")
        .split(';')
        .next()
        .unwrap();
    assert_eq!(app.sessions.validate(token).unwrap().email, ALICE);

    let request = Request::builder().method("POST").uri("/logout").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.starts_with("token="));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_rooms_filtered_by_price_ascending() {
    let app = TestApp::new().await;
    for price in [250.0, 120.0, 200.0, 80.0, 100.0] {
        app.add_room(price).await;
    }

    let (status, body) = app.send("GET", "/rooms?minPrice=100&maxPrice=200", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|room| room["pricePerNight"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![100.0, 120.0, 200.0]);
    assert!(body[0].get("name").is_some());

    let (status, body) = app.send("GET", "/rooms?maxPrice=100", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.send("GET", "/rooms?minPrice=cheap", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn test_get_room_by_id() {
    let app = TestApp::new().await;
    let room_id = app.add_room(140.0).await;

    let (status, body) = app.send("GET", &format!("/rooms/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);

    let (status, body) = app.send("GET", &format!("/rooms/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_bookings_require_session() {
    let app = TestApp::new().await;
    let (status, body) = app.send("GET", &format!("/bookings?email={ALICE}"), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");

    let request = Request::builder()
        .uri("/bookings")
        .header(header::COOKIE, "token=forged.jwt.value")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_someone_elses_bookings_is_forbidden() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    app.create_booking(ALICE, room_id, Duration::days(5)).await;

    let (status, body) = app.send("GET", &format!("/bookings?email={ALICE}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = app.send("GET", &format!("/bookings?email={ALICE}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], ALICE);

    let (status, body) = app.send("GET", "/bookings", Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_for_other_identity_is_forbidden() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let mut body = stay_body(5, 300.0);
    body["email"] = json!(ALICE);
    body["room_id"] = json!(room_id);

    let (status, _) = app.send("POST", "/bookings", Some(BOB), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.store.get_room(room_id).await.unwrap().unwrap().available);
}

#[tokio::test]
async fn test_booking_unknown_room_is_not_found() {
    let app = TestApp::new().await;
    let mut body = stay_body(5, 300.0);
    body["email"] = json!(ALICE);
    body["room_id"] = json!(Uuid::new_v4());

    let (status, _) = app.send("POST", "/bookings", Some(ALICE), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_booking_checks_owner() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let booking_id = app.create_booking(ALICE, room_id, Duration::days(5)).await;

    let (status, body) = app.send("GET", &format!("/bookings/{booking_id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, _) = app.send("GET", &format!("/bookings/{booking_id}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", "/bookings/not-an-id", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_room_bookings_listing_hides_owner() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    app.create_booking(ALICE, room_id, Duration::days(5)).await;

    let (status, body) = app.send("GET", &format!("/bookings/room/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].get("email").is_none());
    assert!(entries[0].get("checkInDate").is_some());
}

#[tokio::test]
async fn test_cancel_well_ahead_succeeds() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let booking_id = app.create_booking(ALICE, room_id, Duration::hours(72)).await;
    assert!(!app.store.get_room(room_id).await.unwrap().unwrap().available);

    let (status, body) = app
        .send("POST", &format!("/bookings/{booking_id}/cancel"), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Booking canceled successfully");

    assert!(app.store.get_room(room_id).await.unwrap().unwrap().available);
    let (status, _) = app.send("GET", &format!("/bookings/{booking_id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancel_within_deadline_hour_is_too_close() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    // past the deadline check but still 24 whole hours out
    let booking_id = app
        .create_booking(ALICE, room_id, Duration::hours(24) + Duration::minutes(30))
        .await;

    let (status, body) = app
        .send("POST", &format!("/bookings/{booking_id}/cancel"), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "too_close_to_check_in");

    assert!(app.store.get_booking(booking_id).await.unwrap().is_some());
    assert!(!app.store.get_room(room_id).await.unwrap().unwrap().available);
}

#[tokio::test]
async fn test_cancel_after_check_in_misses_deadline() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let booking_id = app.create_booking(ALICE, room_id, -Duration::days(1)).await;

    let (status, body) = app
        .send("POST", &format!("/bookings/{booking_id}/cancel"), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "deadline_passed");
}

#[tokio::test]
async fn test_cancel_unknown_booking_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send("POST", &format!("/bookings/{}/cancel", Uuid::new_v4()), Some(ALICE), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_concurrent_cancel_requests() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let booking_id = app.create_booking(ALICE, room_id, Duration::days(4)).await;
    let uri = format!("/bookings/{booking_id}/cancel");

    let (first, second) = tokio::join!(
        app.send("POST", &uri, Some(ALICE), None),
        app.send("POST", &uri, Some(ALICE), None),
    );

    let statuses = [first.0, second.0];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    for status in statuses {
        assert!(status == StatusCode::OK || status == StatusCode::NOT_FOUND, "got {status}");
    }
    assert!(app.store.get_room(room_id).await.unwrap().unwrap().available);
    assert!(app.store.get_booking(booking_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_distinguishes_created_from_modified() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let id = Uuid::new_v4();

    let mut body = stay_body(7, 300.0);
    body["room_id"] = json!(room_id);
    let (status, created) = app.send("PUT", &format!("/bookings/{id}"), Some(ALICE), Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["created"], true);
    assert_eq!(created["booking"]["email"], ALICE);

    body["totalCost"] = json!(450);
    let (status, modified) = app.send("PUT", &format!("/bookings/{id}"), Some(ALICE), Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(modified["created"], false);
    assert_eq!(modified["modified"], true);

    let (status, unchanged) = app.send("PUT", &format!("/bookings/{id}"), Some(ALICE), Some(body.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["modified"], false);

    let (status, _) = app.send("PUT", &format!("/bookings/{id}"), Some(BOB), Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_put_unknown_id_without_room_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .send("PUT", &format!("/bookings/{}", Uuid::new_v4()), Some(ALICE), Some(stay_body(7, 300.0)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn test_delete_booking_reports_count() {
    let app = TestApp::new().await;
    let room_id = app.add_room(150.0).await;
    let booking_id = app.create_booking(ALICE, room_id, Duration::days(5)).await;

    let (status, _) = app.send("DELETE", &format!("/bookings/{booking_id}"), Some(BOB), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.send("DELETE", &format!("/bookings/{booking_id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 1);

    let (status, body) = app.send("DELETE", &format!("/bookings/{booking_id}"), Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 0);
}

#[tokio::test]
async fn test_reviews_crud_and_rating_filter() {
    let app = TestApp::new().await;
    for (key, rating) in [("r-1", 5), ("r-2", 3), ("r-3", 4)] {
        let (status, _) = app
            .send(
                "POST",
                "/reviews",
                None,
                Some(json!({ "review_id": key, "rating": rating, "comment": "nice stay" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.send("GET", "/reviews?minRating=4&maxRating=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.send("GET", "/reviews/r-2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 3);
    assert_eq!(body["comment"], "nice stay");

    let (status, _) = app.send("GET", "/reviews/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send("POST", "/reviews", None, Some(json!({ "review_id": "r-1", "rating": 1 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_slow_request_times_out_with_error_body() {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(
        Arc::new(StalledRooms),
        store.clone(),
        store,
        SessionAuthenticator::new(SECRET, 3600, "token"),
        HttpConfig {
            allowed_origins: Vec::new(),
            request_timeout: std::time::Duration::from_millis(100),
        },
    );

    let request = Request::builder().uri("/rooms").body(Body::empty()).unwrap();
    let response = app(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "timeout");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_review_body_cannot_shadow_server_fields() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method("POST")
        .uri("/reviews")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "review_id": "r-spoof",
                "rating": 5,
                "id": "spoofed",
                "createdAt": "1999-01-01",
                "comment": "kept"
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let raw = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(raw.matches("\"id\"").count(), 1, "{raw}");
    assert_eq!(raw.matches("\"createdAt\"").count(), 1, "{raw}");

    let body: Value = serde_json::from_str(&raw).unwrap();
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert_ne!(body["createdAt"], "1999-01-01");
    assert_eq!(body["comment"], "kept");

    let (_, stored) = app.send("GET", "/reviews/r-spoof", None, None).await;
    assert_eq!(stored["id"], body["id"]);
}

#[tokio::test]
async fn test_room_attributes_cannot_shadow_typed_fields() {
    let app = TestApp::new().await;
    let room_id = Uuid::new_v4();
    let mut details = serde_json::Map::new();
    details.insert("id".into(), json!("bogus"));
    details.insert("available".into(), json!("maybe"));
    details.insert("view".into(), json!("sea"));
    app.store
        .insert_room(Room {
            id: room_id,
            price_per_night: 99.0,
            available: true,
            details,
        })
        .await;

    let (status, body) = app.send("GET", &format!("/rooms/{room_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], room_id.to_string());
    assert_eq!(body["available"], true);
    assert_eq!(body["view"], "sea");
}
