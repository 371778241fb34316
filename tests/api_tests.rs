use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use vehicle_rental::config::EnvironmentConfig;
use vehicle_rental::models::{Accessories, Booking, BookingStatus, PaymentMethod, UserRole};
use vehicle_rental::repositories::InMemoryStore;
use vehicle_rental::routes::create_app_router;
use vehicle_rental::services::{FixedClock, LocalProofStorage};
use vehicle_rental::state::AppState;
use vehicle_rental::utils::jwt::{generate_token, JwtConfig};

const SECRET: &str = "api-test-secret";
const BOUNDARY: &str = "rental-test-boundary";

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    admin_token: String,
    customer_token: String,
}

fn token(role: UserRole) -> String {
    let config = JwtConfig {
        secret: SECRET.to_string(),
        expiration: 3600,
    };
    generate_token(Uuid::new_v4(), role, &config).unwrap()
}

fn create_test_app() -> TestApp {
    let mut config = EnvironmentConfig::for_development(SECRET);
    config.upload_dir = std::env::temp_dir().join(format!("rental-api-{}", Uuid::new_v4()));

    let store = Arc::new(InMemoryStore::new());
    let proofs = Arc::new(LocalProofStorage::new(config.upload_dir.clone(), config.max_upload_bytes));
    let clock = Arc::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap()));

    let state = AppState::new(config, store.clone(), store.clone(), proofs, clock);

    TestApp {
        router: create_app_router(state),
        store,
        admin_token: token(UserRole::Admin),
        customer_token: token(UserRole::Customer),
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::get(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn json(&self, method: &str, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn submit(&self, vehicle_id: &str, pickup: &str, ret: &str) -> (StatusCode, Value) {
        let mut body = String::new();
        for (name, value) in [
            ("vehicle_id", vehicle_id),
            ("pickup_date", pickup),
            ("return_date", ret),
            ("payment_method", "upi"),
            ("helmet", "on"),
        ] {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"payment_proof\"; filename=\"upi.png\"\r\nContent-Type: image/png\r\n\r\nfake-png-bytes\r\n--{BOUNDARY}--\r\n"
        ));

        self.send(
            Request::post("/api/bookings")
                .header(header::AUTHORIZATION, format!("Bearer {}", self.customer_token))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    async fn create_bike(&self) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/api/admin/vehicles",
                &self.admin_token,
                json!({
                    "category": "two_wheeler",
                    "make": "Bajaj",
                    "model": "Pulsar 150",
                    "year": 2021,
                    "license_plate": "MH12 AB 1234",
                    "daily_rate": "400.00",
                    "seating_capacity": 2
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = app
        .send(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_bearer_token() {
    let app = create_test_app();
    let (status, body) = app
        .send(Request::get("/api/vehicles").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app.get("/api/vehicles", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let app = create_test_app();
    let (status, body) = app.get("/api/admin/bookings/pending", &app.customer_token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_invalid_vehicle_is_validation_error() {
    let app = create_test_app();
    let (status, body) = app
        .json(
            "POST",
            "/api/admin/vehicles",
            &app.admin_token,
            json!({
                "category": "four_wheeler",
                "make": "Maruti",
                "model": "Swift",
                "year": 2022,
                "license_plate": "KA01",
                "daily_rate": "-5"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["daily_rate"].is_array());
}

#[tokio::test]
async fn test_quote_previews_line_items() {
    let app = create_test_app();
    let vehicle_id = app.create_bike().await;

    let (status, body) = app
        .json(
            "POST",
            "/api/bookings/quote",
            &app.customer_token,
            json!({
                "vehicle_id": vehicle_id,
                "pickup_date": "2024-06-01",
                "return_date": "2024-06-03",
                "accessories": { "helmet": true }
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    let quote = &body["data"];
    assert_eq!(quote["duration_days"], 3);
    assert_eq!(decimal(&quote["total"]), dec!(1500));
    assert_eq!(quote["line_items"][0]["label"], "Vehicle rent");
    assert_eq!(quote["line_items"][1]["label"], "Helmet");
    assert_eq!(quote["line_items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_vehicle_details_list_offered_accessories() {
    let app = create_test_app();
    let vehicle_id = app.create_bike().await;

    let (status, body) = app.get(&format!("/api/vehicles/{vehicle_id}"), &app.customer_token).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["license_plate"], "MH12 AB 1234");
    let accessories = body["accessories"].as_array().unwrap();
    assert_eq!(accessories.len(), 2);
    assert!(accessories.iter().any(|a| a["accessory"] == "helmet"));
    assert!(accessories.iter().all(|a| a["accessory"] != "gps"));
}

#[tokio::test]
async fn test_submit_approve_and_conflict_flow() {
    let app = create_test_app();
    let vehicle_id = app.create_bike().await;

    let (status, body) = app.submit(&vehicle_id, "2024-07-01", "2024-07-05").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let booking = &body["data"];
    assert_eq!(booking["status"], "pending");
    assert_eq!(decimal(&booking["total_price"]), dec!(2500));
    assert!(booking["payment_proof"].as_str().unwrap().ends_with(".png"));
    let booking_id = booking["id"].as_str().unwrap().to_string();

    // Shares the 5th with the first request
    let (status, body) = app.submit(&vehicle_id, "2024-07-05", "2024-07-08").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicting_bookings"][0], booking_id.as_str());

    let (status, body) = app
        .get(
            &format!("/api/vehicles/{vehicle_id}/availability?pickup_date=2024-07-03&return_date=2024-07-04"),
            &app.customer_token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);

    let (status, body) = app.get("/api/admin/bookings/pending", &app.admin_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["booking"]["id"], booking_id.as_str());
    assert_eq!(body[0]["conflict"], false);

    let (status, body) = app
        .json(
            "POST",
            &format!("/api/admin/bookings/{booking_id}/decision"),
            &app.admin_token,
            json!({ "decision": "approve", "notes": "UPI reference checked" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "confirmed");

    let (_, vehicle) = app.get(&format!("/api/vehicles/{vehicle_id}"), &app.customer_token).await;
    assert_eq!(vehicle["status"], "booked");

    // A legacy pending row overlapping the confirmed booking
    let now = Utc::now();
    let legacy = Booking {
        id: Uuid::new_v4(),
        vehicle_id: vehicle_id.parse().unwrap(),
        user_id: Uuid::new_v4(),
        pickup_date: NaiveDate::from_ymd_opt(2024, 7, 5).unwrap(),
        return_date: NaiveDate::from_ymd_opt(2024, 7, 8).unwrap(),
        duration_days: 4,
        status: BookingStatus::Pending,
        total_price: dec!(1600),
        payment_method: PaymentMethod::Cash,
        accessories: Accessories::default(),
        payment_proof: None,
        admin_notes: None,
        created_at: now,
        updated_at: now,
    };
    app.store.import_booking(legacy.clone()).await;

    let (status, body) = app
        .json(
            "POST",
            &format!("/api/admin/bookings/{}/decision", legacy.id),
            &app.admin_token,
            json!({ "decision": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Cannot approve: conflicting booking");
    assert_eq!(body["details"]["conflicting_bookings"][0], booking_id.as_str());

    let (_, pending) = app
        .get("/api/admin/bookings?status=pending", &app.admin_token)
        .await;
    assert_eq!(pending[0]["id"], legacy.id.to_string());
}

#[tokio::test]
async fn test_customer_cancels_before_pickup() {
    let app = create_test_app();
    let vehicle_id = app.create_bike().await;

    let (_, body) = app.submit(&vehicle_id, "2024-07-01", "2024-07-02").await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();
    app.json(
        "POST",
        &format!("/api/admin/bookings/{booking_id}/decision"),
        &app.admin_token,
        json!({ "decision": "approve" }),
    )
    .await;

    let (status, body) = app
        .json(
            "POST",
            &format!("/api/bookings/{booking_id}/cancel"),
            &app.customer_token,
            json!({ "reason": "Trip postponed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "cancelled");

    let (_, vehicle) = app.get(&format!("/api/vehicles/{vehicle_id}"), &app.customer_token).await;
    assert_eq!(vehicle["status"], "available");

    let (status, mine) = app.get("/api/bookings?status=cancelled", &app.customer_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rejecting_twice_is_conflict() {
    let app = create_test_app();
    let vehicle_id = app.create_bike().await;
    let (_, body) = app.submit(&vehicle_id, "2024-07-01", "2024-07-02").await;
    let uri = format!("/api/admin/bookings/{}/decision", body["data"]["id"].as_str().unwrap());

    let (status, _) = app
        .json("POST", &uri, &app.admin_token, json!({ "decision": "reject", "notes": "Blurry proof" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .json("POST", &uri, &app.admin_token, json!({ "decision": "approve" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_ne!(body["message"], "Cannot approve: conflicting booking");
}
