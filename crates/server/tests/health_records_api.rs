use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use service::auth::{domain::Claims, TokenCodec};
use service::model::{HealthRecord, Pet, Role, User};
use service::storage::{MemoryRecordStore, RecordStore};
use server::routes::{self, ServerState};

const SECRET: &str = "test-secret";

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn build_app() -> (Router, Arc<MemoryRecordStore>) {
    let users = vec![
        User::new("admin1", "Admin", "admin@example.com", "password", Role::Admin),
        User::new("user1", "Alice", "alice@example.com", "password", Role::User),
        User::new("user2", "Bob", "bob@example.com", "password", Role::User),
    ];
    let mut rex = Pet::new("pet1", "user1", "Rex", "dog", Some(4), "labrador");
    rex.medical_history.push(HealthRecord {
        id: "r1".into(),
        description: Some("annual checkup".into()),
        vet: Some("Dr. Moss".into()),
        ..Default::default()
    });
    let tom = Pet::new("pet2", "user2", "Tom", "cat", Some(2), "tabby");
    let store = Arc::new(MemoryRecordStore::with_data(users, vec![rex, tom]));

    let state = ServerState::new(store.clone(), TokenCodec::new(SECRET, 3600));
    (routes::build_router(state, cors()), store)
}

fn bearer(user_id: &str) -> String {
    let user = User::new(user_id, "", "", "", Role::User);
    format!("Bearer {}", TokenCodec::new(SECRET, 3600).issue(&user).unwrap().0)
}

fn request(method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(a) = auth {
        builder = builder.header("authorization", a);
    }
    match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let (app, _) = build_app();
    let (status, body) = send(&app, request("GET", "/health", None, None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn issue_token_then_use_it() -> anyhow::Result<()> {
    let (app, _) = build_app();
    let (status, body) = send(
        &app,
        request("POST", "/auth/token", None, Some(json!({"email": "alice@example.com", "password": "password"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], "user1");
    let token = body["token"].as_str().unwrap_or_default().to_string();

    let auth = format!("Bearer {token}");
    let (status, body) = send(&app, request("GET", "/pets/pet1/health-records", Some(&auth), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["_id"], "r1");
    Ok(())
}

#[tokio::test]
async fn issue_token_wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let (app, _) = build_app();
    let (status, body) = send(
        &app,
        request("POST", "/auth/token", None, Some(json!({"email": "alice@example.com", "password": "wrong"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn missing_and_expired_credentials_are_401() -> anyhow::Result<()> {
    let (app, _) = build_app();
    let (status, body) = send(&app, request("GET", "/pets/pet1/health-records", None, None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized: missing or invalid token");

    let claims = Claims {
        user_id: Some("user1".into()),
        sub: None,
        role: None,
        iat: None,
        exp: chrono::Utc::now().timestamp() - 60,
    };
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )?;
    let auth = format!("Bearer {expired}");
    let (status, _) = send(&app, request("GET", "/pets/pet1/health-records", Some(&auth), None)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn rabies_vaccination_round_trip() -> anyhow::Result<()> {
    let (app, store) = build_app();
    let alice = bearer("user1");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/pets/pet1/health-records",
            Some(&alice),
            Some(json!({"vaccine": "rabies", "dateAdministered": "2024-01-01"})),
        ),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Health record added successfully");
    let record = body["healthRecord"].clone();
    let id = record["_id"].as_str().unwrap_or_default().to_string();
    assert!(id.starts_with("rec_"));
    assert_eq!(record["vaccine"], "rabies");
    assert_eq!(record["dateAdministered"], "2024-01-01T00:00:00.000Z");
    assert_eq!(record["nextDueDate"], Value::Null);

    let (status, list) = send(&app, request("GET", "/pets/pet1/health-records", Some(&alice), None)).await?;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 2);
    assert_eq!(list.iter().filter(|r| r["_id"] == id.as_str()).count(), 1);
    assert_eq!(list[1], record);

    let (status, fetched) = send(&app, request("GET", &format!("/pets/pet1/health-records/{id}"), Some(&alice), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, record);

    assert_eq!(store.pet_saves(), 1);
    Ok(())
}

#[tokio::test]
async fn other_users_pet_is_404_on_read_and_403_on_write() -> anyhow::Result<()> {
    let (app, store) = build_app();
    let alice = bearer("user1");

    let (status, body) = send(&app, request("GET", "/pets/pet2/health-records/anything", Some(&alice), None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Pet not found or access denied");

    let (status, _) = send(&app, request("POST", "/pets/pet2/health-records", Some(&alice), Some(json!({"vet": "x"})))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("DELETE", "/pets/ghost/health-records/r1", Some(&alice), None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Pet not found");

    assert_eq!(store.pet_saves(), 0);
    Ok(())
}

#[tokio::test]
async fn admin_updates_and_deletes_any_record() -> anyhow::Result<()> {
    let (app, store) = build_app();
    let admin = bearer("admin1");

    let (status, body) = send(
        &app,
        request("PATCH", "/pets/pet1/health-records/r1", Some(&admin), Some(json!({"vet": null, "nextDueDate": "2025-06-01"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Health record updated successfully");
    assert_eq!(body["healthRecord"]["vet"], Value::Null);
    assert_eq!(body["healthRecord"]["description"], "annual checkup");
    assert_eq!(body["healthRecord"]["nextDueDate"], "2025-06-01T00:00:00.000Z");
    assert_eq!(store.load_pets().await?[0].medical_history[0].vet, None);

    let (status, body) = send(&app, request("DELETE", "/pets/pet1/health-records/r1", Some(&admin), None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Health record deleted successfully"}));

    let (status, body) = send(&app, request("DELETE", "/pets/pet1/health-records/r1", Some(&admin), None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Health record not found");
    Ok(())
}

#[tokio::test]
async fn invalid_date_is_400() -> anyhow::Result<()> {
    let (app, _) = build_app();
    let alice = bearer("user1");
    let (status, body) = send(
        &app,
        request("PUT", "/pets/pet1/health-records/r1", Some(&alice), Some(json!({"dateAdministered": "yesterday"}))),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation Error");
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_get_the_json_error_shape() -> anyhow::Result<()> {
    let (app, store) = build_app();
    let alice = bearer("user1");

    let (status, body) = send(
        &app,
        request("POST", "/pets/pet1/health-records", Some(&alice), Some(json!({"description": 5}))),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Invalid Request Body");
    assert_eq!(body["code"], 3001);
    assert!(body["message"].is_string());

    let broken = Request::builder()
        .method("PATCH")
        .uri("/pets/pet1/health-records/r1")
        .header("authorization", alice.as_str())
        .header("content-type", "application/json")
        .body(Body::from("{\"vet\": "))?;
    let (status, body) = send(&app, broken).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid Request Body");

    let (status, body) = send(&app, request("POST", "/auth/token", None, Some(json!({"email": "a@example.com"})))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 3001);

    assert_eq!(store.pet_saves(), 0);
    Ok(())
}
