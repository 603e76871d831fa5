use axum::http::StatusCode;
use counselbook_core::models::{
    actor::Actor,
    directory::{Counselor, User},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::test_utils::{admin, as_actor, TestContext};

#[test_log::test(tokio::test)]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    assert_eq!(health.json::<Value>()["status"], "ok");

    let version = ctx.server.get("/version").await.json::<Value>();
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
}

#[test_log::test(tokio::test)]
async fn test_counselor_directory() {
    let ctx = TestContext::new();
    let created = as_actor(ctx.server.post("/api/counselors"), admin())
        .json(&json!({ "name": "  Zoe Park ", "specialization": "Academic planning" }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let zoe = created.json::<Counselor>();
    assert_eq!(zoe.name, "Zoe Park");
    assert_eq!(zoe.specialization.as_deref(), Some("Academic planning"));
    ctx.seed_counselor("Amir Haddad").await;

    let listed = ctx.server.get("/api/counselors").await.json::<Vec<Counselor>>();
    let names: Vec<&str> = listed.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Amir Haddad", "Zoe Park"]);

    let fetched = ctx.server.get(&format!("/api/counselors/{}", zoe.id)).await;
    assert_eq!(fetched.json::<Counselor>(), zoe);

    let missing = ctx
        .server
        .get(&format!("/api/counselors/{}", Uuid::new_v4()))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_directory_writes_require_admin() {
    let ctx = TestContext::new();

    let counselor = as_actor(ctx.server.post("/api/counselors"), Actor::student(Uuid::new_v4()))
        .json(&json!({ "name": "Zoe Park" }))
        .await;
    assert_eq!(counselor.status_code(), StatusCode::FORBIDDEN);

    let user = as_actor(ctx.server.post("/api/users"), Actor::counselor(Uuid::new_v4()))
        .json(&json!({ "name": "Sam Lee", "email": "sam@example.edu" }))
        .await;
    assert_eq!(user.status_code(), StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn test_create_user() {
    let ctx = TestContext::new();

    let created = as_actor(ctx.server.post("/api/users"), admin())
        .json(&json!({ "name": "Sam Lee", "email": " Sam@Example.edu " }))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let user = created.json::<User>();
    assert_eq!(user.email, "sam@example.edu");

    let duplicate = as_actor(ctx.server.post("/api/users"), admin())
        .json(&json!({ "name": "Samuel Lee", "email": "sam@example.edu" }))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let blank = as_actor(ctx.server.post("/api/users"), admin())
        .json(&json!({ "name": " ", "email": "x@example.edu" }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    let bad_email = as_actor(ctx.server.post("/api/users"), admin())
        .json(&json!({ "name": "Sam", "email": "not-an-email" }))
        .await;
    assert_eq!(bad_email.status_code(), StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn test_directory_malformed_input() {
    let ctx = TestContext::new();

    let bad_id = ctx.server.get("/api/counselors/not-a-uuid").await;
    assert_eq!(bad_id.status_code(), StatusCode::BAD_REQUEST);
    assert!(bad_id.json::<Value>()["error"].is_string());

    let missing_email = as_actor(ctx.server.post("/api/users"), admin())
        .json(&json!({ "name": "Sam Lee" }))
        .await;
    assert_eq!(missing_email.status_code(), StatusCode::BAD_REQUEST);
    assert!(missing_email.json::<Value>()["error"].is_string());
}
