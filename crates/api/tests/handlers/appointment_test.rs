use axum::http::StatusCode;
use counselbook_core::{
    availability::CancelledSlotPolicy,
    errors::BookingError,
    models::{
        actor::Actor,
        appointment::{Appointment, AppointmentStatus, CounselorAppointment, StudentAppointment},
        slot::TimeSlot,
    },
};
use counselbook_db::mock::store::MockStore;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::test_utils::{admin, as_actor, server_for, TestContext};

async fn book(ctx: &TestContext, student: Uuid, counselor: Uuid, time: &str) -> axum_test::TestResponse {
    as_actor(ctx.server.post("/api/appointments"), Actor::student(student))
        .json(&json!({
            "counselor_id": counselor,
            "date": "2024-06-10",
            "time": time,
        }))
        .await
}

async fn set_status(
    ctx: &TestContext,
    actor: Actor,
    id: Uuid,
    status: &str,
) -> axum_test::TestResponse {
    as_actor(ctx.server.put(&format!("/api/appointments/{id}/status")), actor)
        .json(&json!({ "status": status }))
        .await
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_starts_pending() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let response = book(&ctx, student.id, counselor.id, "10:00 AM").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let appointment = response.json::<Appointment>();
    assert_eq!(appointment.student_id, student.id);
    assert_eq!(appointment.counselor_id, counselor.id);
    assert_eq!(appointment.time, TimeSlot::TenAm);
    assert_eq!(appointment.date.to_string(), "2024-06-10");
    assert_eq!(appointment.status, AppointmentStatus::Pending);
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_accepts_timestamp_date() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let response = as_actor(ctx.server.post("/api/appointments"), Actor::student(student.id))
        .json(&json!({
            "counselor_id": counselor.id,
            "date": "2024-06-10T15:30:00Z",
            "time": "2:00 PM",
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(response.json::<Appointment>().date.to_string(), "2024-06-10");
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_slot_taken() {
    let ctx = TestContext::new();
    let first = ctx.seed_student().await;
    let second = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    assert_eq!(
        book(&ctx, first.id, counselor.id, "10:00 AM").await.status_code(),
        StatusCode::CREATED
    );

    let response = book(&ctx, second.id, counselor.id, "10:00 AM").await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert!(body["error"].as_str().unwrap().starts_with("Conflict"));
}

#[test_log::test(tokio::test)]
async fn test_concurrent_bookings_for_same_slot() {
    let ctx = TestContext::new();
    let first = ctx.seed_student().await;
    let second = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let (a, b) = tokio::join!(
        book(&ctx, first.id, counselor.id, "11:00 AM"),
        book(&ctx, second.id, counselor.id, "11:00 AM"),
    );

    let mut codes = vec![a.status_code(), b.status_code()];
    codes.sort();
    assert_eq!(codes, vec![StatusCode::CREATED, StatusCode::CONFLICT]);

    let listing = as_actor(
        ctx.server.get(&format!("/api/counselors/{}/appointments", counselor.id)),
        Actor::counselor(counselor.id),
    )
    .await
    .json::<Vec<CounselorAppointment>>();
    assert_eq!(listing.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_missing_fields() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;

    let response = as_actor(ctx.server.post("/api/appointments"), Actor::student(student.id))
        .json(&json!({ "time": "10:00 AM" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Validation error: Missing required field(s): counselor_id, date"
    );
}

#[rstest]
#[case::unknown_label("10:30 AM", "2024-06-10")]
#[case::lunch_hour("12:00 PM", "2024-06-10")]
#[case::bad_date("10:00 AM", "June 10th")]
#[tokio::test]
async fn test_create_appointment_rejects_malformed_input(#[case] time: &str, #[case] date: &str) {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let response = as_actor(ctx.server.post("/api/appointments"), Actor::student(student.id))
        .json(&json!({ "counselor_id": counselor.id, "date": date, "time": time }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::counselor_not_uuid(json!({ "counselor_id": "not-a-uuid", "date": "2024-06-10", "time": "9:00 AM" }))]
#[case::date_not_string(json!({ "counselor_id": Uuid::new_v4(), "date": 20240610, "time": "9:00 AM" }))]
#[case::time_not_string(json!({ "counselor_id": Uuid::new_v4(), "date": "2024-06-10", "time": 9 }))]
#[case::lowercase_label(json!({ "counselor_id": Uuid::new_v4(), "date": "2024-06-10", "time": "9:00 am" }))]
#[tokio::test]
async fn test_create_appointment_wrongly_typed_body(#[case] body: Value) {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;

    let response = as_actor(ctx.server.post("/api/appointments"), Actor::student(student.id))
        .json(&body)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Validation error"), "{error}");
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_unknown_counselor() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;

    let response = book(&ctx, student.id, Uuid::new_v4(), "10:00 AM").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_unknown_student() {
    let ctx = TestContext::new();
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let response = book(&ctx, Uuid::new_v4(), counselor.id, "10:00 AM").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_requires_student_role() {
    let ctx = TestContext::new();
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let response = as_actor(ctx.server.post("/api/appointments"), Actor::counselor(counselor.id))
        .json(&json!({ "counselor_id": counselor.id, "date": "2024-06-10", "time": "9:00 AM" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn test_create_appointment_without_identity() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&json!({ "counselor_id": Uuid::new_v4(), "date": "2024-06-10", "time": "9:00 AM" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn test_get_appointment_visibility() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let stranger = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "1:00 PM").await.json::<Appointment>();
    let path = format!("/api/appointments/{}", created.id);

    let own = as_actor(ctx.server.get(&path), Actor::student(student.id)).await;
    assert_eq!(own.status_code(), StatusCode::OK);
    assert_eq!(own.json::<Appointment>(), created);

    let theirs = as_actor(ctx.server.get(&path), Actor::counselor(counselor.id)).await;
    assert_eq!(theirs.status_code(), StatusCode::OK);

    let other = as_actor(ctx.server.get(&path), Actor::student(stranger.id)).await;
    assert_eq!(other.status_code(), StatusCode::FORBIDDEN);

    let missing = as_actor(
        ctx.server.get(&format!("/api/appointments/{}", Uuid::new_v4())),
        admin(),
    )
    .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_full_lifecycle() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "3:00 PM").await.json::<Appointment>();

    let confirmed = set_status(&ctx, Actor::counselor(counselor.id), created.id, "Confirmed").await;
    assert_eq!(confirmed.status_code(), StatusCode::OK);
    assert_eq!(confirmed.json::<Appointment>().status, AppointmentStatus::Confirmed);

    let listing = as_actor(
        ctx.server.get(&format!("/api/counselors/{}/appointments", counselor.id)),
        Actor::counselor(counselor.id),
    )
    .await
    .json::<Vec<CounselorAppointment>>();
    assert_eq!(listing[0].appointment.status, AppointmentStatus::Confirmed);

    let completed = set_status(&ctx, Actor::counselor(counselor.id), created.id, "Completed").await;
    assert_eq!(completed.status_code(), StatusCode::OK);
    let completed = completed.json::<Appointment>();
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert!(completed.updated_at >= created.updated_at);

    let reopened = set_status(&ctx, admin(), created.id, "Cancelled").await;
    assert_eq!(reopened.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_log::test(tokio::test)]
async fn test_status_update_guards() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "4:00 PM").await.json::<Appointment>();

    // Pending cannot skip straight to Completed.
    let skipped = set_status(&ctx, Actor::counselor(counselor.id), created.id, "Completed").await;
    assert_eq!(skipped.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    // Students cannot confirm their own booking.
    let self_confirm = set_status(&ctx, Actor::student(student.id), created.id, "Confirmed").await;
    assert_eq!(self_confirm.status_code(), StatusCode::FORBIDDEN);

    let unknown = set_status(&ctx, Actor::counselor(counselor.id), created.id, "Rescheduled").await;
    assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);

    let missing = as_actor(
        ctx.server.put(&format!("/api/appointments/{}/status", created.id)),
        Actor::counselor(counselor.id),
    )
    .json(&json!({}))
    .await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let cancelled = set_status(&ctx, Actor::student(student.id), created.id, "Cancelled").await;
    assert_eq!(cancelled.status_code(), StatusCode::OK);
    assert_eq!(cancelled.json::<Appointment>().status, AppointmentStatus::Cancelled);

    let after_cancel = set_status(&ctx, Actor::counselor(counselor.id), created.id, "Confirmed").await;
    assert_eq!(after_cancel.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test_log::test(tokio::test)]
async fn test_status_update_malformed_input() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "4:00 PM").await.json::<Appointment>();

    let numeric = as_actor(
        ctx.server.put(&format!("/api/appointments/{}/status", created.id)),
        Actor::counselor(counselor.id),
    )
    .json(&json!({ "status": 5 }))
    .await;
    assert_eq!(numeric.status_code(), StatusCode::BAD_REQUEST);
    assert!(numeric.json::<Value>()["error"].is_string());

    let lowercase = set_status(&ctx, Actor::counselor(counselor.id), created.id, "confirmed").await;
    assert_eq!(lowercase.status_code(), StatusCode::BAD_REQUEST);

    let bad_id = as_actor(ctx.server.put("/api/appointments/xyz/status"), admin())
        .json(&json!({ "status": "Confirmed" }))
        .await;
    assert_eq!(bad_id.status_code(), StatusCode::BAD_REQUEST);
    assert!(bad_id.json::<Value>()["error"].is_string());

    let bad_listing = as_actor(ctx.server.get("/api/students/xyz/appointments"), admin()).await;
    assert_eq!(bad_listing.status_code(), StatusCode::BAD_REQUEST);
    assert!(bad_listing.json::<Value>()["error"].is_string());
}

#[test_log::test(tokio::test)]
async fn test_cancelled_slot_stays_taken_by_default() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let other = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "9:00 AM").await.json::<Appointment>();
    set_status(&ctx, Actor::student(student.id), created.id, "Cancelled").await;

    let response = book(&ctx, other.id, counselor.id, "9:00 AM").await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_cancelled_slot_can_be_rebooked_when_released() {
    let ctx = TestContext::with_policy(CancelledSlotPolicy::Release);
    let student = ctx.seed_student().await;
    let other = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "9:00 AM").await.json::<Appointment>();
    set_status(&ctx, Actor::student(student.id), created.id, "Cancelled").await;

    let response = book(&ctx, other.id, counselor.id, "9:00 AM").await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[test_log::test(tokio::test)]
async fn test_listings_carry_party_names() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;
    let created = book(&ctx, student.id, counselor.id, "10:00 AM").await.json::<Appointment>();

    let mine = as_actor(
        ctx.server.get(&format!("/api/students/{}/appointments", student.id)),
        Actor::student(student.id),
    )
    .await;
    assert_eq!(mine.status_code(), StatusCode::OK);
    let mine = mine.json::<Vec<StudentAppointment>>();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].appointment.id, created.id);
    assert_eq!(mine[0].counselor_name, "Dana Whitfield");

    let theirs = as_actor(
        ctx.server.get(&format!("/api/counselors/{}/appointments", counselor.id)),
        Actor::counselor(counselor.id),
    )
    .await
    .json::<Vec<CounselorAppointment>>();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].student_name, student.name);
}

#[test_log::test(tokio::test)]
async fn test_listings_are_restricted_to_owner() {
    let ctx = TestContext::new();
    let student = ctx.seed_student().await;
    let counselor = ctx.seed_counselor("Dana Whitfield").await;

    let peek = as_actor(
        ctx.server.get(&format!("/api/students/{}/appointments", student.id)),
        Actor::counselor(counselor.id),
    )
    .await;
    assert_eq!(peek.status_code(), StatusCode::FORBIDDEN);

    let other_counselor = as_actor(
        ctx.server.get(&format!("/api/counselors/{}/appointments", counselor.id)),
        Actor::counselor(Uuid::new_v4()),
    )
    .await;
    assert_eq!(other_counselor.status_code(), StatusCode::FORBIDDEN);

    let empty = as_actor(
        ctx.server.get(&format!("/api/students/{}/appointments", student.id)),
        admin(),
    )
    .await;
    assert_eq!(empty.status_code(), StatusCode::OK);
    assert_eq!(empty.json::<Vec<StudentAppointment>>(), vec![]);
}

#[test_log::test(tokio::test)]
async fn test_status_update_unknown_appointment_writes_nothing() {
    let mut store = MockStore::new();
    store.expect_get_appointment().returning(|_| Ok(None));
    store.expect_update_appointment_status().never();
    let server = server_for(Arc::new(store), CancelledSlotPolicy::default());

    let response = as_actor(
        server.put(&format!("/api/appointments/{}/status", Uuid::new_v4())),
        admin(),
    )
    .json(&json!({ "status": "Confirmed" }))
    .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_status_update_lost_race_is_conflict() {
    let id = Uuid::new_v4();
    let counselor_id = Uuid::new_v4();
    let now = chrono::Utc::now();
    let current = Appointment {
        id,
        student_id: Uuid::new_v4(),
        counselor_id,
        date: "2024-06-10".parse().unwrap(),
        time: TimeSlot::NineAm,
        status: AppointmentStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    let mut store = MockStore::new();
    store
        .expect_get_appointment()
        .returning(move |_| Ok(Some(current.clone())));
    store
        .expect_update_appointment_status()
        .withf(move |got, expected, next| {
            *got == id
                && *expected == AppointmentStatus::Pending
                && *next == AppointmentStatus::Confirmed
        })
        .times(1)
        .returning(|_, _, _| Ok(None));
    let server = server_for(Arc::new(store), CancelledSlotPolicy::default());

    let response = as_actor(
        server.put(&format!("/api/appointments/{id}/status")),
        Actor::counselor(counselor_id),
    )
    .json(&json!({ "status": "Confirmed" }))
    .await;

    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn test_store_failure_hides_details() {
    let mut store = MockStore::new();
    store
        .expect_get_counselor()
        .returning(|_| Err(BookingError::Database(eyre::eyre!("connection reset by peer"))));
    let server = server_for(Arc::new(store), CancelledSlotPolicy::default());

    let response = as_actor(server.post("/api/appointments"), Actor::student(Uuid::new_v4()))
        .json(&json!({ "counselor_id": Uuid::new_v4(), "date": "2024-06-10", "time": "9:00 AM" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), json!({ "error": "Internal server error" }));
}
