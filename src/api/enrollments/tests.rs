use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn enroll_is_idempotent_and_listed_newest_first() {
    let ctx = test_support::setup_test_context().await;
    let first = test_support::insert_course(ctx.state.db(), "Statistics").await;
    let second = test_support::insert_course(ctx.state.db(), "Calculus").await;
    let token = test_support::bearer_token("student-1", ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": first })),
        ))
        .await
        .expect("enroll");
    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["status"], "studying");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": first })),
        ))
        .await
        .expect("enroll again");
    let status = response.status();
    let repeated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {repeated}");
    assert_eq!(repeated["id"], created["id"]);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": second })),
        ))
        .await
        .expect("enroll second");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/v1/enrollments",
            Some(&token),
            None,
        ))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let listed = test_support::read_json(response).await;
    let courses: Vec<&str> = listed
        .as_array()
        .expect("list body")
        .iter()
        .map(|item| item["course_id"].as_str().unwrap())
        .collect();
    assert_eq!(courses, vec![second.as_str(), first.as_str()]);

    let roots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM progress_roots")
        .fetch_one(ctx.state.db())
        .await
        .expect("count roots");
    assert_eq!(roots, 0);
}

#[tokio::test]
async fn status_update_and_unenroll() {
    let ctx = test_support::setup_test_context().await;
    let course = test_support::insert_course(ctx.state.db(), "Economics").await;
    let token = test_support::bearer_token("student-2", ctx.state.settings());
    let item_uri = format!("/api/v1/enrollments/{course}");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &item_uri,
            Some(&token),
            None,
        ))
        .await
        .expect("get missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": course })),
        ))
        .await
        .expect("enroll");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &item_uri,
            Some(&token),
            Some(json!({ "status": "completed" })),
        ))
        .await
        .expect("update");
    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["status"], "completed");

    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::DELETE,
                &item_uri,
                Some(&token),
                None,
            ))
            .await
            .expect("unenroll");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &item_uri,
            Some(&token),
            Some(json!({ "status": "studying" })),
        ))
        .await
        .expect("update missing");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &item_uri,
            Some(&token),
            Some(json!({ "status": "paused" })),
        ))
        .await
        .expect("update with unknown status");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = test_support::read_json(response).await;
    assert_eq!(body["kind"], "bad_request");
}

#[tokio::test]
async fn enrolling_in_unknown_course_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let token = test_support::bearer_token("student-3", ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": "no-such-course" })),
        ))
        .await
        .expect("enroll");
    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "response: {body}");
    assert_eq!(body["kind"], "not_found");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": "" })),
        ))
        .await
        .expect("enroll empty");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
