mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{multipart_fields, test_app, token_for, API_SECRET};

const GALA: &[(&str, &str)] = &[
    ("title", "Gala"),
    ("isMultipleDay", "false"),
    ("date", "2025-12-31"),
    ("totalTickets", "0"),
];

#[tokio::test]
async fn gala_lifecycle_from_draft_to_sold_out() {
    let app = test_app();

    let created = app.post_form("/api/events", &GALA, true).await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.body["success"], true);
    let event = &created.body["event"];
    assert_eq!(event["id"], 1);
    assert_eq!(event["title"], "Gala");
    assert_eq!(event["published"], false);
    assert_eq!(event["date"], "2025-12-31T00:00:00");
    assert!(event["startDate"].is_null());

    // черновик на витрине не виден
    let listed = app.get("/api/events", false).await;
    assert_eq!(listed.body, json!([]));

    let toggled = app.patch("/api/event/1", true).await;
    assert_eq!(toggled.status, StatusCode::OK);
    assert_eq!(toggled.body["event"]["published"], true);

    let listed = app.get("/api/events", false).await;
    let listed = listed.body.as_array().expect("array");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Gala");
    assert!(listed[0].get("totalTickets").is_none());
    assert!(listed[0].get("published").is_none());

    let booking = app
        .post_form(
            "/api/bookings",
            &[
                ("eventId", "1"),
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("tickets", "1"),
            ],
            false,
        )
        .await;
    assert_eq!(booking.status, StatusCode::OK);
    assert_eq!(
        booking.body,
        json!({ "success": false, "message": "Not enough tickets available" })
    );
}

#[tokio::test]
async fn multiple_day_event_keeps_only_range_dates() {
    let app = test_app();
    let created = app
        .post_form(
            "/api/events",
            &[
                ("title", "Festival"),
                ("isMultipleDay", "true"),
                ("date", "2025-01-01"),
                ("startDate", "2025-06-01T15:30:00.000Z"),
                ("endDate", "2025-06-03"),
                ("place", "Riverside"),
            ],
            true,
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let event = &created.body["event"];
    assert_eq!(event["isMultipleDay"], true);
    assert!(event["date"].is_null());
    assert_eq!(event["startDate"], "2025-06-01T00:00:00");
    assert_eq!(event["endDate"], "2025-06-03T00:00:00");
    assert_eq!(event["place"], "Riverside");
}

#[tokio::test]
async fn create_accepts_multipart_form_data() {
    let app = test_app();
    let created = app
        .post_multipart(
            "/api/events",
            multipart_fields(&[
                ("title", "Gala"),
                ("isMultipleDay", "false"),
                ("date", "2025-12-31"),
                ("place", "City Hall"),
                ("totalTickets", "120"),
            ]),
            true,
        )
        .await;
    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    let event = &created.body["event"];
    assert_eq!(event["title"], "Gala");
    assert_eq!(event["place"], "City Hall");
    assert_eq!(event["date"], "2025-12-31T00:00:00");
    assert_eq!(event["totalTickets"], 120);

    // та же валидация, что и для urlencoded
    let blank = app
        .post_multipart(
            "/api/events",
            multipart_fields(&[("title", " "), ("date", "2025-12-31")]),
            true,
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "Title is required");
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = test_app();
    let response = app
        .post_form(
            "/api/events",
            &[("title", "   "), ("date", "2025-12-31")],
            true,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "Title is required");
}

#[tokio::test]
async fn invalid_date_is_rejected_without_write() {
    let app = test_app();
    let response = app
        .post_form(
            "/api/events",
            &[("title", "Gala"), ("date", "31/12/2025")],
            true,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid date format");

    let all = app.get("/api/admin/events", true).await;
    assert_eq!(all.body, json!([]));
}

#[tokio::test]
async fn missing_dates_are_rejected() {
    let app = test_app();

    let single = app
        .post_form("/api/events", &[("title", "Gala")], true)
        .await;
    assert_eq!(single.body["error"], "Date is required for single day events");

    let multi = app
        .post_form(
            "/api/events",
            &[
                ("title", "Festival"),
                ("isMultipleDay", "true"),
                ("startDate", "2025-06-01"),
            ],
            true,
        )
        .await;
    assert_eq!(
        multi.body["error"],
        "Start date and end date are required for multiple day events"
    );
}

#[tokio::test]
async fn negative_capacity_is_rejected() {
    let app = test_app();
    let response = app
        .post_form(
            "/api/events",
            &[("title", "Gala"), ("date", "2025-12-31"), ("totalTickets", "-1")],
            true,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["error"],
        "Total tickets must be a non-negative number"
    );
}

#[tokio::test]
async fn admin_routes_require_session_token() {
    let app = test_app();

    // невалидное тело, но 401 приходит раньше валидации
    let response = app.post_form("/api/events", &[("title", "")], false).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);

    assert_eq!(
        app.get("/api/admin/events", false).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(app.patch("/api/event/1", false).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.delete("/api/event/1", false).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        app.put_json("/api/event/1", &json!({}), false).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn tokens_for_other_shops_or_secrets_are_rejected() {
    let app = test_app();
    for token in [
        token_for("https://someone-else.myshopify.com", API_SECRET),
        token_for(&format!("https://{}", common::SHOP), "forged-secret"),
    ] {
        let response = app
            .send(
                axum::http::Request::builder()
                    .uri("/api/admin/events")
                    .header("Authorization", format!("Bearer {token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn toggle_twice_restores_published_flag() {
    let app = test_app();
    let id = app.create_event(GALA).await;
    let uri = format!("/api/event/{id}");

    assert_eq!(app.patch(&uri, true).await.body["event"]["published"], true);
    assert_eq!(app.patch(&uri, true).await.body["event"]["published"], false);
    assert_eq!(app.get("/api/events", false).await.body, json!([]));
}

#[tokio::test]
async fn storefront_lists_only_published_events() {
    let app = test_app();
    let draft = app.create_event(GALA).await;
    let live = app
        .create_event(&[("title", "Concert"), ("date", "2026-02-14")])
        .await;
    app.patch(&format!("/api/event/{live}"), true).await;

    let listed = app.get("/api/events", false).await;
    let ids: Vec<i64> = listed
        .body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|e| e["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![live]);

    let all = app.get("/api/admin/events", true).await;
    assert_eq!(all.body.as_array().map(Vec::len), Some(2));
    assert_ne!(draft, live);
}

#[tokio::test]
async fn update_overwrites_fields_and_keeps_capacity() {
    let app = test_app();
    let id = app
        .create_event(&[("title", "Gala"), ("date", "2025-12-31"), ("totalTickets", "50")])
        .await;

    let updated = app
        .put_json(
            &format!("/api/event/{id}"),
            &json!({
                "title": "Winter Gala",
                "isMultipleDay": true,
                "date": "2025-12-31",
                "startDate": "2025-12-30",
                "endDate": "2026-01-01",
                "tag": "party"
            }),
            true,
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    let event = &updated.body["event"];
    assert_eq!(event["title"], "Winter Gala");
    assert!(event["date"].is_null());
    assert_eq!(event["startDate"], "2025-12-30T00:00:00");
    assert_eq!(event["tag"], "party");
    assert_eq!(event["totalTickets"], 50);

    let fetched = app.get(&format!("/api/event/{id}"), true).await;
    assert_eq!(fetched.body["event"]["title"], "Winter Gala");
}

#[tokio::test]
async fn update_validates_like_create() {
    let app = test_app();
    let id = app.create_event(GALA).await;

    let response = app
        .put_json(
            &format!("/api/event/{id}"),
            &json!({ "title": "Gala", "isMultipleDay": true }),
            true,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .put_json(&format!("/api/event/{id}"), &json!("not an object"), true)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid request body");

    let fetched = app.get(&format!("/api/event/{id}"), true).await;
    assert_eq!(fetched.body["event"]["isMultipleDay"], false);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let app = test_app();
    let body = json!({ "title": "Gala", "date": "2025-12-31" });

    for response in [
        app.get("/api/event/404", true).await,
        app.put_json("/api/event/404", &body, true).await,
        app.patch("/api/event/404", true).await,
        app.delete("/api/event/404", true).await,
    ] {
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.body["error"], "Event not found");
    }
}

#[tokio::test]
async fn delete_removes_event_from_all_listings() {
    let app = test_app();
    let id = app.create_event(GALA).await;
    app.patch(&format!("/api/event/{id}"), true).await;

    let deleted = app.delete(&format!("/api/event/{id}"), true).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body, json!({ "success": true }));

    assert_eq!(app.get("/api/events", false).await.body, json!([]));
    assert_eq!(app.get("/api/admin/events", true).await.body, json!([]));
    assert_eq!(
        app.get(&format!("/api/event/{id}"), true).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn service_banner_and_health() {
    let app = test_app();
    let root = app.get("/", false).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body, json!("Storefront Events API v1.0"));

    assert_eq!(app.get("/health", false).await.status, StatusCode::OK);
}
