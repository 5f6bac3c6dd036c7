mod common;

use serde_json::{json, Value};

async fn post(app: &common::TestApp, path: &str, body: Value) -> (u16, Value) {
    let resp = app
        .client
        .post(app.url(path))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn subscribe_unsubscribe_and_return() {
    let app = common::spawn_app().await;

    let (status, body) = post(
        &app,
        "/newsletter",
        json!({ "email": "Reader@Example.org", "name": "Reader" }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["email"], "reader@example.org");
    assert_eq!(body["data"]["status"], "ACTIVE");

    let (status, body) = post(&app, "/newsletter", json!({ "email": "reader@example.org" })).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "This email is already subscribed");

    let (status, body) = post(
        &app,
        "/newsletter/unsubscribe",
        json!({ "email": "READER@example.org" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "UNSUBSCRIBED");
    assert!(body["data"]["unsubscribed_at"].is_string());

    let (status, body) = post(&app, "/newsletter", json!({ "email": "reader@example.org" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "ACTIVE");
    assert!(body["data"]["unsubscribed_at"].is_null());
    assert_eq!(body["data"]["name"], "Reader");
}

#[tokio::test]
async fn unknown_email_cannot_unsubscribe() {
    let app = common::spawn_app().await;

    let (status, body) = post(
        &app,
        "/newsletter/unsubscribe",
        json!({ "email": "ghost@example.org" }),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Subscriber not found");

    let (status, _) = post(&app, "/newsletter", json!({ "email": "not-an-email" })).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn staff_list_and_admin_delete_subscribers() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    let editor = common::editor(&app).await;

    let (_, first) = post(&app, "/newsletter", json!({ "email": "one@example.org" })).await;
    post(&app, "/newsletter", json!({ "email": "two@example.org" })).await;
    post(&app, "/newsletter/unsubscribe", json!({ "email": "two@example.org" })).await;

    let (status, _) = common::get(&app, "/newsletter", None).await;
    assert_eq!(status, 401);

    let (status, body) = common::get(&app, "/newsletter", Some(&editor)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = common::get(&app, "/newsletter?status=ACTIVE", Some(&editor)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["email"], "one@example.org");

    let (_, body) = common::get(&app, "/newsletter?search=two", Some(&editor)).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = common::get(&app, "/admin/stats", Some(&admin)).await;
    assert_eq!(body["data"]["active_subscribers"], 1);

    let id = first["data"]["id"].as_i64().unwrap();
    let resp = app
        .client
        .delete(app.url(&format!("/newsletter/{}", id)))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden: Only admins can delete subscribers");

    let resp = app
        .client
        .delete(app.url(&format!("/newsletter/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .delete(app.url(&format!("/newsletter/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
