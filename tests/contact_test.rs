mod common;

use serde_json::{json, Value};

async fn submit(app: &common::TestApp, body: Value) -> (u16, Value) {
    let resp = app
        .client
        .post(app.url("/contact"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn message(subject: &str) -> Value {
    json!({
        "name": "Jordan",
        "email": "jordan@example.org",
        "subject": subject,
        "message": "I would like to volunteer on weekends."
    })
}

#[tokio::test]
async fn public_can_submit_contact_form() {
    let app = common::spawn_app().await;

    let (status, body) = submit(&app, message("Volunteering")).await;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["status"], "UNREAD");
    assert_eq!(body["data"]["subject"], "Volunteering");
}

#[tokio::test]
async fn contact_form_is_validated() {
    let app = common::spawn_app().await;

    let mut bad_email = message("Hello");
    bad_email["email"] = json!("jordan-at-example");
    let (status, body) = submit(&app, bad_email).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "A valid email is required");

    let (status, body) = submit(&app, message("   ")).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Subject is required");

    let admin = common::admin(&app).await;
    let (_, body) = common::get(&app, "/contact", Some(&admin)).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn inbox_is_staff_only() {
    let app = common::spawn_app().await;
    let visitor = common::visitor(&app).await;

    let (status, _) = common::get(&app, "/contact", None).await;
    assert_eq!(status, 401);

    let (status, body) = common::get(&app, "/contact", Some(&visitor)).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Forbidden: Insufficient permissions");
}

#[tokio::test]
async fn staff_triage_messages() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;
    let admin = common::admin(&app).await;

    let (_, first) = submit(&app, message("Volunteering")).await;
    submit(&app, message("Donations")).await;
    let id = first["data"]["id"].as_i64().unwrap();

    let (status, body) = common::get(&app, &format!("/contact/{}", id), Some(&editor)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["subject"], "Volunteering");

    let resp = app
        .client
        .put(app.url(&format!("/contact/{}", id)))
        .bearer_auth(&editor)
        .json(&json!({ "status": "responded" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "RESPONDED");

    let resp = app
        .client
        .put(app.url(&format!("/contact/{}", id)))
        .bearer_auth(&editor)
        .json(&json!({ "status": "ARCHIVED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let (_, body) = common::get(&app, "/contact?status=UNREAD", Some(&editor)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["subject"], "Donations");

    let (_, body) = common::get(&app, "/contact?search=donat", Some(&editor)).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = common::get(&app, "/admin/stats", Some(&editor)).await;
    assert_eq!(body["data"]["unread_messages"], 1);

    let resp = app
        .client
        .delete(app.url(&format!("/contact/{}", id)))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden: Only admins can delete messages");

    let resp = app
        .client
        .delete(app.url(&format!("/contact/{}", id)))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, body) = common::get(&app, &format!("/contact/{}", id), Some(&admin)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Message not found");
}
