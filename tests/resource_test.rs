mod common;

use serde_json::{json, Value};

fn guide() -> Value {
    json!({
        "title": "Guide",
        "slug": "guide",
        "category": "EDUCATION",
        "type": "PDF",
        "description": "..."
    })
}

async fn download(app: &common::TestApp, slug: &str, token: Option<&str>) -> (u16, Value) {
    let mut req = app
        .client
        .post(app.url(&format!("/resources/{}/download", slug)));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn create_then_get_resource() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;

    let created = common::create_as(&app, &admin, "/resources", guide()).await;
    assert_eq!(created["slug"], "guide");
    assert_eq!(created["category"], "EDUCATION");
    assert_eq!(created["type"], "PDF");
    assert_eq!(created["downloads"], 0);

    assert_eq!(created["published"], true);

    let (status, body) = common::get(&app, "/resources/guide", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["title"], "Guide");
}

#[tokio::test]
async fn second_create_with_same_slug_fails() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;

    common::create_as(&app, &admin, "/resources", guide()).await;

    let resp = app
        .client
        .post(app.url("/resources"))
        .bearer_auth(&admin)
        .json(&guide())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "A resource with this slug already exists");

    let (_, body) = common::get(&app, "/resources", Some(&admin)).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn enum_fields_are_validated() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let mut bad_category = guide();
    bad_category["category"] = json!("SPORTS");
    let resp = app
        .client
        .post(app.url("/resources"))
        .bearer_auth(&editor)
        .json(&bad_category)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let mut missing_type = guide();
    missing_type.as_object_mut().unwrap().remove("type");
    let resp = app
        .client
        .post(app.url("/resources"))
        .bearer_auth(&editor)
        .json(&missing_type)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Type is required");

    let (status, _) = common::get(&app, "/resources?category=SPORTS", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn link_resources_need_a_url() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let resp = app
        .client
        .post(app.url("/resources"))
        .bearer_auth(&editor)
        .json(&json!({
            "title": "Hotline Directory",
            "category": "COMMUNITY",
            "type": "LINK",
            "description": "Numbers to call"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "URL is required for LINK resources");

    let created = common::create_as(
        &app,
        &editor,
        "/resources",
        json!({
            "title": "Hotline Directory",
            "category": "COMMUNITY",
            "type": "LINK",
            "url": "https://hotlines.example.org",
            "description": "Numbers to call",
            "published": true
        }),
    )
    .await;
    assert_eq!(created["slug"], "hotline-directory");
}

#[tokio::test]
async fn download_counts_and_returns_target() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    common::create_as(
        &app,
        &editor,
        "/resources",
        json!({
            "title": "Know Your Rights",
            "category": "LEGAL",
            "type": "PDF",
            "file_url": "/uploads/files/rights.pdf",
            "description": "A printable guide",
            "published": true
        }),
    )
    .await;

    for expected in 1..=3 {
        let (status, body) = download(&app, "know-your-rights", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["data"]["downloads"], expected);
        assert_eq!(body["data"]["url"], "/uploads/files/rights.pdf");
    }

    let (_, body) = common::get(&app, "/resources/know-your-rights", None).await;
    assert_eq!(body["data"]["downloads"], 3);

    let (status, body) = download(&app, "missing", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Resource not found");
}

#[tokio::test]
async fn draft_resources_are_hidden() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let mut draft = guide();
    draft["published"] = json!(false);
    common::create_as(&app, &editor, "/resources", draft).await;

    let (status, _) = common::get(&app, "/resources/guide", None).await;
    assert_eq!(status, 404);
    let (status, _) = download(&app, "guide", None).await;
    assert_eq!(status, 404);
    let (status, _) = download(&app, "guide", Some(&editor)).await;
    assert_eq!(status, 200);

    let (_, body) = common::get(&app, "/resources", None).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn list_filters_by_category_type_and_tag() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;
    let toolkit_tag = common::create_tag(&app, &editor, "Toolkits").await;

    common::create_as(
        &app,
        &editor,
        "/resources",
        json!({
            "title": "Organizer Toolkit",
            "category": "ADVOCACY",
            "type": "TOOLKIT",
            "description": "Everything to start a campaign",
            "published": true,
            "tags": [toolkit_tag]
        }),
    )
    .await;
    common::create_as(
        &app,
        &editor,
        "/resources",
        json!({
            "title": "Budgeting Basics",
            "category": "FINANCIAL",
            "type": "VIDEO",
            "description": "Money management",
            "published": true
        }),
    )
    .await;

    let (_, body) = common::get(&app, "/resources?category=financial", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "budgeting-basics");

    let (_, body) = common::get(&app, "/resources?type=TOOLKIT", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "organizer-toolkit");

    let (_, body) = common::get(&app, "/resources?tag=toolkits", None).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = common::get(&app, "/resources?search=campaign", None).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn partial_update_and_delete() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    let editor = common::editor(&app).await;

    common::create_as(&app, &admin, "/resources", guide()).await;

    let resp = app
        .client
        .put(app.url("/resources/guide"))
        .bearer_auth(&editor)
        .json(&json!({ "featured": true, "published": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, body) = common::get(&app, "/resources/guide", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["featured"], true);
    assert_eq!(body["data"]["category"], "EDUCATION");
    assert_eq!(body["data"]["description"], "...");

    let resp = app
        .client
        .put(app.url("/resources/missing"))
        .bearer_auth(&editor)
        .json(&json!({ "featured": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .delete(app.url("/resources/guide"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = app
        .client
        .delete(app.url("/resources/guide"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = common::get(&app, "/resources/guide", Some(&admin)).await;
    assert_eq!(status, 404);
}
