mod common;

use serde_json::{json, Value};

fn story(slug: &str, published: bool) -> Value {
    json!({
        "title": "Maria's Journey",
        "slug": slug,
        "excerpt": "From survivor to advocate",
        "content": "<p>Maria found her voice.</p>",
        "type": "VIDEO",
        "media_url": "https://videos.example.org/maria.mp4",
        "published": published,
        "featured": true
    })
}

#[tokio::test]
async fn create_and_get_story() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let created = common::create_as(&app, &editor, "/stories", story("marias-journey", true)).await;
    assert_eq!(created["slug"], "marias-journey");
    assert_eq!(created["type"], "VIDEO");
    assert!(created["author_name"].as_str().unwrap().starts_with("Test User"));

    let (status, body) = common::get(&app, "/stories/marias-journey", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["title"], "Maria's Journey");
    assert_eq!(body["data"]["author_id"], created["author_id"]);
}

#[tokio::test]
async fn slug_is_derived_from_title() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let created = common::create_as(
        &app,
        &editor,
        "/stories",
        json!({ "title": "Hope & Healing!", "content": "Text", "type": "TEXT" }),
    )
    .await;
    assert_eq!(created["slug"], "hope-healing");
    assert_eq!(created["published"], false);
}

#[tokio::test]
async fn missing_required_field_persists_nothing() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let resp = app
        .client
        .post(app.url("/stories"))
        .bearer_auth(&editor)
        .json(&json!({ "title": "No body", "slug": "no-body", "type": "TEXT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Content is required");

    let (status, _) = common::get(&app, "/stories/no-body", Some(&editor)).await;
    assert_eq!(status, 404);

    let resp = app
        .client
        .post(app.url("/stories"))
        .bearer_auth(&editor)
        .json(&json!({ "title": "Bad type", "content": "x", "type": "PODCAST" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    common::create_as(&app, &editor, "/stories", story("same-slug", true)).await;

    let resp = app
        .client
        .post(app.url("/stories"))
        .bearer_auth(&editor)
        .json(&story("same-slug", false))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "A story with this slug already exists");
}

#[tokio::test]
async fn drafts_are_hidden_from_the_public() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    let visitor = common::visitor(&app).await;

    common::create_as(&app, &admin, "/stories", story("draft-story", false)).await;
    common::create_as(&app, &admin, "/stories", story("live-story", true)).await;

    let (status, body) = common::get(&app, "/stories/draft-story", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Story not found");

    let (status, _) = common::get(&app, "/stories/draft-story", Some(&visitor)).await;
    assert_eq!(status, 404);

    let (status, body) = common::get(&app, "/stories/draft-story", Some(&admin)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["published"], false);
    assert_eq!(body["data"]["content"], "<p>Maria found her voice.</p>");

    // Anonymous lists ignore the published filter
    let (_, body) = common::get(&app, "/stories?published=false", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "live-story");

    let (_, body) = common::get(&app, "/stories?published=false", Some(&admin)).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "draft-story");

    let (_, body) = common::get(&app, "/stories", Some(&admin)).await;
    assert_eq!(body["data"]["total"], 2);
}

#[tokio::test]
async fn list_filters_and_search() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    common::create_as(&app, &editor, "/stories", story("video-one", true)).await;
    common::create_as(
        &app,
        &editor,
        "/stories",
        json!({
            "title": "Voices of 100% Courage",
            "slug": "audio-one",
            "content": "An audio diary",
            "type": "AUDIO",
            "published": true
        }),
    )
    .await;

    let (_, body) = common::get(&app, "/stories?type=audio", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "audio-one");

    let (_, body) = common::get(&app, "/stories?featured=true", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "video-one");

    let (_, body) = common::get(&app, "/stories?search=MARIA", None).await;
    assert_eq!(body["data"]["total"], 1);

    // LIKE wildcards in the search term are matched literally
    let (_, body) = common::get(&app, "/stories?search=100%25", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "audio-one");

    let (_, body) = common::get(&app, "/stories?limit=1&page=2", None).await;
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, _) = common::get(&app, "/stories?type=PODCAST", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn partial_update_preserves_other_fields() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    common::create_as(&app, &editor, "/stories", story("patch-me", true)).await;

    let resp = app
        .client
        .put(app.url("/stories/patch-me"))
        .bearer_auth(&editor)
        .json(&json!({ "title": "A New Title" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "A New Title");

    let (_, body) = common::get(&app, "/stories/patch-me", None).await;
    let data = &body["data"];
    assert_eq!(data["title"], "A New Title");
    assert_eq!(data["excerpt"], "From survivor to advocate");
    assert_eq!(data["type"], "VIDEO");
    assert_eq!(data["media_url"], "https://videos.example.org/maria.mp4");
    assert_eq!(data["featured"], true);
    assert_eq!(data["published"], true);
}

#[tokio::test]
async fn update_can_rename_slug() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    common::create_as(&app, &editor, "/stories", story("old-slug", true)).await;
    common::create_as(&app, &editor, "/stories", story("taken-slug", true)).await;

    let resp = app
        .client
        .put(app.url("/stories/old-slug"))
        .bearer_auth(&editor)
        .json(&json!({ "slug": "taken-slug" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = app
        .client
        .put(app.url("/stories/old-slug"))
        .bearer_auth(&editor)
        .json(&json!({ "slug": "new-slug" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = common::get(&app, "/stories/old-slug", None).await;
    assert_eq!(status, 404);
    let (status, _) = common::get(&app, "/stories/new-slug", None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn editors_cannot_delete_stories() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;
    common::create_as(&app, &editor, "/stories", story("some-story", true)).await;

    let resp = app
        .client
        .delete(app.url("/stories/some-story"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden: Only admins can delete stories");

    let (status, _) = common::get(&app, "/stories/some-story", None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn admin_delete_removes_story() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    common::create_as(&app, &admin, "/stories", story("to-delete", true)).await;

    let resp = app
        .client
        .delete(app.url("/stories/missing-story"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .delete(app.url("/stories/to-delete"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = common::get(&app, "/stories/to-delete", Some(&admin)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn writes_require_staff() {
    let app = common::spawn_app().await;
    let visitor = common::visitor(&app).await;

    let resp = app
        .client
        .post(app.url("/stories"))
        .json(&story("anon", true))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/stories"))
        .bearer_auth(&visitor)
        .json(&story("user-story", true))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden: Insufficient permissions");
}

#[tokio::test]
async fn far_out_pages_are_empty() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    common::create_as(&app, &admin, "/stories", story("only-story", true)).await;

    let (status, body) = common::get(&app, "/stories?page=4611686018427387904", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["page"], 10_000);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());

    let (status, body) = common::get(&app, "/users?page=18446744073709551615", Some(&admin)).await;
    assert_eq!(status, 200);
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_query_is_a_json_400() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let (status, body) = common::get(&app, "/stories?featured=maybe", None).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, body) = common::get(&app, "/news?page=abc", None).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());

    let (status, body) = common::get(&app, "/contact?limit=-1", Some(&editor)).await;
    assert_eq!(status, 400);
    assert!(body["error"].is_string());
}
