mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn missing_article_is_not_found() {
    let app = common::spawn_app().await;

    let (status, body) = common::get(&app, "/news/nonexistent-slug", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Article not found");
}

#[tokio::test]
async fn create_article_with_tags() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;
    let policy = common::create_tag(&app, &editor, "Policy").await;
    let advocacy = common::create_tag(&app, &editor, "Advocacy").await;

    let created = common::create_as(
        &app,
        &editor,
        "/news",
        json!({
            "title": "New Protections Passed",
            "content": "<p>Good news.</p><script>alert(1)</script>",
            "category": "Policy",
            "published": true,
            "tags": [policy, advocacy]
        }),
    )
    .await;
    assert_eq!(created["slug"], "new-protections-passed");
    assert!(created["published_at"].is_string());
    assert!(!created["content"].as_str().unwrap().contains("script"));

    let tags = created["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0]["slug"], "advocacy");
    assert_eq!(tags[1]["slug"], "policy");

    let (_, body) = common::get(&app, "/tags/policy", None).await;
    assert_eq!(body["data"]["usage_count"], 1);
}

#[tokio::test]
async fn unknown_tag_is_rejected() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let resp = app
        .client
        .post(app.url("/news"))
        .bearer_auth(&editor)
        .json(&json!({
            "title": "Tagged",
            "content": "Body",
            "category": "General",
            "tags": [9999]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Tag 9999 does not exist");

    let (status, _) = common::get(&app, "/news/tagged", Some(&editor)).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn published_at_is_set_on_first_publish() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    let created = common::create_as(
        &app,
        &editor,
        "/news",
        json!({ "title": "Draft News", "content": "Body", "category": "General" }),
    )
    .await;
    assert!(created["published_at"].is_null());

    let (status, _) = common::get(&app, "/news/draft-news", None).await;
    assert_eq!(status, 404);

    let resp = app
        .client
        .put(app.url("/news/draft-news"))
        .bearer_auth(&editor)
        .json(&json!({ "published": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let first_published = body["data"]["published_at"].as_str().unwrap().to_string();

    // Unpublishing and republishing keeps the original date
    for published in [false, true] {
        let resp = app
            .client
            .put(app.url("/news/draft-news"))
            .bearer_auth(&editor)
            .json(&json!({ "published": published }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let (status, body) = common::get(&app, "/news/draft-news", None).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["published_at"], first_published);
    assert_eq!(body["data"]["category"], "General");
}

#[tokio::test]
async fn list_filters_by_category_and_tag() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;
    let youth = common::create_tag(&app, &editor, "Youth").await;

    common::create_as(
        &app,
        &editor,
        "/news",
        json!({
            "title": "Youth Summit",
            "content": "Summit recap",
            "category": "Events",
            "published": true,
            "tags": [youth]
        }),
    )
    .await;
    common::create_as(
        &app,
        &editor,
        "/news",
        json!({
            "title": "Annual Report",
            "content": "Numbers",
            "category": "Reports",
            "published": true,
            "featured": true
        }),
    )
    .await;

    let (_, body) = common::get(&app, "/news?category=Reports", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "annual-report");

    let (_, body) = common::get(&app, "/news?tag=youth", None).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["slug"], "youth-summit");
    assert_eq!(body["data"]["items"][0]["tags"][0]["name"], "Youth");

    let (_, body) = common::get(&app, "/news?tag=no-such-tag", None).await;
    assert_eq!(body["data"]["total"], 0);

    let (_, body) = common::get(&app, "/news?featured=true", None).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = common::get(&app, "/news?search=recap", None).await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn update_replaces_tags_only_when_given() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;
    let first = common::create_tag(&app, &editor, "First").await;
    let second = common::create_tag(&app, &editor, "Second").await;

    common::create_as(
        &app,
        &editor,
        "/news",
        json!({
            "title": "Retag Me",
            "content": "Body",
            "category": "General",
            "published": true,
            "tags": [first]
        }),
    )
    .await;

    let resp = app
        .client
        .put(app.url("/news/retag-me"))
        .bearer_auth(&editor)
        .json(&json!({ "title": "Retagged" }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["tags"][0]["slug"], "first");

    let resp = app
        .client
        .put(app.url("/news/retag-me"))
        .bearer_auth(&editor)
        .json(&json!({ "tags": [second] }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let tags = body["data"]["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["slug"], "second");

    let (_, body) = common::get(&app, "/tags/first", None).await;
    assert_eq!(body["data"]["usage_count"], 0);
    let (_, body) = common::get(&app, "/tags/second", None).await;
    assert_eq!(body["data"]["usage_count"], 1);
}

#[tokio::test]
async fn delete_article_releases_tags() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    let editor = common::editor(&app).await;
    let tag = common::create_tag(&app, &admin, "Temporary").await;

    common::create_as(
        &app,
        &admin,
        "/news",
        json!({
            "title": "Short Lived",
            "content": "Body",
            "category": "General",
            "tags": [tag]
        }),
    )
    .await;

    let resp = app
        .client
        .delete(app.url("/news/short-lived"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden: Only admins can delete articles");

    let resp = app
        .client
        .delete(app.url("/news/short-lived"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (status, _) = common::get(&app, "/news/short-lived", Some(&admin)).await;
    assert_eq!(status, 404);
    let (_, body) = common::get(&app, "/tags/temporary", None).await;
    assert_eq!(body["data"]["usage_count"], 0);
}
