mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn tags_are_listed_by_name() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    for name in ["Youth", "Advocacy", "Mental Health"] {
        common::create_tag(&app, &editor, name).await;
    }

    let (status, body) = common::get(&app, "/tags", None).await;
    assert_eq!(status, 200);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Advocacy", "Mental Health", "Youth"]);

    let (_, body) = common::get(&app, "/tags?search=health", None).await;
    let tags = body["data"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["slug"], "mental-health");
}

#[tokio::test]
async fn tag_slugs_are_unique_and_well_formed() {
    let app = common::spawn_app().await;
    let editor = common::editor(&app).await;

    common::create_tag(&app, &editor, "Community").await;

    let resp = app
        .client
        .post(app.url("/tags"))
        .bearer_auth(&editor)
        .json(&json!({ "name": "community!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "A tag with this slug already exists");

    let resp = app
        .client
        .post(app.url("/tags"))
        .bearer_auth(&editor)
        .json(&json!({ "name": "Odd", "slug": "Not A Slug" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = app
        .client
        .post(app.url("/tags"))
        .bearer_auth(&editor)
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Name is required");
}

#[tokio::test]
async fn update_and_delete_tag() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    let editor = common::editor(&app).await;
    let tag_id = common::create_tag(&app, &editor, "Edu").await;

    let resp = app
        .client
        .put(app.url("/tags/edu"))
        .bearer_auth(&editor)
        .json(&json!({ "name": "Education", "slug": "education" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["id"], tag_id);
    assert_eq!(body["data"]["slug"], "education");

    let (status, body) = common::get(&app, "/tags/edu", None).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Tag not found");

    common::create_as(
        &app,
        &editor,
        "/resources",
        json!({
            "title": "Study Guide",
            "category": "EDUCATION",
            "type": "PDF",
            "description": "Tips",
            "published": true,
            "tags": [tag_id]
        }),
    )
    .await;

    let resp = app
        .client
        .delete(app.url("/tags/education"))
        .bearer_auth(&editor)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden: Only admins can delete tags");

    let resp = app
        .client
        .delete(app.url("/tags/education"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // The resource survives without the tag
    let (status, body) = common::get(&app, "/resources/study-guide", None).await;
    assert_eq!(status, 200);
    assert!(body["data"]["tags"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn usage_count_tracks_links_across_entities() {
    let app = common::spawn_app().await;
    let admin = common::admin(&app).await;
    let tag_id = common::create_tag(&app, &admin, "Shared").await;

    common::create_as(
        &app,
        &admin,
        "/news",
        json!({ "title": "Shared News", "content": "x", "category": "General", "tags": [tag_id] }),
    )
    .await;
    common::create_as(
        &app,
        &admin,
        "/events",
        json!({
            "title": "Shared Event",
            "description": "x",
            "date": "2030-01-01",
            "location": "Hall",
            "tags": [tag_id, tag_id]
        }),
    )
    .await;

    let (_, body) = common::get(&app, "/tags/shared", None).await;
    assert_eq!(body["data"]["usage_count"], 2);

    let resp = app
        .client
        .delete(app.url("/events/shared-event"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let (_, body) = common::get(&app, "/tags/shared", None).await;
    assert_eq!(body["data"]["usage_count"], 1);
}
