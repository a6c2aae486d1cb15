use inkpress::TestApp;

#[tokio::test]
async fn test_create_post_generates_slug() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let body = serde_json::json!({
        "title": "Hello, World!",
        "content": "First post.",
        "status": "published"
    });

    let res = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    let data = res.data();
    assert_eq!(data["slug"], "hello-world");
    assert_eq!(data["status"], "published");
    assert_eq!(data["is_published"], true);
    assert_eq!(data["views_count"], 0);
    assert_eq!(data["author"]["username"], "author");
}

#[tokio::test]
async fn test_create_post_duplicate_title_gets_suffixed_slug() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let slug1 = app.create_post(&token, "Same Title", "One").await;
    let slug2 = app.create_post(&token, "Same Title", "Two").await;
    let slug3 = app.create_post(&token, "Same Title", "Three").await;

    assert_eq!(slug1, "same-title");
    assert_eq!(slug2, "same-title-1");
    assert_eq!(slug3, "same-title-2");
}

#[tokio::test]
async fn test_create_post_unsluggable_title_gets_random_slug() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    // Nothing in this title survives slugification
    let slug = app.create_post(&token, "!!! ???", "Symbols only").await;
    assert_eq!(slug.len(), 8);
    assert!(slug.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_create_post_derives_excerpt_from_content() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let body = serde_json::json!({
        "title": "Excerpt Test",
        "content": "<p>Hello <b>there</b>, reader.</p>",
        "status": "published"
    });

    let res = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data()["excerpt"], "Hello there, reader.");
}

#[tokio::test]
async fn test_create_post_truncates_long_excerpt() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let content = "x".repeat(400);
    let body = serde_json::json!({
        "title": "Long One",
        "content": content,
        "status": "published"
    });

    let res = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
        .await;

    let excerpt = res.data()["excerpt"].as_str().unwrap().to_string();
    assert_eq!(excerpt.len(), 303);
    assert!(excerpt.ends_with("..."));
}

#[tokio::test]
async fn test_create_post_keeps_explicit_excerpt() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let body = serde_json::json!({
        "title": "Custom Excerpt",
        "content": "Full content here.",
        "excerpt": "Hand-written summary.",
        "status": "published"
    });

    let res = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
        .await;

    assert_eq!(res.data()["excerpt"], "Hand-written summary.");
}

#[tokio::test]
async fn test_create_post_requires_auth() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "title": "Nope",
        "content": "Anonymous"
    });

    let res = app
        .client
        .post(&app.url("/api/posts"), &body.to_string())
        .await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_create_post_defaults_to_draft() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let body = serde_json::json!({
        "title": "Quiet Draft",
        "content": "Not public yet."
    });

    let res = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data()["status"], "draft");
    assert_eq!(res.data()["is_published"], false);
}

#[tokio::test]
async fn test_create_post_unknown_category() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let body = serde_json::json!({
        "title": "Bad Category",
        "content": "text",
        "category_id": 999
    });

    let res = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
        .await;

    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn test_list_posts_excludes_drafts() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    app.create_post(&token, "Published One", "visible").await;

    let draft = serde_json::json!({
        "title": "Hidden Draft",
        "content": "invisible"
    });
    app.client
        .post_with_auth(&app.url("/api/posts"), &token, &draft.to_string())
        .await;

    let res = app.client.get(&app.url("/api/posts")).await;

    assert_eq!(res.status, 200);
    let data = res.data();
    assert_eq!(data["total"], 1);
    assert_eq!(data["posts"].as_array().unwrap().len(), 1);
    assert_eq!(data["posts"][0]["title"], "Published One");
}

#[tokio::test]
async fn test_list_posts_search() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "storyteller", "password123")
        .await;

    app.create_post(&token, "Learning Rust", "ownership").await;
    app.create_post(&token, "Gardening Tips", "tomatoes").await;

    let res = app.client.get(&app.url("/api/posts?q=Rust")).await;
    let data = res.data();
    assert_eq!(data["total"], 1);
    assert_eq!(data["posts"][0]["title"], "Learning Rust");

    // Username matches hit every post by that author
    let res = app.client.get(&app.url("/api/posts?q=storyteller")).await;
    assert_eq!(res.data()["total"], 2);
}

#[tokio::test]
async fn test_list_posts_search_is_case_insensitive() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    app.create_post(&token, "Learning Rust", "ownership").await;

    let res = app.client.get(&app.url("/api/posts?q=rUsT")).await;
    assert_eq!(res.data()["total"], 1);
    assert_eq!(res.data()["posts"][0]["title"], "Learning Rust");
}

#[tokio::test]
async fn test_list_posts_unknown_category_is_empty() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    app.create_post(&token, "Uncategorized", "text").await;

    let res = app.client.get(&app.url("/api/posts?category=ghost")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.data()["total"], 0);
}

#[tokio::test]
async fn test_list_posts_pagination() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    for i in 0..5 {
        app.create_post(&token, &format!("Post {}", i), "body").await;
    }

    let res = app.client.get(&app.url("/api/posts?limit=2&offset=2")).await;
    let data = res.data();
    assert_eq!(data["total"], 5);
    assert_eq!(data["posts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_featured_is_most_viewed() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    app.create_post(&token, "Quiet Post", "meh").await;
    let hot = app.create_post(&token, "Hot Post", "wow").await;

    // One view from an anonymous client
    app.client
        .get(&app.url(&format!("/api/posts/{}", hot)))
        .await;

    let res = app.client.get(&app.url("/api/posts")).await;
    assert_eq!(res.data()["featured"]["title"], "Hot Post");
}

#[tokio::test]
async fn test_get_post_counts_view_once_per_viewer() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let slug = app.create_post(&token, "View Me", "content").await;
    let url = app.url(&format!("/api/posts/{}", slug));

    let first = app.client.get(&url).await;
    assert_eq!(first.data()["views_count"], 1);

    // Same anonymous fingerprint: no second count
    let second = app.client.get(&url).await;
    assert_eq!(second.data()["views_count"], 1);

    // Different client IP: counted again
    let third = app
        .client
        .get_with_headers(&url, &[("x-forwarded-for", "10.1.2.3")])
        .await;
    assert_eq!(third.data()["views_count"], 2);
}

#[tokio::test]
async fn test_get_post_authenticated_viewer_deduped() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;
    let (reader, _) = app
        .create_user("reader@example.com", "reader", "password123")
        .await;

    let slug = app.create_post(&token, "Read Twice", "content").await;
    let url = app.url(&format!("/api/posts/{}", slug));

    let first = app.client.get_with_auth(&url, &reader).await;
    assert_eq!(first.data()["views_count"], 1);

    let second = app.client.get_with_auth(&url, &reader).await;
    assert_eq!(second.data()["views_count"], 1);
}

#[tokio::test]
async fn test_get_draft_post_is_404() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let draft = serde_json::json!({
        "title": "Secret Draft",
        "content": "shh"
    });
    let created = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &draft.to_string())
        .await;
    let slug = created.data()["slug"].as_str().unwrap().to_string();

    // Even the author reads drafts only through the edit endpoints
    let res = app
        .client
        .get_with_auth(&app.url(&format!("/api/posts/{}", slug)), &token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_update_post_keeps_slug() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let slug = app.create_post(&token, "Original Title", "content").await;

    let body = serde_json::json!({"title": "Brand New Title"});
    let res = app
        .client
        .patch_with_auth(
            &app.url(&format!("/api/posts/{}", slug)),
            &token,
            &body.to_string(),
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data()["title"], "Brand New Title");
    // The slug is a stable URL; edits never move the post
    assert_eq!(res.data()["slug"], "original-title");
}

#[tokio::test]
async fn test_update_post_rederives_excerpt_on_empty_string() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let create = serde_json::json!({
        "title": "Excerpt Reset",
        "content": "Original body.",
        "excerpt": "Manual excerpt.",
        "status": "published"
    });
    let created = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &create.to_string())
        .await;
    let slug = created.data()["slug"].as_str().unwrap().to_string();

    let body = serde_json::json!({"content": "Fresh body.", "excerpt": ""});
    let res = app
        .client
        .patch_with_auth(
            &app.url(&format!("/api/posts/{}", slug)),
            &token,
            &body.to_string(),
        )
        .await;

    assert_eq!(res.data()["excerpt"], "Fresh body.");
}

#[tokio::test]
async fn test_update_post_detach_category_with_null() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let cat = app
        .client
        .post_with_auth(
            &app.url("/api/categories"),
            &token,
            &serde_json::json!({"name": "Tech"}).to_string(),
        )
        .await;
    let category_id = cat.data()["id"].as_i64().unwrap();

    let create = serde_json::json!({
        "title": "Categorized",
        "content": "text",
        "category_id": category_id,
        "status": "published"
    });
    let created = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &create.to_string())
        .await;
    let slug = created.data()["slug"].as_str().unwrap().to_string();
    assert_eq!(created.data()["category"]["name"], "Tech");

    // Updates that omit category_id leave the category alone
    let untouched = app
        .client
        .patch_with_auth(
            &app.url(&format!("/api/posts/{}", slug)),
            &token,
            &serde_json::json!({"title": "Still Categorized"}).to_string(),
        )
        .await;
    assert_eq!(untouched.data()["category"]["name"], "Tech");

    // An explicit null detaches
    let res = app
        .client
        .patch_with_auth(
            &app.url(&format!("/api/posts/{}", slug)),
            &token,
            &serde_json::json!({"category_id": null}).to_string(),
        )
        .await;

    assert_eq!(res.status, 200);
    assert!(res.data()["category"].is_null());
}

#[tokio::test]
async fn test_update_post_forbidden_for_non_author() {
    let app = TestApp::new().await;
    let (author, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;
    let (other, _) = app
        .create_user("other@example.com", "other", "password123")
        .await;

    let slug = app.create_post(&author, "Mine", "content").await;

    let res = app
        .client
        .patch_with_auth(
            &app.url(&format!("/api/posts/{}", slug)),
            &other,
            &serde_json::json!({"title": "Hijacked"}).to_string(),
        )
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn test_publish_draft_via_update() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let draft = serde_json::json!({"title": "Soon Public", "content": "text"});
    let created = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &draft.to_string())
        .await;
    let slug = created.data()["slug"].as_str().unwrap().to_string();

    let res = app
        .client
        .patch_with_auth(
            &app.url(&format!("/api/posts/{}", slug)),
            &token,
            &serde_json::json!({"status": "published"}).to_string(),
        )
        .await;
    assert_eq!(res.data()["is_published"], true);

    // Now visible on the public detail endpoint
    let public = app
        .client
        .get(&app.url(&format!("/api/posts/{}", slug)))
        .await;
    assert_eq!(public.status, 200);
}

#[tokio::test]
async fn test_delete_post() {
    let app = TestApp::new().await;
    let (author, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;
    let (other, _) = app
        .create_user("other@example.com", "other", "password123")
        .await;

    let slug = app.create_post(&author, "Doomed", "content").await;
    let url = app.url(&format!("/api/posts/{}", slug));

    let forbidden = app.client.delete_with_auth(&url, &other).await;
    assert_eq!(forbidden.status, 403);

    let deleted = app.client.delete_with_auth(&url, &author).await;
    assert_eq!(deleted.status, 200);

    let gone = app.client.get(&url).await;
    assert_eq!(gone.status, 404);
}

#[tokio::test]
async fn test_related_posts_share_category() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let cat = app
        .client
        .post_with_auth(
            &app.url("/api/categories"),
            &token,
            &serde_json::json!({"name": "Rust"}).to_string(),
        )
        .await;
    let category_id = cat.data()["id"].as_i64().unwrap();

    for title in ["Alpha", "Beta", "Gamma"] {
        let body = serde_json::json!({
            "title": title,
            "content": "text",
            "category_id": category_id,
            "status": "published"
        });
        app.client
            .post_with_auth(&app.url("/api/posts"), &token, &body.to_string())
            .await;
    }
    app.create_post(&token, "Unrelated", "text").await;

    let res = app.client.get(&app.url("/api/posts/alpha")).await;
    let related = res.data()["related"].as_array().unwrap().clone();
    assert_eq!(related.len(), 2);
    for r in &related {
        assert_eq!(r["category"]["name"], "Rust");
        assert_ne!(r["title"], "Alpha");
    }
}
