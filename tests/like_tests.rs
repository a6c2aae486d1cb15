use inkpress::TestApp;

#[tokio::test]
async fn test_like_requires_auth() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let slug = app.create_post(&token, "Likeable", "content").await;

    let res = app
        .client
        .post(&app.url(&format!("/api/posts/{}/like", slug)), "")
        .await;

    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_like_toggles() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let slug = app.create_post(&token, "Toggle Me", "content").await;
    let url = app.url(&format!("/api/posts/{}/like", slug));

    let on = app.client.post_with_auth(&url, &token, "").await;
    assert_eq!(on.status, 200);
    assert_eq!(on.data()["liked"], true);
    assert_eq!(on.data()["count"], 1);

    let off = app.client.post_with_auth(&url, &token, "").await;
    assert_eq!(off.data()["liked"], false);
    assert_eq!(off.data()["count"], 0);

    // And back on again
    let again = app.client.post_with_auth(&url, &token, "").await;
    assert_eq!(again.data()["liked"], true);
    assert_eq!(again.data()["count"], 1);
}

#[tokio::test]
async fn test_like_counts_per_user() {
    let app = TestApp::new().await;
    let (author, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;
    let (fan, _) = app
        .create_user("fan@example.com", "fan", "password123")
        .await;

    let slug = app.create_post(&author, "Popular", "content").await;
    let url = app.url(&format!("/api/posts/{}/like", slug));

    app.client.post_with_auth(&url, &author, "").await;
    let res = app.client.post_with_auth(&url, &fan, "").await;

    assert_eq!(res.data()["count"], 2);
}

#[tokio::test]
async fn test_liked_flag_in_detail() {
    let app = TestApp::new().await;
    let (author, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;
    let (fan, _) = app
        .create_user("fan@example.com", "fan", "password123")
        .await;

    let slug = app.create_post(&author, "Flagged", "content").await;
    app.client
        .post_with_auth(&app.url(&format!("/api/posts/{}/like", slug)), &fan, "")
        .await;

    let detail_url = app.url(&format!("/api/posts/{}", slug));

    let as_fan = app.client.get_with_auth(&detail_url, &fan).await;
    assert_eq!(as_fan.data()["liked"], true);
    assert_eq!(as_fan.data()["like_count"], 1);

    let as_author = app.client.get_with_auth(&detail_url, &author).await;
    assert_eq!(as_author.data()["liked"], false);

    let anonymous = app.client.get(&detail_url).await;
    assert_eq!(anonymous.data()["liked"], false);
}

#[tokio::test]
async fn test_like_draft_is_404() {
    let app = TestApp::new().await;
    let (token, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;

    let draft = serde_json::json!({"title": "Hidden", "content": "text"});
    let created = app
        .client
        .post_with_auth(&app.url("/api/posts"), &token, &draft.to_string())
        .await;
    let slug = created.data()["slug"].as_str().unwrap().to_string();

    let res = app
        .client
        .post_with_auth(&app.url(&format!("/api/posts/{}/like", slug)), &token, "")
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_most_liked_sort() {
    let app = TestApp::new().await;
    let (author, _) = app
        .create_user("author@example.com", "author", "password123")
        .await;
    let (fan, _) = app
        .create_user("fan@example.com", "fan", "password123")
        .await;

    app.create_post(&author, "Ignored", "content").await;
    let loved = app.create_post(&author, "Loved", "content").await;

    let like_url = app.url(&format!("/api/posts/{}/like", loved));
    app.client.post_with_auth(&like_url, &author, "").await;
    app.client.post_with_auth(&like_url, &fan, "").await;

    let res = app.client.get(&app.url("/api/posts?sort=most_liked")).await;
    let posts = res.data()["posts"].as_array().unwrap().clone();
    assert_eq!(posts[0]["title"], "Loved");
    assert_eq!(posts[0]["like_count"], 2);
}
