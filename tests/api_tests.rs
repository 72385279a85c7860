/// HTTP-level tests driving the full router against an in-memory database
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mira::{
    catalog::FilmInput,
    config::ServerConfig,
    context::AppContext,
    db::{self, models::UserRole},
    error::{MiraError, MiraResult},
    server,
    video_host::{PlaybackId, RemoteAsset, RemoteUpload, UploadTicket, VideoHost},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// In-process stand-in for the remote video host
struct FakeHost;

#[async_trait]
impl VideoHost for FakeHost {
    async fn list_assets(&self) -> MiraResult<Vec<RemoteAsset>> {
        Ok(vec![asset("asset-imported"), asset("asset-fresh")])
    }

    async fn get_asset(&self, asset_id: &str) -> MiraResult<RemoteAsset> {
        Ok(asset(asset_id))
    }

    async fn delete_asset(&self, _asset_id: &str) -> MiraResult<()> {
        Ok(())
    }

    async fn create_upload(&self, passthrough: &str) -> MiraResult<UploadTicket> {
        Ok(UploadTicket {
            id: "upload-1".to_string(),
            url: format!("https://uploads.example/?passthrough={}", passthrough),
        })
    }

    async fn get_upload(&self, upload_id: &str) -> MiraResult<RemoteUpload> {
        match upload_id {
            "done" => Ok(RemoteUpload {
                id: upload_id.to_string(),
                status: "asset_created".to_string(),
                asset_id: Some("asset-fresh".to_string()),
            }),
            "waiting" => Ok(RemoteUpload {
                id: upload_id.to_string(),
                status: "waiting".to_string(),
                asset_id: None,
            }),
            _ => Err(MiraError::VideoHost("unknown upload".to_string())),
        }
    }
}

fn asset(id: &str) -> RemoteAsset {
    RemoteAsset {
        id: id.to_string(),
        status: Some("ready".to_string()),
        duration: Some(42.0),
        playback_ids: vec![PlaybackId {
            id: format!("pb-{}", id),
            policy: Some("public".to_string()),
        }],
        passthrough: Some(json!({ "title": id, "type": "film" }).to_string()),
        ..Default::default()
    }
}

struct Harness {
    ctx: AppContext,
    app: Router,
}

impl Harness {
    async fn new() -> Self {
        let pool = db::create_memory_pool().await.unwrap();
        let ctx = AppContext::with_parts(
            ServerConfig::for_tests(SECRET),
            pool,
            Some(Arc::new(FakeHost)),
        );
        let app = server::build_router(ctx.clone());
        Self { ctx, app }
    }

    async fn user(&self, name: &str) -> (String, String) {
        let email = format!("{}@example.com", name);
        let user = self
            .ctx
            .accounts
            .create_user(Some(name), Some(email.as_str()), None)
            .await
            .unwrap();
        let token = self.ctx.accounts.issue_session(&user.id).unwrap();
        (user.id, token)
    }

    async fn admin(&self, name: &str) -> (String, String) {
        let (id, token) = self.user(name).await;
        self.ctx.accounts.set_role(&id, UserRole::Admin).await.unwrap();
        (id, token)
    }

    async fn film(&self, title: &str, asset_id: Option<&str>) -> String {
        self.ctx
            .films
            .create(FilmInput {
                title: title.to_string(),
                video_asset_id: asset_id.map(String::from),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.call(method, uri, token, body).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let h = Harness::new().await;

    let (status, body) = h.json("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = h.call("GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Not Found");
}

#[tokio::test]
async fn test_comment_thread_end_to_end() {
    let h = Harness::new().await;
    let (_, alice) = h.user("alice").await;
    let (_, bob) = h.user("bob").await;
    let film = h.film("Neon Dreams", None).await;
    let comments_uri = format!("/films/{}/comments", film);

    let (status, body) = h.json("GET", &comments_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = h
        .json("POST", &comments_uri, Some(&alice), Some(json!({ "content": "Great film!" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["content"], "Great film!");
    assert_eq!(created["user"]["name"], "alice");
    let comment_id = created["id"].as_str().unwrap().to_string();

    let (status, reply) = h
        .json(
            "POST",
            &comments_uri,
            Some(&bob),
            Some(json!({ "content": "Agreed", "parentId": comment_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["parentId"], comment_id.as_str());

    let like_uri = format!("/comments/{}/like", comment_id);
    let (_, liked) = h.json("POST", &like_uri, Some(&bob), None).await;
    assert_eq!(liked, json!({ "liked": true }));

    let (_, report) = h
        .json(
            "POST",
            &format!("/comments/{}/report", comment_id),
            Some(&bob),
            Some(json!({ "reason": "spoilers" })),
        )
        .await;
    assert_eq!(report["reason"], "spoilers");

    let (_, tree) = h.json("GET", &comments_uri, None, None).await;
    assert_eq!(tree.as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["id"], comment_id.as_str());
    assert_eq!(tree[0]["likes"].as_array().unwrap().len(), 1);
    assert_eq!(tree[0]["replies"][0]["content"], "Agreed");

    let (status, _) = h
        .call("DELETE", &format!("/comments/{}", comment_id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, tree) = h.json("GET", &comments_uri, None, None).await;
    assert_eq!(tree, json!([]));
}

#[tokio::test]
async fn test_comment_error_statuses() {
    let h = Harness::new().await;
    let (_, alice) = h.user("alice").await;
    let (_, mallory) = h.user("mallory").await;
    let film = h.film("Neon Dreams", None).await;
    let comments_uri = format!("/films/{}/comments", film);

    let (status, body) = h
        .call("POST", &comments_uri, None, Some(json!({ "content": "hi" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, b"Unauthorized");

    let (status, _) = h
        .call("POST", &comments_uri, Some(&alice), Some(json!({ "content": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, created) = h
        .json("POST", &comments_uri, Some(&alice), Some(json!({ "content": "mine" })))
        .await;
    let comment_uri = format!("/comments/{}", created["id"].as_str().unwrap());

    let (status, _) = h
        .call("POST", &format!("{}/report", comment_uri), Some(&mallory), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = h.call("DELETE", &comment_uri, Some(&mallory), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, b"Forbidden");

    let (status, _) = h.call("DELETE", "/comments/missing", Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h.call("POST", "/comments/missing/like", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = h
        .call("GET", &comments_uri, Some("not-a-real-token"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_moderation_queue() {
    let h = Harness::new().await;
    let (_, admin) = h.admin("root").await;
    let (_, alice) = h.user("alice").await;
    let (_, bob) = h.user("bob").await;
    let film = h.film("Neon Dreams", None).await;

    let (status, _) = h.call("GET", "/admin/reports", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = h.call("GET", "/admin/reports", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, created) = h
        .json(
            "POST",
            &format!("/films/{}/comments", film),
            Some(&alice),
            Some(json!({ "content": "rude words" })),
        )
        .await;
    let comment_id = created["id"].as_str().unwrap().to_string();
    h.call(
        "POST",
        &format!("/comments/{}/report", comment_id),
        Some(&bob),
        Some(json!({ "reason": "abusive" })),
    )
    .await;

    let (status, reports) = h.json("GET", "/admin/reports", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reports[0]["reason"], "abusive");
    assert_eq!(reports[0]["user"]["name"], "bob");
    assert_eq!(reports[0]["comment"]["content"], "rude words");
    assert_eq!(reports[0]["comment"]["film"]["title"], "Neon Dreams");

    let (status, _) = h
        .call("DELETE", &format!("/admin/comments/{}", comment_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, reports) = h.json("GET", "/admin/reports", Some(&admin), None).await;
    assert_eq!(reports, json!([]));
}

#[tokio::test]
async fn test_progress_and_favorites() {
    let h = Harness::new().await;
    let (_, alice) = h.user("alice").await;
    let film = h.film("Neon Dreams", None).await;
    let progress_uri = format!("/films/{}/progress", film);
    let favorite_uri = format!("/films/{}/favorite", film);

    let (status, _) = h.call("GET", &progress_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, state) = h.json("GET", &progress_uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, json!({ "lastTimestamp": 0.0, "completed": false }));

    h.call("POST", &progress_uri, Some(&alice), Some(json!({ "lastTimestamp": 10.0 })))
        .await;
    let (status, saved) = h
        .json("POST", &progress_uri, Some(&alice), Some(json!({ "lastTimestamp": 20.5 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["lastTimestamp"], 20.5);

    let (_, state) = h.json("GET", &progress_uri, Some(&alice), None).await;
    assert_eq!(state["lastTimestamp"], 20.5);

    let (_, resume) = h.json("GET", "/me/progress", Some(&alice), None).await;
    assert_eq!(resume.as_array().unwrap().len(), 1);
    assert_eq!(resume[0]["film"]["title"], "Neon Dreams");

    let (status, state) = h.json("GET", &favorite_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state, json!({ "favorited": false }));

    let (status, _) = h.call("POST", &favorite_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, state) = h.json("POST", &favorite_uri, Some(&alice), None).await;
    assert_eq!(state, json!({ "favorited": true }));
    let (_, favorites) = h.json("GET", "/me/favorites", Some(&alice), None).await;
    assert_eq!(favorites[0]["id"], film.as_str());

    let (_, state) = h.json("POST", &favorite_uri, Some(&alice), None).await;
    assert_eq!(state, json!({ "favorited": false }));
}

#[tokio::test]
async fn test_video_host_bridge_endpoints() {
    let h = Harness::new().await;
    let (_, admin) = h.admin("root").await;
    let (_, alice) = h.user("alice").await;
    h.film("Imported", Some("asset-imported")).await;

    let (status, _) = h.call("GET", "/mux/assets", Some(&alice), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, assets) = h.json("GET", "/mux/assets", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assets[0]["id"], "asset-imported");
    assert_eq!(assets[0]["isImported"], true);
    assert_eq!(assets[1]["isImported"], false);
    assert_eq!(assets[1]["title"], "asset-fresh");

    let (status, _) = h.call("DELETE", "/mux/assets", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = h
        .call("DELETE", "/mux/assets?id=asset-fresh", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, ticket) = h
        .json("POST", "/mux/upload", Some(&admin), Some(json!({ "title": "New Cut" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["id"], "upload-1");

    let (_, done) = h.json("GET", "/mux/upload/done", Some(&admin), None).await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["playbackId"], "pb-asset-fresh");
    assert_eq!(done["duration"], 42.0);

    let (_, waiting) = h.json("GET", "/mux/upload/waiting", Some(&admin), None).await;
    assert_eq!(waiting, json!({ "status": "waiting" }));

    let (status, body) = h.call("GET", "/mux/upload/unknown", Some(&admin), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Internal Error");
}

#[tokio::test]
async fn test_film_library_and_collections() {
    let h = Harness::new().await;
    let (_, admin) = h.admin("root").await;
    let (_, alice) = h.user("alice").await;

    let (status, _) = h
        .call("POST", "/films", Some(&alice), Some(json!({ "title": "Nope" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, film) = h
        .json(
            "POST",
            "/films",
            Some(&admin),
            Some(json!({ "title": "Night Train", "category": "Drama", "tags": ["noir"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let film_id = film["id"].as_str().unwrap().to_string();

    let (_, results) = h.json("GET", "/search?q=noir", None, None).await;
    assert_eq!(results[0]["id"], film_id.as_str());
    let (status, _) = h.call("GET", "/search?q=", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .call("POST", &format!("/films/{}/view", film_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, fetched) = h.json("GET", &format!("/films/{}", film_id), None, None).await;
    assert_eq!(fetched["views"], 1);

    let (_, collection) = h
        .json(
            "POST",
            "/collections",
            Some(&admin),
            Some(json!({ "title": "Staff Picks" })),
        )
        .await;
    let collection_id = collection["id"].as_str().unwrap().to_string();

    let (status, _) = h
        .call(
            "POST",
            &format!("/collections/{}/films", collection_id),
            Some(&admin),
            Some(json!({ "filmId": film_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, full) = h
        .json("GET", &format!("/collections/{}", collection_id), None, None)
        .await;
    assert_eq!(full["films"][0]["film"]["title"], "Night Train");

    let (status, _) = h
        .call("DELETE", &format!("/films/{}", film_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = h.call("GET", &format!("/films/{}", film_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_profile() {
    let h = Harness::new().await;
    let (alice_id, alice) = h.user("alice").await;
    let film = h.film("Neon Dreams", None).await;
    h.call(
        "POST",
        &format!("/films/{}/comments", film),
        Some(&alice),
        Some(json!({ "content": "first" })),
    )
    .await;

    let (status, profile) = h
        .json("GET", &format!("/users/{}", alice_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "alice");
    assert_eq!(profile["_count"]["comments"], 1);

    let (status, _) = h.call("GET", "/users/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_keeps_omitted_fields() {
    let h = Harness::new().await;
    let (_, admin) = h.admin("root").await;
    let film = h.film("Imported", Some("asset-imported")).await;

    let (status, patched) = h
        .json(
            "PATCH",
            &format!("/films/{}", film),
            Some(&admin),
            Some(json!({ "title": "Renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Renamed");
    assert_eq!(patched["videoAssetId"], "asset-imported");

    let (_, assets) = h.json("GET", "/mux/assets", Some(&admin), None).await;
    assert_eq!(assets[0]["id"], "asset-imported");
    assert_eq!(assets[0]["isImported"], true);

    let (_, collection) = h
        .json(
            "POST",
            "/collections",
            Some(&admin),
            Some(json!({ "title": "Staff Picks", "description": "Staff favourites" })),
        )
        .await;
    let (status, patched) = h
        .json(
            "PATCH",
            &format!("/collections/{}", collection["id"].as_str().unwrap()),
            Some(&admin),
            Some(json!({ "title": "Renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Renamed");
    assert_eq!(patched["description"], "Staff favourites");
}

#[tokio::test]
async fn test_upload_without_body_uses_default_title() {
    let h = Harness::new().await;
    let (_, admin) = h.admin("root").await;

    let (status, ticket) = h.json("POST", "/mux/upload", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ticket["id"], "upload-1");
    assert!(ticket["url"].as_str().unwrap().contains("Untitled Film"));

    let (status, _) = h.call("POST", "/mux/upload", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_private_films_only_visible_to_admins() {
    let h = Harness::new().await;
    let (_, admin) = h.admin("root").await;
    let (_, alice) = h.user("alice").await;

    h.film("Open Air", None).await;
    let (_, secret) = h
        .json(
            "POST",
            "/films",
            Some(&admin),
            Some(json!({ "title": "Secret Cut", "visibility": "PRIVATE" })),
        )
        .await;
    let secret_uri = format!("/films/{}", secret["id"].as_str().unwrap());

    for token in [None, Some(alice.as_str())] {
        let (_, films) = h.json("GET", "/films", token, None).await;
        assert_eq!(films.as_array().unwrap().len(), 1);
        let (_, found) = h.json("GET", "/search?q=secret", token, None).await;
        assert_eq!(found, json!([]));
        let (status, _) = h.call("GET", &secret_uri, token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, films) = h.json("GET", "/films", Some(&admin), None).await;
    assert_eq!(films.as_array().unwrap().len(), 2);
    let (_, found) = h.json("GET", "/search?q=secret", Some(&admin), None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    let (status, _) = h.call("GET", &secret_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, trending) = h.json("GET", "/trending", Some(&admin), None).await;
    assert_eq!(trending.as_array().unwrap().len(), 1);
    assert_eq!(trending[0]["title"], "Open Air");
}
