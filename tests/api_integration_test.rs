use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use copydesk::adapters::api_handler::ApiState;
use copydesk::adapters::content_store::ContentStore;
use copydesk::adapters::editor::Editor;
use copydesk::adapters::save_orchestrator::SaveOrchestrator;
use copydesk::adapters::upload_queue::{NewUpload, UploadQueue};
use copydesk::domain::{PublishError, PublishResult, PublisherPort, UpdateContentRequest};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt; // for oneshot

/// Publisher stub that records every batch it is handed
#[derive(Default)]
struct RecordingPublisher {
    requests: Mutex<Vec<UpdateContentRequest>>,
}

#[async_trait]
impl PublisherPort for RecordingPublisher {
    async fn publish(&self, request: &UpdateContentRequest) -> PublishResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

/// Publisher stub that always fails, simulating a remote 500
struct FailingPublisher;

#[async_trait]
impl PublisherPort for FailingPublisher {
    async fn publish(&self, _request: &UpdateContentRequest) -> PublishResult<()> {
        Err(PublishError::Api {
            status: 500,
            message: "remote write failed".to_string(),
        })
    }
}

struct TestSession {
    app: Router,
    store: ContentStore,
    queue: UploadQueue,
}

fn session(slugs: &[&str], publisher: Option<Arc<dyn PublisherPort>>) -> TestSession {
    let store = ContentStore::new(slugs.iter().map(|s| s.to_string()).collect());
    let queue = UploadQueue::new();
    let editor = Editor::new(store.clone(), queue.clone(), "public".to_string());
    let orchestrator = Arc::new(SaveOrchestrator::new(
        store.clone(),
        queue.clone(),
        publisher.clone(),
        None,
    ));
    let app = copydesk::create_app(ApiState {
        store: store.clone(),
        queue: queue.clone(),
        editor,
        orchestrator,
        publisher,
    });
    TestSession { app, store, queue }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let session = session(&["about"], None);
    let response = session
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_content_and_schema_endpoints() {
    let session = session(&["about"], None);
    session
        .store
        .seed("about", json!({ "hero": { "title": "Old" }, "tutors": [{}] }))
        .await;

    let response = session
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/content/about")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["hero"]["title"], "Old");

    let response = session
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/schema/about")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let fields = body["data"].as_array().unwrap();
    assert!(fields
        .iter()
        .any(|f| f["path"] == "tutors[0].name" && f["type"]["kind"] == "string"));

    let response = session
        .app
        .oneshot(
            Request::builder()
                .uri("/api/content/blog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_then_save_publishes_one_batch() {
    let publisher = Arc::new(RecordingPublisher::default());
    let session = session(&["about"], Some(publisher.clone()));
    session
        .store
        .seed("about", json!({ "hero": { "title": "Old", "subtitle": "s" } }))
        .await;

    let response = session
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/content/about/edit",
            json!({ "path": "hero.title", "action": "setText", "value": "New Title" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = session
        .app
        .clone()
        .oneshot(json_request("POST", "/api/save", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = publisher.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].updates.len(), 1);
    assert_eq!(requests[0].updates[0].slug, "about");
    assert_eq!(requests[0].updates[0].content["hero"]["title"], "New Title");
    assert_eq!(requests[0].updates[0].content["hero"]["subtitle"], "s");
    assert!(requests[0].images.is_empty());
    drop(requests);

    // Success cleared the dirty flag
    let response = session
        .app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["unsavedChanges"], false);
    assert_eq!(body["data"]["saveStatus"]["state"], "success");
}

#[tokio::test]
async fn test_failed_save_preserves_session() {
    let session = session(&["about"], Some(Arc::new(FailingPublisher)));
    session
        .store
        .seed("about", json!({ "hero": { "title": "Old" } }))
        .await;

    let response = session
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/content/about/edit",
            json!({ "path": "hero.title", "action": "setText", "value": "Edited" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    session
        .queue
        .queue(NewUpload {
            repo_path: "public/images/a.png".to_string(),
            public_path: "/images/a.png".to_string(),
            bytes: bytes::Bytes::from_static(b"png"),
        })
        .await;

    let response = session
        .app
        .clone()
        .oneshot(json_request("POST", "/api/save", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("remote write failed"));

    // Edits and the queue survive for a retry
    assert_eq!(session.queue.len().await, 1);
    assert_eq!(
        session.store.get("about").await.unwrap()["hero"]["title"],
        "Edited"
    );
    let response = session
        .app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["unsavedChanges"], true);
    assert_eq!(body["data"]["queuedImages"], 1);
    assert_eq!(body["data"]["saveStatus"]["state"], "error");
}

#[tokio::test]
async fn test_save_without_repository_config_attempts_no_remote_call() {
    let session = session(&["about"], None);
    let response = session
        .app
        .oneshot(json_request("POST", "/api/save", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("misconfigured"));
}

#[tokio::test]
async fn test_update_content_validation() {
    let session = session(&["about"], Some(Arc::new(RecordingPublisher::default())));

    // Missing content
    let response = session
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/update-content",
            json!({ "slug": "about" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty slug in batch form
    let response = session
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/update-content",
            json!({ "updates": [{ "slug": "", "content": {} }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Images with a missing targetPath
    let response = session
        .app
        .oneshot(json_request(
            "POST",
            "/api/update-content",
            json!({ "images": [{ "contentBase64": "aGk=" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_content_legacy_form_is_a_batch_of_one() {
    let publisher = Arc::new(RecordingPublisher::default());
    let session = session(&["about"], Some(publisher.clone()));

    let response = session
        .app
        .oneshot(json_request(
            "POST",
            "/api/update-content",
            json!({ "slug": "about", "content": { "hero": { "title": "T" } } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let requests = publisher.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].updates.len(), 1);
    assert_eq!(requests[0].updates[0].slug, "about");
    assert!(requests[0].images.is_empty());
}

#[tokio::test]
async fn test_update_content_without_config_is_misconfigured() {
    let session = session(&["about"], None);
    let response = session
        .app
        .oneshot(json_request(
            "POST",
            "/api/update-content",
            json!({ "slug": "about", "content": {} }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "server misconfigured");
}

fn multipart_request(uri: &str, parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
    let boundary = "copydesk-test-boundary";
    let mut body = String::new();
    for (name, file, value) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file {
            Some((filename, mime)) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                ));
                body.push_str(&format!("Content-Type: {mime}\r\n\r\n"));
            }
            None => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                ));
            }
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .uri(uri)
        .method("POST")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_image_rejects_traversal_paths() {
    let session = session(&["about"], Some(Arc::new(RecordingPublisher::default())));
    let response = session
        .app
        .oneshot(multipart_request(
            "/api/upload-image",
            &[
                ("targetPath", None, "public/../secrets.txt"),
                ("file", Some(("a.png", "image/png")), "bytes"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_image_publishes_single_file() {
    let publisher = Arc::new(RecordingPublisher::default());
    let session = session(&["about"], Some(publisher.clone()));
    let response = session
        .app
        .oneshot(multipart_request(
            "/api/upload-image",
            &[
                ("targetPath", None, "public/images/a.png"),
                ("file", Some(("a.png", "image/png")), "bytes"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let requests = publisher.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].images.len(), 1);
    assert_eq!(requests[0].images[0].target_path, "public/images/a.png");
}

#[tokio::test]
async fn test_non_png_pick_over_http_is_a_field_error() {
    let session = session(&["testimonials"], None);
    session
        .store
        .seed(
            "testimonials",
            json!({ "featured": [{ "avatarSrc": "/images/avatars/1.png" }] }),
        )
        .await;

    let response = session
        .app
        .oneshot(multipart_request(
            "/api/content/testimonials/images",
            &[
                ("path", None, "featured[0].avatarSrc"),
                ("file", Some(("photo.jpg", "image/jpeg")), "bytes"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(session.queue.is_empty().await);
}

#[tokio::test]
async fn test_gallery_pick_over_http_queues_and_previews() {
    let session = session(&["home"], None);
    session
        .store
        .seed(
            "home",
            json!({ "leaflet": { "pagesDir": "/leaflets", "pagesFormat": "page-", "pages": [] } }),
        )
        .await;

    let response = session
        .app
        .clone()
        .oneshot(multipart_request(
            "/api/content/home/images",
            &[
                ("path", None, "leaflet.pages"),
                ("file", Some(("c.png", "image/png")), "c"),
                ("file", Some(("a.png", "image/png")), "a"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["queued"],
        json!(["/leaflets/page-1.png", "/leaflets/page-2.png"])
    );

    // The preview URL serves the pending bytes until the queue is cleared
    let previews = session.queue.previews_for_directory("/leaflets/").await;
    assert_eq!(previews.len(), 2);
    let response = session
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(previews[0].as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");

    let response = session
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/queue")
                .method("DELETE")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = session
        .app
        .oneshot(
            Request::builder()
                .uri(previews[0].as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
