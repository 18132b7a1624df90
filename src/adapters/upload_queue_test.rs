use super::upload_queue::{NewUpload, UploadQueue};
use bytes::Bytes;

fn upload(repo_path: &str, public_path: &str, payload: &str) -> NewUpload {
    NewUpload {
        repo_path: repo_path.to_string(),
        public_path: public_path.to_string(),
        bytes: Bytes::from(payload.as_bytes().to_vec()),
    }
}

#[tokio::test]
async fn test_queue_and_list() {
    let queue = UploadQueue::new();
    queue
        .queue(upload("public/images/a.png", "/images/a.png", "first"))
        .await;
    queue
        .queue(upload("public/images/b.png", "/images/b.png", "second"))
        .await;

    let entries = queue.list().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].repo_path, "public/images/a.png");
    assert_eq!(entries[1].public_path, "/images/b.png");
    assert_eq!(queue.live_preview_count().await, 2);
}

#[tokio::test]
async fn test_same_destination_replaces_entry_and_preview() {
    let queue = UploadQueue::new();
    queue
        .queue(upload("public/images/a.png", "/images/a.png", "first"))
        .await;
    let old_preview = queue.preview_for("/images/a.png").await.unwrap();

    queue
        .queue(upload("public/images/a.png", "/images/a.png", "second"))
        .await;

    // Exactly one entry, the second file's contents, one live preview
    assert_eq!(queue.len().await, 1);
    let writes = queue.pending_writes().await;
    assert_eq!(writes[0].1.as_ref(), b"second");
    assert_eq!(queue.live_preview_count().await, 1);

    // The first preview handle was released
    let old_token = old_preview.rsplit('/').next().unwrap();
    assert!(queue.preview_bytes(old_token).await.is_none());
    let new_preview = queue.preview_for("/images/a.png").await.unwrap();
    assert_ne!(old_preview, new_preview);
}

#[tokio::test]
async fn test_clear_releases_every_preview() {
    let queue = UploadQueue::new();
    queue
        .queue(upload("public/images/a.png", "/images/a.png", "a"))
        .await;
    queue
        .queue(upload("public/images/b.png", "/images/b.png", "b"))
        .await;

    queue.clear().await;

    assert!(queue.list().await.is_empty());
    assert!(queue.is_empty().await);
    assert_eq!(queue.live_preview_count().await, 0);
}

#[tokio::test]
async fn test_queue_many_preserves_caller_order() {
    let queue = UploadQueue::new();
    queue
        .queue_many(vec![
            upload("public/leaflets/page-1.png", "/leaflets/page-1.png", "c"),
            upload("public/leaflets/page-2.png", "/leaflets/page-2.png", "a"),
            upload("public/leaflets/page-3.png", "/leaflets/page-3.png", "b"),
        ])
        .await;

    let previews = queue.previews_for_directory("/leaflets/").await;
    assert_eq!(previews.len(), 3);

    let writes = queue.pending_writes().await;
    let paths: Vec<&str> = writes.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        [
            "public/leaflets/page-1.png",
            "public/leaflets/page-2.png",
            "public/leaflets/page-3.png",
        ]
    );
}

#[tokio::test]
async fn test_previews_for_directory_without_matches_is_empty() {
    let queue = UploadQueue::new();
    queue
        .queue(upload("public/images/a.png", "/images/a.png", "a"))
        .await;
    assert!(queue.previews_for_directory("/leaflets/").await.is_empty());
}

#[tokio::test]
async fn test_preview_bytes_served_until_released() {
    let queue = UploadQueue::new();
    queue
        .queue(upload("public/images/a.png", "/images/a.png", "payload"))
        .await;

    let url = queue.preview_for("/images/a.png").await.unwrap();
    let token = url.rsplit('/').next().unwrap();
    assert_eq!(
        queue.preview_bytes(token).await.unwrap().as_ref(),
        b"payload"
    );

    queue.clear().await;
    assert!(queue.preview_bytes(token).await.is_none());
}
