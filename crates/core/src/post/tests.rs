//! Post service tests with a mocked storage backend and an in-memory repository.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use glimpse_shared::AppError;
use glimpse_shared::types::PageRequest;
use proptest::prelude::*;
use rstest::rstest;
use uuid::Uuid;

use super::*;
use crate::storage::{MockMediaStorage, StorageError, StorageService, StoredMedia};

#[derive(Default)]
struct MemoryPosts {
    posts: Mutex<Vec<Post>>,
    emails: HashMap<Uuid, String>,
    fail_create: bool,
}

impl MemoryPosts {
    fn with_users(users: &[(Uuid, &str)]) -> Self {
        Self {
            emails: users.iter().map(|(id, e)| (*id, (*e).to_string())).collect(),
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    fn seed(&self, user_id: Uuid, minute: u32) -> Post {
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            caption: format!("post at {minute}"),
            url: format!("https://cdn/{minute}.png"),
            file_type: FileType::Image,
            file_name: format!("{minute}.png"),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0).unwrap(),
        };
        self.posts.lock().unwrap().push(post.clone());
        post
    }

    fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl PostRepository for MemoryPosts {
    async fn create(&self, input: NewPost) -> Result<Post, PostError> {
        if self.fail_create {
            return Err(PostError::repository("database is locked"));
        }
        let post = Post {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            caption: input.caption,
            url: input.url,
            file_type: input.file_type,
            file_name: input.file_name,
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, PostError> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn list_newest_first(&self, page: Option<PageRequest>) -> Result<Vec<Post>, PostError> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(match page {
            Some(page) => posts
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap())
                .take(usize::try_from(page.limit()).unwrap())
                .collect(),
            None => posts,
        })
    }

    async fn count(&self) -> Result<u64, PostError> {
        Ok(self.len() as u64)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PostError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn author_emails(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, PostError> {
        Ok(self
            .emails
            .iter()
            .filter(|(id, _)| user_ids.contains(id))
            .map(|(id, e)| (*id, e.clone()))
            .collect())
    }
}

fn service(backend: MockMediaStorage, repo: Arc<MemoryPosts>) -> PostService<MemoryPosts> {
    let storage = StorageService::with_backend(Arc::new(backend), Duration::from_secs(5));
    PostService::new(Arc::new(storage), repo)
}

async fn upload_input(user_id: Uuid, file_name: &str, content_type: &str) -> UploadInput {
    let mut staged = StagedFile::create(file_name).unwrap();
    staged.write_chunk(b"media-").await.unwrap();
    staged.write_chunk(b"bytes").await.unwrap();
    UploadInput {
        user_id,
        file_name: file_name.into(),
        content_type: content_type.into(),
        caption: "hello".into(),
        staged,
    }
}

fn stored(status: u16) -> StoredMedia {
    StoredMedia {
        file_id: Some("file_1".into()),
        name: "cat_a1B2.png".into(),
        url: "https://ik.imagekit.io/demo/cat_a1B2.png".into(),
        status,
    }
}

#[tokio::test]
async fn test_upload_creates_post() {
    let user = Uuid::new_v4();
    let repo = Arc::new(MemoryPosts::default());

    let mut backend = MockMediaStorage::new();
    backend
        .expect_upload()
        .withf(|u| {
            u.file_name == "cat.png"
                && u.options.use_unique_file_name
                && u.options.tags == ["backend-upload"]
                && u.path.extension().is_some_and(|e| e == "png")
                && std::fs::read(&u.path).is_ok_and(|b| b == b"media-bytes")
        })
        .times(1)
        .returning(|_| Ok(stored(200)));

    let post = service(backend, repo.clone())
        .upload(upload_input(user, "cat.png", "image/png").await)
        .await
        .unwrap();

    assert_eq!(post.user_id, user);
    assert_eq!(post.caption, "hello");
    assert_eq!(post.url, "https://ik.imagekit.io/demo/cat_a1B2.png");
    assert_eq!(post.file_name, "cat_a1B2.png");
    assert_eq!(post.file_type, FileType::Image);
    assert_eq!(repo.len(), 1);
}

#[tokio::test]
async fn test_video_upload_is_classified() {
    let repo = Arc::new(MemoryPosts::default());
    let mut backend = MockMediaStorage::new();
    backend.expect_upload().returning(|_| Ok(stored(200)));

    let post = service(backend, repo)
        .upload(upload_input(Uuid::new_v4(), "clip.mp4", "video/mp4").await)
        .await
        .unwrap();

    assert_eq!(post.file_type, FileType::Video);
}

fn capturing_backend(
    seen: Arc<Mutex<Option<PathBuf>>>,
    result: fn() -> Result<StoredMedia, StorageError>,
) -> MockMediaStorage {
    let mut backend = MockMediaStorage::new();
    backend.expect_upload().returning(move |u| {
        assert!(u.path.exists());
        *seen.lock().unwrap() = Some(u.path);
        result()
    });
    backend
}

#[rstest]
#[case::success(|| Ok(stored(200)))]
#[case::rejected(|| Ok(stored(201)))]
#[case::failure(|| Err(StorageError::Request("connection reset".into())))]
#[tokio::test]
async fn test_staging_file_is_removed(#[case] result: fn() -> Result<StoredMedia, StorageError>) {
    let seen = Arc::new(Mutex::new(None));
    let backend = capturing_backend(seen.clone(), result);

    let _ = service(backend, Arc::new(MemoryPosts::default()))
        .upload(upload_input(Uuid::new_v4(), "cat.png", "image/png").await)
        .await;

    let path = seen.lock().unwrap().clone().unwrap();
    assert!(!path.exists(), "staging file {} was left behind", path.display());
}

#[tokio::test]
async fn test_staging_file_is_removed_when_insert_fails() {
    let seen = Arc::new(Mutex::new(None));
    let backend = capturing_backend(seen.clone(), || Ok(stored(200)));

    let err = service(backend, Arc::new(MemoryPosts::failing()))
        .upload(upload_input(Uuid::new_v4(), "cat.png", "image/png").await)
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::Repository(_)));
    assert_eq!(AppError::from(err).status_code(), 500);
    let path = seen.lock().unwrap().clone().unwrap();
    assert!(!path.exists(), "staging file {} was left behind", path.display());
}

#[tokio::test]
async fn test_non_200_status_is_an_error() {
    let repo = Arc::new(MemoryPosts::default());
    let mut backend = MockMediaStorage::new();
    backend.expect_upload().returning(|_| Ok(stored(201)));

    let err = service(backend, repo.clone())
        .upload(upload_input(Uuid::new_v4(), "cat.png", "image/png").await)
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::UploadRejected { status: 201 }));
    assert_eq!(err.to_string(), "storage upload failed with status 201");
    assert_eq!(AppError::from(err).status_code(), 500);
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_storage_failure_creates_nothing() {
    let repo = Arc::new(MemoryPosts::default());
    let mut backend = MockMediaStorage::new();
    backend.expect_upload().returning(|_| {
        Err(StorageError::UnexpectedStatus {
            status: 403,
            message: "Your account cannot be authenticated.".into(),
        })
    });

    let err = service(backend, repo.clone())
        .upload(upload_input(Uuid::new_v4(), "cat.png", "image/png").await)
        .await
        .unwrap_err();

    assert_eq!(AppError::from(err).status_code(), 500);
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_feed_marks_ownership_and_authors() {
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    let ghost = Uuid::new_v4();
    let repo = Arc::new(MemoryPosts::with_users(&[
        (alice, "alice@example.com"),
        (bob, "bob@example.com"),
    ]));
    repo.seed(alice, 1);
    repo.seed(bob, 3);
    repo.seed(ghost, 2);

    let feed = service(MockMediaStorage::new(), repo)
        .feed(alice, None)
        .await
        .unwrap();

    assert!(feed.meta.is_none());
    let emails: Vec<&str> = feed.posts.iter().map(|p| p.email.as_str()).collect();
    assert_eq!(emails, ["bob@example.com", UNKNOWN_AUTHOR, "alice@example.com"]);
    let owned: Vec<bool> = feed.posts.iter().map(|p| p.is_owner).collect();
    assert_eq!(owned, [false, false, true]);
}

#[tokio::test]
async fn test_feed_pagination() {
    let alice = Uuid::new_v4();
    let repo = Arc::new(MemoryPosts::with_users(&[(alice, "alice@example.com")]));
    for minute in 0..5 {
        repo.seed(alice, minute);
    }

    let feed = service(MockMediaStorage::new(), repo)
        .feed(alice, Some(PageRequest::from_parts(Some(2), Some(2))))
        .await
        .unwrap();

    let captions: Vec<&str> = feed.posts.iter().map(|p| p.caption.as_str()).collect();
    assert_eq!(captions, ["post at 2", "post at 1"]);
    let meta = feed.meta.unwrap();
    assert_eq!(meta.total, 5);
    assert_eq!(meta.total_pages, 3);
}

#[tokio::test]
async fn test_feed_empty() {
    let feed = service(MockMediaStorage::new(), Arc::new(MemoryPosts::default()))
        .feed(Uuid::new_v4(), None)
        .await
        .unwrap();

    assert!(feed.posts.is_empty());
    assert_eq!(serde_json::to_value(&feed).unwrap(), serde_json::json!({"posts": []}));
}

#[tokio::test]
async fn test_delete_by_owner() {
    let alice = Uuid::new_v4();
    let repo = Arc::new(MemoryPosts::default());
    let post = repo.seed(alice, 0);

    let ack = service(MockMediaStorage::new(), repo.clone())
        .delete(alice, &post.id.to_string())
        .await
        .unwrap();

    assert_eq!(ack, DeleteAck::deleted());
    assert_eq!(ack.message, "Post Deleted Successfully");
    assert_eq!(repo.len(), 0);
}

#[tokio::test]
async fn test_delete_by_other_user_is_forbidden() {
    let repo = Arc::new(MemoryPosts::default());
    let post = repo.seed(Uuid::new_v4(), 0);

    let err = service(MockMediaStorage::new(), repo.clone())
        .delete(Uuid::new_v4(), &post.id.to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::Forbidden));
    assert_eq!(repo.len(), 1);
    assert_eq!(AppError::from(err).status_code(), 403);
}

#[rstest]
#[case::missing("6f1c2f4e-3c1b-4a7e-9d5e-0b8f8a1d2c3e", 404)]
#[case::malformed("not-a-uuid", 400)]
#[tokio::test]
async fn test_delete_errors(#[case] raw_id: &str, #[case] status: u16) {
    let err = service(MockMediaStorage::new(), Arc::new(MemoryPosts::default()))
        .delete(Uuid::new_v4(), raw_id)
        .await
        .unwrap_err();

    assert_eq!(AppError::from(err).status_code(), status);
}

#[test]
fn test_timeout_maps_to_gateway_timeout() {
    let err = PostError::Storage(StorageError::Timeout { secs: 30 });
    assert_eq!(AppError::from(err).status_code(), 504);
}

#[rstest]
#[case("video/mp4", FileType::Video)]
#[case("VIDEO/quicktime", FileType::Video)]
#[case("image/jpeg", FileType::Image)]
#[case("application/octet-stream", FileType::Image)]
#[case("", FileType::Image)]
fn test_file_type_from_content_type(#[case] content_type: &str, #[case] expected: FileType) {
    assert_eq!(FileType::from_content_type(content_type), expected);
}

proptest! {
    #[test]
    fn prop_video_prefix_decides_file_type(subtype in "[a-z0-9.+-]{1,20}", major in "[a-z]{1,12}") {
        prop_assert_eq!(
            FileType::from_content_type(&format!("video/{subtype}")),
            FileType::Video
        );
        let expected = if major == "video" { FileType::Video } else { FileType::Image };
        prop_assert_eq!(FileType::from_content_type(&format!("{major}/{subtype}")), expected);
    }
}
