//! Sequential upload of staged pages to object storage
//!
//! Pages are written one at a time in final page order, so the returned URL
//! list lines up with the input index for index. A concurrent version would
//! have to tag each result with its page index to keep that guarantee.

use crate::error::UploadError;
use crate::staging::StagedImage;
use crate::storage::{ScopedStorage, StorageProvider};
use crate::types::OwnerId;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Root prefix for all book page objects
const BOOKS_PREFIX: &str = "books";

/// Namespace used when a title has no usable characters
const FALLBACK_NAMESPACE: &str = "untitled";

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Derive the storage namespace for a book title
///
/// Lowercases, drops everything outside `[a-z0-9\s-]`, and collapses
/// whitespace runs into single hyphens.
pub fn namespace_for(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = DISALLOWED.replace_all(&lowered, "");
    let slug = WHITESPACE.replace_all(&stripped, "-").into_owned();
    if slug.is_empty() {
        FALLBACK_NAMESPACE.to_string()
    } else {
        slug
    }
}

/// Storage key for the page at 0-based `index`
pub fn page_key(namespace: &str, index: usize, extension: Option<&str>) -> String {
    let page = index + 1;
    let extension = extension
        .map(|e| e.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
        .filter(|e| !e.is_empty());
    match extension {
        Some(ext) => format!("{BOOKS_PREFIX}/{namespace}/page{page}.{ext}"),
        None => format!("{BOOKS_PREFIX}/{namespace}/page{page}"),
    }
}

/// Progress report emitted after each stored page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub completed: usize,
    pub total: usize,
    pub key: String,
}

/// Uploads staged pages and resolves their public URLs
#[derive(Clone)]
pub struct UploadPipeline {
    storage: Arc<dyn StorageProvider>,
}

impl UploadPipeline {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self { storage }
    }

    /// The same pipeline, writing only inside `owner`'s storage scope
    pub fn for_owner(&self, owner: &OwnerId) -> Self {
        Self::new(Arc::new(ScopedStorage::for_owner(self.storage.clone(), owner)))
    }

    /// Upload every page, returning URLs in page order
    pub async fn run(
        &self,
        title: &str,
        images: &[StagedImage],
    ) -> std::result::Result<Vec<String>, UploadError> {
        self.run_with_progress(title, images, |_| {}).await
    }

    /// Upload every page, reporting progress after each one
    ///
    /// The first failure aborts the run. Pages stored before it are left in
    /// place and no URLs are returned.
    pub async fn run_with_progress<F>(
        &self,
        title: &str,
        images: &[StagedImage],
        mut on_progress: F,
    ) -> std::result::Result<Vec<String>, UploadError>
    where
        F: FnMut(UploadProgress),
    {
        let namespace = namespace_for(title);
        let total = images.len();
        let mut urls = Vec::with_capacity(total);

        tracing::info!(namespace = %namespace, pages = total, "Uploading book pages");

        for (index, image) in images.iter().enumerate() {
            let key = page_key(&namespace, index, image.file.extension());
            let fail = |source| UploadError {
                page: index + 1,
                key: key.clone(),
                source,
            };

            if let Err(e) = self.storage.write(&key, image.file.data.clone()).await {
                tracing::warn!(key = %key, error = %e, "Page upload failed, aborting");
                return Err(fail(e));
            }
            let url = self.storage.public_url(&key).await.map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Could not resolve page URL, aborting");
                fail(e)
            })?;

            tracing::debug!(key = %key, url = %url, "Stored page");
            urls.push(url);
            on_progress(UploadProgress {
                completed: index + 1,
                total,
                key,
            });
        }

        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::{PreviewRegistry, SelectedFile};
    use crate::storage::MemoryStorage;

    fn staged(names: &[&str]) -> Vec<StagedImage> {
        let registry = PreviewRegistry::new();
        names
            .iter()
            .map(|n| {
                StagedImage::new(
                    SelectedFile::new(*n, n.as_bytes().to_vec()),
                    registry.allocate(),
                )
            })
            .collect()
    }

    #[test]
    fn test_namespace_for() {
        assert_eq!(namespace_for("Trip"), "trip");
        assert_eq!(namespace_for("My  Summer\tTrip!"), "my-summer-trip");
        assert_eq!(namespace_for("Hello-World 2024"), "hello-world-2024");
        assert_eq!(namespace_for("Café"), "caf");
        assert_eq!(namespace_for("!!!"), "untitled");
    }

    #[test]
    fn test_page_key() {
        assert_eq!(page_key("trip", 0, Some("jpg")), "books/trip/page1.jpg");
        assert_eq!(page_key("trip", 9, Some("PNG")), "books/trip/page10.PNG");
        assert_eq!(page_key("trip", 2, None), "books/trip/page3");
    }

    #[tokio::test]
    async fn test_upload_preserves_order() {
        let storage = Arc::new(MemoryStorage::new());
        let pipeline = UploadPipeline::new(storage.clone());
        let images = staged(&["b.png", "a.jpg", "c.gif"]);

        let urls = pipeline.run("Trip", &images).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "memory://books/trip/page1.png",
                "memory://books/trip/page2.jpg",
                "memory://books/trip/page3.gif",
            ]
        );
        assert_eq!(storage.read("books/trip/page2.jpg").await.unwrap(), b"a.jpg");
    }

    #[tokio::test]
    async fn test_upload_reports_progress() {
        let pipeline = UploadPipeline::new(Arc::new(MemoryStorage::new()));
        let images = staged(&["a.jpg", "b.jpg"]);
        let mut seen = Vec::new();

        pipeline
            .run_with_progress("Trip", &images, |p| seen.push((p.completed, p.total)))
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[tokio::test]
    async fn test_owner_pipelines_do_not_collide() {
        let storage = Arc::new(MemoryStorage::new());
        let shared = UploadPipeline::new(storage.clone());

        let alice = shared
            .for_owner(&OwnerId::new("alice"))
            .run("Trip", &staged(&["alice.png"]))
            .await
            .unwrap();
        let bob = shared
            .for_owner(&OwnerId::new("bob"))
            .run("Trip", &staged(&["bob.png"]))
            .await
            .unwrap();

        assert_eq!(alice, vec!["memory://users/alice/books/trip/page1.png"]);
        assert_eq!(bob, vec!["memory://users/bob/books/trip/page1.png"]);
        assert_eq!(
            storage.read("users/alice/books/trip/page1.png").await.unwrap(),
            b"alice.png"
        );
    }

    #[tokio::test]
    async fn test_upload_empty_input() {
        let pipeline = UploadPipeline::new(Arc::new(MemoryStorage::new()));
        assert!(pipeline.run("Trip", &[]).await.unwrap().is_empty());
    }
}
