//! Story catalog: the last fetched snapshot of the remote story list.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::model::{NewStory, Story};
use crate::error::{Result, StoryError};
use crate::remote::RemoteService;
use crate::session::Session;

/// The stories currently held by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Stories in the order the service returned them
    pub stories: Vec<Story>,
    /// Set when the latest refresh failed and `stories` predates it
    pub stale: bool,
    /// When `stories` was fetched; `None` before the first successful fetch
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Holds the current story list and refreshes it on demand.
pub struct StoryCatalog {
    remote: Arc<dyn RemoteService>,
    snapshot: RwLock<CatalogSnapshot>,
}

impl StoryCatalog {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self {
            remote,
            snapshot: RwLock::new(CatalogSnapshot::default()),
        }
    }

    /// Fetches the full story list and replaces the held snapshot.
    ///
    /// On failure the previous stories are kept but the snapshot is marked
    /// stale, and `StoryError::Catalog` is returned.
    pub async fn fetch_all(&self) -> Result<Vec<Story>> {
        match self.remote.list_stories().await {
            Ok(stories) => {
                let mut snapshot = self.snapshot.write().await;
                *snapshot = CatalogSnapshot {
                    stories: stories.clone(),
                    stale: false,
                    fetched_at: Some(Utc::now()),
                };
                tracing::debug!("[StoryCatalog] Fetched {} stories", stories.len());
                Ok(stories)
            }
            Err(e) => {
                self.snapshot.write().await.stale = true;
                tracing::warn!("[StoryCatalog] Failed to fetch stories: {}", e);
                Err(as_catalog_error(e))
            }
        }
    }

    /// Submits a new story on behalf of `session`.
    ///
    /// The story is not inserted locally; call [`Self::fetch_all`] to observe
    /// it with its server-assigned id and position.
    ///
    /// # Errors
    ///
    /// - `StoryError::IllegalState` if `session` is `None`
    /// - `StoryError::Catalog` if the service rejects or fails the request
    pub async fn submit(&self, new_story: &NewStory, session: Option<&Session>) -> Result<Story> {
        let session = session
            .ok_or_else(|| StoryError::illegal_state("Submitting a story requires a session"))?;

        let created = self
            .remote
            .create_story(&session.token, new_story)
            .await
            .map_err(as_catalog_error)?;
        tracing::info!(
            "[StoryCatalog] '{}' submitted story {}",
            session.username,
            created.id
        );
        Ok(created)
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.snapshot.read().await.clone()
    }
}

fn as_catalog_error(err: StoryError) -> StoryError {
    match err {
        StoryError::Catalog(_) => err,
        other => StoryError::catalog(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeRemoteService, RemoteCall, story};
    use crate::remote::RemoteService;

    fn ids(stories: &[Story]) -> Vec<&str> {
        stories.iter().map(|s| s.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_fetch_preserves_server_order() {
        let remote = Arc::new(
            FakeRemoteService::new().with_stories(vec![story("2", "Second"), story("1", "First")]),
        );
        let catalog = StoryCatalog::new(remote);

        let stories = catalog.fetch_all().await.unwrap();

        assert_eq!(ids(&stories), vec!["2", "1"]);
        assert_eq!(ids(&catalog.snapshot().await.stories), vec!["2", "1"]);
    }

    #[tokio::test]
    async fn test_refetch_replaces_without_merging() {
        let remote = Arc::new(
            FakeRemoteService::new().with_stories(vec![story("1", "One"), story("2", "Two")]),
        );
        let catalog = StoryCatalog::new(remote.clone());
        catalog.fetch_all().await.unwrap();

        remote.set_stories(vec![story("3", "Three")]);
        catalog.fetch_all().await.unwrap();

        assert_eq!(ids(&catalog.snapshot().await.stories), vec!["3"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_marks_snapshot_stale() {
        let remote = Arc::new(FakeRemoteService::new().with_stories(vec![story("1", "One")]));
        let catalog = StoryCatalog::new(remote.clone());
        catalog.fetch_all().await.unwrap();

        remote.fail("list_stories");
        let err = catalog.fetch_all().await.unwrap_err();

        assert!(err.is_catalog());
        let snapshot = catalog.snapshot().await;
        assert!(snapshot.stale);
        assert_eq!(ids(&snapshot.stories), vec!["1"]);

        remote.recover("list_stories");
        catalog.fetch_all().await.unwrap();
        assert!(!catalog.snapshot().await.stale);
    }

    #[tokio::test]
    async fn test_submit_without_session_is_illegal_state() {
        let remote = Arc::new(FakeRemoteService::new());
        let catalog = StoryCatalog::new(remote.clone());

        let err = catalog
            .submit(&NewStory::new("t", "https://x.io", "a"), None)
            .await
            .unwrap_err();

        assert!(err.is_illegal_state());
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_does_not_insert_locally() {
        let remote = Arc::new(FakeRemoteService::new().with_account("alice", "pw", "Alice"));
        let catalog = StoryCatalog::new(remote.clone());
        catalog.fetch_all().await.unwrap();
        let session = Session::from(remote.authenticate("alice", "pw").await.unwrap());

        let created = catalog
            .submit(
                &NewStory::new("Rust 2024", "https://blog.rust-lang.org", "Rust Team"),
                Some(&session),
            )
            .await
            .unwrap();

        assert!(catalog.snapshot().await.stories.is_empty());
        assert!(remote.calls().contains(&RemoteCall::CreateStory {
            token: session.token.clone(),
            title: "Rust 2024".to_string(),
        }));

        let refreshed = catalog.fetch_all().await.unwrap();
        assert_eq!(refreshed[0].id, created.id);
        assert_eq!(refreshed[0].submitted_by, "alice");
    }
}
