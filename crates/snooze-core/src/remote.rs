//! Remote service boundary.
//!
//! `RemoteService` is the only way the synchronization layer talks to the
//! story-sharing backend. The HTTP binding lives in
//! `snooze_infrastructure::http_remote`; tests use in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::session::{Account, Session};
use crate::story::{NewStory, Story};

/// Operations consumed from the story-sharing service.
///
/// Error mapping expected from implementations:
/// - `authenticate` / `create_account`: rejected input → `StoryError::Auth`
/// - `list_stories` / `create_story`: failures → `StoryError::Catalog`
/// - favorite operations: failures → `StoryError::Favorite`
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Account>;

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account>;

    /// Resolves the account behind a stored token.
    ///
    /// Returns `Ok(None)` when the service rejects the token (invalid or
    /// expired); `Err` only for transport failures.
    async fn resolve_user(&self, token: &str, username: &str) -> Result<Option<Account>>;

    /// Full story list in server order.
    async fn list_stories(&self) -> Result<Vec<Story>>;

    async fn create_story(&self, token: &str, story: &NewStory) -> Result<Story>;

    async fn mark_favorite(&self, session: &Session, story_id: &str) -> Result<()>;

    async fn unmark_favorite(&self, session: &Session, story_id: &str) -> Result<()>;

    /// Authoritative set of story ids the session's user has favorited.
    async fn list_favorites(&self, session: &Session) -> Result<Vec<String>>;
}
