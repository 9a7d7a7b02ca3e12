//! Optimistic favorite toggling with rollback.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::state::{FavoriteMark, FavoriteState};
use crate::error::{Result, StoryError};
use crate::remote::RemoteService;
use crate::session::Session;

/// A toggle whose optimistic flip has been applied but whose remote call has
/// not been issued yet. Produced by [`FavoriteController::begin_toggle`].
#[derive(Debug, Clone)]
pub struct PendingToggle {
    story_id: String,
    from: FavoriteMark,
    to: FavoriteMark,
    session: Session,
}

impl PendingToggle {
    pub fn story_id(&self) -> &str {
        &self.story_id
    }

    /// The mark shown while the toggle is in flight.
    pub fn target(&self) -> FavoriteMark {
        self.to
    }
}

#[derive(Default)]
struct Marks {
    states: HashMap<String, FavoriteState>,
    notice: Option<String>,
}

/// Applies favorite toggles for the current session.
///
/// The toggle is two-phase: [`begin_toggle`](Self::begin_toggle) flips the
/// indicator immediately, [`complete`](Self::complete) issues exactly one
/// remote call and settles or rolls back. [`toggle`](Self::toggle) runs both.
pub struct FavoriteController {
    remote: Arc<dyn RemoteService>,
    marks: Mutex<Marks>,
}

impl FavoriteController {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self {
            remote,
            marks: Mutex::new(Marks::default()),
        }
    }

    /// Toggles the favorite mark of `story_id` and waits for the outcome.
    ///
    /// Returns the settled mark. A toggle on a story that is already pending
    /// is ignored and returns the pending indicator.
    pub async fn toggle(&self, session: Option<&Session>, story_id: &str) -> Result<FavoriteMark> {
        match self.begin_toggle(session, story_id).await? {
            Some(pending) => self.complete(pending).await,
            None => Ok(self.indicator(story_id).await),
        }
    }

    /// Phase one: flips the indicator of `story_id` to its opposite.
    ///
    /// Returns `Ok(None)` when a toggle of the same story is still in flight.
    ///
    /// # Errors
    ///
    /// `StoryError::IllegalState` when called without a session; nothing changes.
    pub async fn begin_toggle(
        &self,
        session: Option<&Session>,
        story_id: &str,
    ) -> Result<Option<PendingToggle>> {
        let session = session
            .ok_or_else(|| StoryError::illegal_state("Toggling a favorite requires a session"))?;

        let mut marks = self.marks.lock().await;
        let current = marks.states.get(story_id).copied().unwrap_or_default();
        if current.is_pending() {
            tracing::debug!(
                "[FavoriteController] Toggle of {} ignored: already in flight",
                story_id
            );
            return Ok(None);
        }

        let from = current.indicator();
        let to = from.toggled();
        marks
            .states
            .insert(story_id.to_string(), FavoriteState::Pending { from, to });

        Ok(Some(PendingToggle {
            story_id: story_id.to_string(),
            from,
            to,
            session: session.clone(),
        }))
    }

    /// Phase two: issues the remote mutation and settles the state.
    ///
    /// # Errors
    ///
    /// `StoryError::Favorite` when the remote call fails; the mark has been
    /// rolled back to its pre-toggle value and a notice is queued.
    pub async fn complete(&self, pending: PendingToggle) -> Result<FavoriteMark> {
        let PendingToggle {
            story_id,
            from,
            to,
            session,
        } = pending;

        let outcome = match to {
            FavoriteMark::Favorited => self.remote.mark_favorite(&session, &story_id).await,
            FavoriteMark::NotFavorited => self.remote.unmark_favorite(&session, &story_id).await,
        };

        let mut marks = self.marks.lock().await;
        let still_pending =
            marks.states.get(&story_id).copied() == Some(FavoriteState::Pending { from, to });

        match outcome {
            Ok(()) => {
                if still_pending {
                    marks
                        .states
                        .insert(story_id.clone(), FavoriteState::settled(to));
                }
                tracing::info!("[FavoriteController] {} is now {:?}", story_id, to);
                Ok(to)
            }
            Err(e) => {
                if still_pending {
                    marks
                        .states
                        .insert(story_id.clone(), FavoriteState::settled(from));
                }
                let action = if to.is_favorited() {
                    "favorite"
                } else {
                    "unfavorite"
                };
                marks.notice = Some(format!("Could not {} story {}: {}", action, story_id, e));
                tracing::warn!(
                    "[FavoriteController] Rolled back {} to {:?}: {}",
                    story_id,
                    from,
                    e
                );
                Err(match e {
                    StoryError::Favorite(_) => e,
                    other => StoryError::favorite(other.to_string()),
                })
            }
        }
    }

    /// Replaces settled marks with the server's authoritative favorite set.
    ///
    /// Stories with a toggle in flight keep their pending state.
    pub async fn reconcile<I>(&self, favorites: I)
    where
        I: IntoIterator<Item = String>,
    {
        let authoritative: HashSet<String> = favorites.into_iter().collect();
        let mut marks = self.marks.lock().await;

        marks.states.retain(|_, state| state.is_pending());
        for story_id in authoritative {
            marks
                .states
                .entry(story_id)
                .or_insert(FavoriteState::Favorited);
        }
    }

    /// Fetches the session's favorites from the service and reconciles.
    pub async fn sync(&self, session: &Session) -> Result<()> {
        let favorites = self.remote.list_favorites(session).await.map_err(|e| match e {
            StoryError::Favorite(_) => e,
            other => StoryError::favorite(other.to_string()),
        })?;
        tracing::debug!(
            "[FavoriteController] '{}' has {} favorites",
            session.username,
            favorites.len()
        );
        self.reconcile(favorites).await;
        Ok(())
    }

    pub async fn indicator(&self, story_id: &str) -> FavoriteMark {
        self.state(story_id).await.indicator()
    }

    pub async fn state(&self, story_id: &str) -> FavoriteState {
        self.marks
            .lock()
            .await
            .states
            .get(story_id)
            .copied()
            .unwrap_or_default()
    }

    /// Forgets every mark, e.g. when the session ends.
    pub async fn clear(&self) {
        let mut marks = self.marks.lock().await;
        marks.states.clear();
        marks.notice = None;
    }

    /// Takes the pending failure notice, if any.
    pub async fn take_notice(&self) -> Option<String> {
        self.marks.lock().await.notice.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeRemoteService, RemoteCall};
    use chrono::Utc;

    fn session(token: &str) -> Session {
        Session {
            token: token.to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            created_at: Utc::now(),
        }
    }

    fn remote_with_alice() -> Arc<FakeRemoteService> {
        Arc::new(FakeRemoteService::new().with_account("alice", "pw", "Alice"))
    }

    fn mark_calls(remote: &FakeRemoteService) -> Vec<RemoteCall> {
        remote
            .calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    RemoteCall::MarkFavorite { .. } | RemoteCall::UnmarkFavorite { .. }
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_toggle_flips_immediately_and_calls_once() {
        let remote = remote_with_alice();
        let controller = FavoriteController::new(remote.clone());
        let t1 = session("token-alice");

        let pending = controller
            .begin_toggle(Some(&t1), "S1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(controller.indicator("S1").await, FavoriteMark::Favorited);
        assert!(mark_calls(&remote).is_empty());

        let settled = controller.complete(pending).await.unwrap();

        assert_eq!(settled, FavoriteMark::Favorited);
        assert_eq!(controller.state("S1").await, FavoriteState::Favorited);
        assert_eq!(
            mark_calls(&remote),
            vec![RemoteCall::MarkFavorite {
                token: "token-alice".to_string(),
                story_id: "S1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_toggle_rolls_back() {
        let remote = remote_with_alice();
        remote.fail("favorite");
        let controller = FavoriteController::new(remote.clone());
        let t1 = session("token-alice");

        let err = controller.toggle(Some(&t1), "S1").await.unwrap_err();

        assert!(err.is_favorite());
        assert_eq!(controller.state("S1").await, FavoriteState::NotFavorited);
        assert_eq!(mark_calls(&remote).len(), 1);
        let notice = controller.take_notice().await.unwrap();
        assert!(notice.contains("S1"));
        assert!(controller.take_notice().await.is_none());
    }

    #[tokio::test]
    async fn test_unfavorite_issues_remove() {
        let remote = remote_with_alice();
        remote.set_favorites("alice", &["S2"]);
        let controller = FavoriteController::new(remote.clone());
        controller.reconcile(vec!["S2".to_string()]).await;

        let settled = controller
            .toggle(Some(&session("token-alice")), "S2")
            .await
            .unwrap();

        assert_eq!(settled, FavoriteMark::NotFavorited);
        assert!(remote.favorites_of("alice").is_empty());
        assert!(matches!(
            mark_calls(&remote).as_slice(),
            [RemoteCall::UnmarkFavorite { .. }]
        ));
    }

    #[tokio::test]
    async fn test_toggle_without_session_is_illegal_state() {
        let remote = remote_with_alice();
        let controller = FavoriteController::new(remote.clone());

        let err = controller.toggle(None, "S1").await.unwrap_err();

        assert!(err.is_illegal_state());
        assert_eq!(controller.state("S1").await, FavoriteState::NotFavorited);
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_second_toggle_while_pending_is_ignored() {
        let remote = remote_with_alice();
        let controller = FavoriteController::new(remote.clone());
        let t1 = session("token-alice");

        let pending = controller
            .begin_toggle(Some(&t1), "S1")
            .await
            .unwrap()
            .unwrap();
        assert!(controller.begin_toggle(Some(&t1), "S1").await.unwrap().is_none());
        controller.complete(pending).await.unwrap();

        assert_eq!(mark_calls(&remote).len(), 1);
        assert_eq!(controller.indicator("S1").await, FavoriteMark::Favorited);
    }

    #[tokio::test]
    async fn test_reconcile_replaces_settled_and_keeps_pending() {
        let remote = remote_with_alice();
        let controller = FavoriteController::new(remote.clone());
        let t1 = session("token-alice");
        controller.reconcile(vec!["S1".to_string()]).await;
        let pending = controller
            .begin_toggle(Some(&t1), "S3")
            .await
            .unwrap()
            .unwrap();

        controller
            .reconcile(vec!["S2".to_string(), "S3".to_string()])
            .await;

        assert_eq!(controller.indicator("S1").await, FavoriteMark::NotFavorited);
        assert_eq!(controller.indicator("S2").await, FavoriteMark::Favorited);
        assert!(controller.state("S3").await.is_pending());
        controller.complete(pending).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_drops_all_marks() {
        let controller = FavoriteController::new(remote_with_alice());
        controller.reconcile(vec!["S1".to_string()]).await;

        controller.clear().await;

        assert_eq!(controller.indicator("S1").await, FavoriteMark::NotFavorited);
    }
}
