//! Event handling and rendering.

use std::sync::Arc;
use tokio::sync::Mutex;

use snooze_core::error::{Result, StoryError};
use snooze_core::favorite::FavoriteController;
use snooze_core::remote::RemoteService;
use snooze_core::session::{PersistentCredentialStore, Session, SessionManager};
use snooze_core::storage::KeyValueStore;
use snooze_core::story::{NewStory, StoryCatalog};

use crate::event::UiEvent;
use crate::renderer::Renderer;
use crate::view::{NavState, Panels, Profile, StoryRow, ViewModel};

#[derive(Debug, Default)]
struct UiState {
    panels: Panels,
    notice: Option<String>,
}

/// Maps user triggers onto the session, catalog and favorite components and
/// re-renders after every change.
///
/// Reads the session from memory only; persistence is left to
/// [`SessionManager`].
pub struct ViewController {
    session: Arc<SessionManager>,
    catalog: Arc<StoryCatalog>,
    favorites: Arc<FavoriteController>,
    renderer: Arc<dyn Renderer>,
    ui: Mutex<UiState>,
}

impl ViewController {
    pub fn new(
        session: Arc<SessionManager>,
        catalog: Arc<StoryCatalog>,
        favorites: Arc<FavoriteController>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            session,
            catalog,
            favorites,
            renderer,
            ui: Mutex::new(UiState::default()),
        }
    }

    /// Wires every component over one remote service and key/value namespace.
    pub fn from_services(
        remote: Arc<dyn RemoteService>,
        kv: Arc<dyn KeyValueStore>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let store = PersistentCredentialStore::new(kv);
        Self::new(
            Arc::new(SessionManager::new(remote.clone(), store)),
            Arc::new(StoryCatalog::new(remote.clone())),
            Arc::new(FavoriteController::new(remote)),
            renderer,
        )
    }

    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Fetches the catalog and restores the session concurrently.
    ///
    /// The catalog is rendered in its logged-out form as soon as the fetch
    /// settles; the restored session (nav, profile, favorite marks) is
    /// patched in by a second render once both have finished.
    pub async fn startup(&self) -> Option<Session> {
        let show_catalog = async {
            if let Err(e) = self.catalog.fetch_all().await {
                self.ui.lock().await.notice = Some(e.to_string());
            }
            self.ui.lock().await.panels.story_list = true;
            let view = self.build_view(None).await;
            self.renderer.render(&view);
        };

        let ((), restored) = tokio::join!(show_catalog, self.session.restore());

        if let Some(session) = restored.as_ref() {
            self.sync_favorites(session).await;
        }
        self.render().await;
        restored
    }

    /// Handles one trigger and renders the resulting view.
    ///
    /// On error the prior session and panels are kept, the error is shown as
    /// the view's notice and returned.
    pub async fn handle(&self, event: UiEvent) -> Result<()> {
        self.ui.lock().await.notice = None;

        let result = match event {
            UiEvent::Login { username, password } => {
                let outcome = self.session.login(&username, &password).await;
                self.after_auth(outcome).await
            }
            UiEvent::Signup {
                username,
                password,
                display_name,
            } => {
                let outcome = self
                    .session
                    .signup(&username, &password, &display_name)
                    .await;
                self.after_auth(outcome).await
            }
            UiEvent::Submit(new_story) => self.submit(&new_story).await,
            UiEvent::Logout => self.logout().await,
            UiEvent::ShowLogin => {
                let mut ui = self.ui.lock().await;
                ui.panels.login_forms = !ui.panels.login_forms;
                ui.panels.story_list = !ui.panels.story_list;
                Ok(())
            }
            UiEvent::ShowSubmit => {
                if self.session.is_logged_in().await {
                    let mut ui = self.ui.lock().await;
                    ui.panels.submit_form = !ui.panels.submit_form;
                    ui.panels.story_list = !ui.panels.story_list;
                    Ok(())
                } else {
                    Err(StoryError::illegal_state("Log in to submit a story"))
                }
            }
            UiEvent::Home => {
                self.ui.lock().await.panels.hide_all();
                let fetched = self.refresh().await;
                self.ui.lock().await.panels.story_list = true;
                fetched
            }
            UiEvent::ToggleFavorite { story_id } => self.toggle_favorite(&story_id).await,
        };

        if let Err(e) = &result {
            let notice = match e {
                StoryError::Favorite(_) => self.favorites.take_notice().await,
                _ => None,
            };
            self.ui.lock().await.notice = Some(notice.unwrap_or_else(|| e.to_string()));
        }
        self.render().await;
        result
    }

    /// Current view for the in-memory session.
    pub async fn view(&self) -> ViewModel {
        let session = self.session.current().await;
        self.build_view(session.as_ref()).await
    }

    async fn after_auth(&self, outcome: Result<Session>) -> Result<()> {
        let session = outcome?;
        {
            let mut ui = self.ui.lock().await;
            ui.panels.login_forms = false;
            ui.panels.story_list = true;
        }
        self.favorites.clear().await;
        self.sync_favorites(&session).await;
        Ok(())
    }

    async fn submit(&self, new_story: &NewStory) -> Result<()> {
        let current = self.session.current().await;
        self.catalog.submit(new_story, current.as_ref()).await?;
        self.ui.lock().await.panels.submit_form = false;
        self.refresh_quietly().await;
        self.ui.lock().await.panels.story_list = true;
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.session.logout().await?;
        self.favorites.clear().await;
        *self.ui.lock().await = UiState::default();
        self.refresh_quietly().await;
        self.ui.lock().await.panels.story_list = true;
        Ok(())
    }

    async fn toggle_favorite(&self, story_id: &str) -> Result<()> {
        let current = self.session.current().await;
        let Some(pending) = self.favorites.begin_toggle(current.as_ref(), story_id).await? else {
            return Ok(());
        };
        // Show the flipped mark before the service answers.
        self.render().await;
        self.favorites.complete(pending).await.map(|_| ())
    }

    async fn sync_favorites(&self, session: &Session) {
        if let Err(e) = self.favorites.sync(session).await {
            tracing::warn!("[ViewController] Could not load favorites: {}", e);
        }
    }

    /// Refetches the catalog and, while logged in, the favorite set.
    async fn refresh(&self) -> Result<()> {
        self.catalog.fetch_all().await?;
        if let Some(session) = self.session.current().await {
            self.sync_favorites(&session).await;
        }
        Ok(())
    }

    /// Like [`Self::refresh`], turning a failure into the view notice.
    async fn refresh_quietly(&self) {
        if let Err(e) = self.refresh().await {
            self.ui.lock().await.notice = Some(e.to_string());
        }
    }

    async fn render(&self) {
        let view = self.view().await;
        self.renderer.render(&view);
    }

    async fn build_view(&self, session: Option<&Session>) -> ViewModel {
        let snapshot = self.catalog.snapshot().await;

        let mut stories = Vec::with_capacity(snapshot.stories.len());
        for story in &snapshot.stories {
            let row = match session {
                Some(_) => {
                    let state = self.favorites.state(&story.id).await;
                    StoryRow::new(story, Some(state.indicator()), state.is_pending())
                }
                None => StoryRow::new(story, None, false),
            };
            stories.push(row);
        }

        let ui = self.ui.lock().await;
        ViewModel {
            nav: match session {
                Some(s) => NavState::LoggedIn {
                    username: s.username.clone(),
                },
                None => NavState::LoggedOut,
            },
            panels: ui.panels,
            profile: session.map(Profile::from),
            stories,
            stale: snapshot.stale,
            notice: ui.notice.clone(),
        }
    }
}
