//! In-memory fake of [`RemoteService`] for test suites.
//!
//! Besides canned accounts and stories, the fake can hold individual calls
//! at a gate until the test releases them, which is how overlapping
//! operations are resolved in a chosen order.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

use crate::error::{Result, StoryError};
use crate::remote::RemoteService;
use crate::session::{Account, Session};
use crate::story::{NewStory, Story};

/// A call observed by the fake, with the token it was scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Authenticate { username: String },
    CreateAccount { username: String },
    ResolveUser { token: String, username: String },
    ListStories,
    CreateStory { token: String, title: String },
    MarkFavorite { token: String, story_id: String },
    UnmarkFavorite { token: String, story_id: String },
    ListFavorites { token: String },
}

#[derive(Default)]
struct FakeState {
    passwords: HashMap<String, String>,
    accounts: HashMap<String, Account>,
    stories: Vec<Story>,
    favorites: HashMap<String, Vec<String>>,
    calls: Vec<RemoteCall>,
    failing: HashSet<&'static str>,
    next_id: u32,
}

/// Scriptable in-memory remote service.
#[derive(Default)]
pub struct FakeRemoteService {
    state: Mutex<FakeState>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeRemoteService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers an account whose token is `token-<username>`.
    pub fn with_account(self, username: &str, password: &str, display_name: &str) -> Self {
        {
            let mut state = self.state();
            state
                .passwords
                .insert(username.to_string(), password.to_string());
            state.accounts.insert(
                username.to_string(),
                Account {
                    token: format!("token-{}", username),
                    username: username.to_string(),
                    display_name: display_name.to_string(),
                    created_at: Utc.with_ymd_and_hms(2019, 6, 1, 12, 0, 0).unwrap(),
                },
            );
        }
        self
    }

    pub fn with_stories(self, stories: Vec<Story>) -> Self {
        self.set_stories(stories);
        self
    }

    pub fn set_stories(&self, stories: Vec<Story>) {
        self.state().stories = stories;
    }

    pub fn set_favorites(&self, username: &str, story_ids: &[&str]) {
        self.state().favorites.insert(
            username.to_string(),
            story_ids.iter().map(|id| id.to_string()).collect(),
        );
    }

    pub fn favorites_of(&self, username: &str) -> Vec<String> {
        self.state()
            .favorites
            .get(username)
            .cloned()
            .unwrap_or_default()
    }

    /// Makes every call of `operation` fail until [`Self::recover`] is called.
    ///
    /// Operation names: `"authenticate"`, `"resolve_user"`, `"list_stories"`,
    /// `"create_story"`, `"favorite"`, `"list_favorites"`.
    pub fn fail(&self, operation: &'static str) {
        self.state().failing.insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.state().failing.remove(operation);
    }

    /// Invalidates the account's current token.
    pub fn revoke_token(&self, username: &str) {
        if let Some(account) = self.state().accounts.get_mut(username) {
            account.token = format!("revoked-{}", username);
        }
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state().calls.clone()
    }

    /// Holds calls tagged `key` (e.g. `"auth:alice"`, `"favorite:S1"`) until released.
    pub fn hold(&self, key: &str) {
        self.gates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        let gate = self
            .gates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key);
        if let Some(gate) = gate {
            gate.notify_one();
        }
    }

    async fn pass_gate(&self, key: String) {
        let gate = self
            .gates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn record(&self, call: RemoteCall) {
        self.state().calls.push(call);
    }

    fn is_failing(&self, operation: &'static str) -> bool {
        self.state().failing.contains(operation)
    }

    fn check_token(&self, session: &Session) -> bool {
        self.state()
            .accounts
            .get(&session.username)
            .is_some_and(|account| account.token == session.token)
    }
}

#[async_trait]
impl RemoteService for FakeRemoteService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Account> {
        self.record(RemoteCall::Authenticate {
            username: username.to_string(),
        });
        self.pass_gate(format!("auth:{}", username)).await;

        if self.is_failing("authenticate") {
            return Err(StoryError::auth("service unavailable"));
        }
        let state = self.state();
        match (state.passwords.get(username), state.accounts.get(username)) {
            (Some(expected), Some(account)) if expected == password => Ok(account.clone()),
            _ => Err(StoryError::auth("invalid username or password")),
        }
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account> {
        self.record(RemoteCall::CreateAccount {
            username: username.to_string(),
        });
        self.pass_gate(format!("auth:{}", username)).await;

        let mut state = self.state();
        if username.is_empty() || password.is_empty() {
            return Err(StoryError::auth("username and password are required"));
        }
        if state.accounts.contains_key(username) {
            return Err(StoryError::auth(format!("username '{}' is taken", username)));
        }
        let account = Account {
            token: format!("token-{}", username),
            username: username.to_string(),
            display_name: display_name.to_string(),
            created_at: Utc::now(),
        };
        state
            .passwords
            .insert(username.to_string(), password.to_string());
        state.accounts.insert(username.to_string(), account.clone());
        Ok(account)
    }

    async fn resolve_user(&self, token: &str, username: &str) -> Result<Option<Account>> {
        self.record(RemoteCall::ResolveUser {
            token: token.to_string(),
            username: username.to_string(),
        });
        self.pass_gate(format!("resolve:{}", username)).await;

        if self.is_failing("resolve_user") {
            return Err(StoryError::internal("connection reset"));
        }
        let state = self.state();
        Ok(state
            .accounts
            .get(username)
            .filter(|account| account.token == token)
            .cloned())
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        self.record(RemoteCall::ListStories);
        self.pass_gate("stories".to_string()).await;

        if self.is_failing("list_stories") {
            return Err(StoryError::catalog("listing timed out"));
        }
        Ok(self.state().stories.clone())
    }

    async fn create_story(&self, token: &str, story: &NewStory) -> Result<Story> {
        self.record(RemoteCall::CreateStory {
            token: token.to_string(),
            title: story.title.clone(),
        });

        if self.is_failing("create_story") {
            return Err(StoryError::catalog("creation failed"));
        }
        let mut state = self.state();
        let Some(owner) = state
            .accounts
            .values()
            .find(|account| account.token == token)
            .map(|account| account.username.clone())
        else {
            return Err(StoryError::catalog("unauthorized"));
        };
        state.next_id += 1;
        let created = Story {
            id: format!("new-{}", state.next_id),
            title: story.title.clone(),
            url: story.url.clone(),
            author: story.author.clone(),
            submitted_by: owner,
        };
        // The real service lists newest first.
        state.stories.insert(0, created.clone());
        Ok(created)
    }

    async fn mark_favorite(&self, session: &Session, story_id: &str) -> Result<()> {
        self.record(RemoteCall::MarkFavorite {
            token: session.token.clone(),
            story_id: story_id.to_string(),
        });
        self.pass_gate(format!("favorite:{}", story_id)).await;

        if self.is_failing("favorite") || !self.check_token(session) {
            return Err(StoryError::favorite("favorite request failed"));
        }
        let mut state = self.state();
        let marks = state.favorites.entry(session.username.clone()).or_default();
        if !marks.iter().any(|id| id == story_id) {
            marks.push(story_id.to_string());
        }
        Ok(())
    }

    async fn unmark_favorite(&self, session: &Session, story_id: &str) -> Result<()> {
        self.record(RemoteCall::UnmarkFavorite {
            token: session.token.clone(),
            story_id: story_id.to_string(),
        });
        self.pass_gate(format!("favorite:{}", story_id)).await;

        if self.is_failing("favorite") || !self.check_token(session) {
            return Err(StoryError::favorite("unfavorite request failed"));
        }
        let mut state = self.state();
        if let Some(marks) = state.favorites.get_mut(&session.username) {
            marks.retain(|id| id != story_id);
        }
        Ok(())
    }

    async fn list_favorites(&self, session: &Session) -> Result<Vec<String>> {
        self.record(RemoteCall::ListFavorites {
            token: session.token.clone(),
        });

        if self.is_failing("list_favorites") {
            return Err(StoryError::favorite("favorites unavailable"));
        }
        Ok(self.favorites_of(&session.username))
    }
}

/// Builds a story with predictable fields for tests.
pub fn story(id: &str, title: &str) -> Story {
    Story {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("https://www.example.com/{}", id),
        author: "Ada".to_string(),
        submitted_by: "alice".to_string(),
    }
}
