use super::model::Session;
use super::store::{PersistentCredentialStore, StoredCredentials};
use crate::error::{Result, StoryError};
use crate::remote::RemoteService;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the single in-memory session and its persisted mirror.
///
/// `SessionManager` is responsible for:
/// - Restoring the session from the credential store on startup
/// - Logging in and signing up against the remote service
/// - Logging out
/// - Keeping memory and the credential store consistent
///
/// Every state change is applied inside one critical section that covers both
/// the in-memory slot and the store write, so no reader ever observes one
/// updated without the other. Remote calls run outside the critical section;
/// results are applied in the order they resolve (last resolved wins).
pub struct SessionManager {
    current: Mutex<Option<Session>>,
    store: PersistentCredentialStore,
    remote: Arc<dyn RemoteService>,
}

impl SessionManager {
    /// Creates a logged-out `SessionManager`.
    ///
    /// # Arguments
    ///
    /// * `remote` - The remote service used to authenticate and resolve tokens
    /// * `store` - The credential store mirroring the session; only this manager writes to it
    pub fn new(remote: Arc<dyn RemoteService>, store: PersistentCredentialStore) -> Self {
        Self {
            current: Mutex::new(None),
            store,
            remote,
        }
    }

    /// Returns a copy of the live session, if any.
    pub async fn current(&self) -> Option<Session> {
        self.current.lock().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.current.lock().await.is_some()
    }

    /// Attempts to restore the persisted session on startup.
    ///
    /// Never fails: a missing token, a corrupt record, a rejected token and a
    /// transport error all yield `None`. Records that can never become valid
    /// again (corrupt or rejected) are removed; after a transport error the
    /// record is kept for the next start.
    pub async fn restore(&self) -> Option<Session> {
        // Read under the lock so an overlapping apply or logout is never seen half done.
        let inspected = {
            let _current = self.current.lock().await;
            self.store.inspect().await
        };
        let record = match inspected {
            Ok(StoredCredentials::Present(record)) => record,
            Ok(StoredCredentials::Absent) => {
                tracing::debug!("[SessionManager] No stored credentials");
                return None;
            }
            Ok(StoredCredentials::Corrupt) => {
                tracing::warn!("[SessionManager] Stored credentials are incomplete, discarding");
                self.discard_stale(None).await;
                return None;
            }
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to read stored credentials: {}", e);
                return None;
            }
        };

        let account = match self
            .remote
            .resolve_user(&record.token, &record.username)
            .await
        {
            Ok(Some(account)) => account,
            Ok(None) => {
                tracing::info!(
                    "[SessionManager] Stored token for '{}' was rejected",
                    record.username
                );
                self.discard_stale(Some(&record.token)).await;
                return None;
            }
            Err(e) => {
                tracing::warn!("[SessionManager] Could not validate stored session: {}", e);
                return None;
            }
        };

        let session = Session {
            token: account.token,
            username: account.username,
            display_name: record.display_name,
            created_at: record.created_at,
        };

        match self.apply(session.clone()).await {
            Ok(()) => {
                tracing::info!("[SessionManager] Restored session for '{}'", session.username);
                Some(session)
            }
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to persist restored session: {}", e);
                None
            }
        }
    }

    /// Authenticates and makes the resulting session current.
    ///
    /// # Errors
    ///
    /// Returns `StoryError::Auth` when the credentials are rejected; the prior
    /// session and the store are left untouched. Returns `StoryError::Storage`
    /// if the session could not be persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        tracing::debug!("[SessionManager] Authenticating '{}'", username);
        let account = self.remote.authenticate(username, password).await?;
        let session = Session::from(account);
        self.apply(session.clone()).await?;
        tracing::info!("[SessionManager] Logged in as '{}'", session.username);
        Ok(session)
    }

    /// Creates an account and makes the resulting session current.
    ///
    /// Same persistence contract as [`Self::login`].
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Session> {
        tracing::debug!("[SessionManager] Creating account '{}'", username);
        let account = self
            .remote
            .create_account(username, password, display_name)
            .await?;
        let session = Session::from(account);
        self.apply(session.clone()).await?;
        tracing::info!("[SessionManager] Signed up as '{}'", session.username);
        Ok(session)
    }

    /// Clears the session from memory and the store. Idempotent.
    pub async fn logout(&self) -> Result<()> {
        let mut current = self.current.lock().await;
        self.store.clear().await?;
        if let Some(previous) = current.take() {
            tracing::info!("[SessionManager] Logged out '{}'", previous.username);
        }
        Ok(())
    }

    /// Persists `session` and then makes it current, as one unit.
    async fn apply(&self, session: Session) -> Result<()> {
        let mut current = self.current.lock().await;

        if let Err(e) = self.store.write(&session).await {
            // Put the store back in line with memory before reporting.
            let rollback = match current.as_ref() {
                Some(previous) => self.store.write(previous).await,
                None => self.store.clear().await,
            };
            if let Err(rollback_err) = rollback {
                tracing::error!(
                    "[SessionManager] Failed to roll back credential store: {}",
                    rollback_err
                );
            }
            return Err(StoryError::storage(format!(
                "Failed to persist session: {}",
                e
            )));
        }

        *current = Some(session);
        Ok(())
    }

    /// Removes a stored record that can no longer become valid.
    ///
    /// Re-checks the store inside the critical section: if another operation
    /// already replaced the record, it is left alone.
    async fn discard_stale(&self, rejected_token: Option<&str>) {
        let mut current = self.current.lock().await;

        let still_stale = match (self.store.inspect().await, rejected_token) {
            (Ok(StoredCredentials::Corrupt), None) => true,
            (Ok(StoredCredentials::Present(record)), Some(token)) => record.token == token,
            _ => false,
        };
        if !still_stale {
            return;
        }

        if let Err(e) = self.store.clear().await {
            tracing::warn!("[SessionManager] Failed to discard stored credentials: {}", e);
            return;
        }
        if let (Some(token), Some(session)) = (rejected_token, current.as_ref())
            && session.token == token
        {
            *current = None;
        }
    }
}
