use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use snooze_application::{Renderer, ViewController, ViewModel};
use snooze_core::fake::{FakeRemoteService, story};
use snooze_core::session::{PersistentCredentialStore, Session};
use snooze_core::storage::{KeyValueStore, MemoryKeyValueStore};

/// Renderer that keeps every view it was asked to draw.
#[derive(Default)]
pub struct RecordingRenderer {
    views: Mutex<Vec<ViewModel>>,
}

impl RecordingRenderer {
    pub fn views(&self) -> Vec<ViewModel> {
        self.views.lock().unwrap().clone()
    }

    pub fn last(&self) -> ViewModel {
        self.views().pop().expect("nothing rendered")
    }

    pub fn count(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, view: &ViewModel) {
        self.views.lock().unwrap().push(view.clone());
    }
}

pub struct Harness {
    pub remote: Arc<FakeRemoteService>,
    pub kv: Arc<MemoryKeyValueStore>,
    pub renderer: Arc<RecordingRenderer>,
    pub controller: Arc<ViewController>,
}

impl Harness {
    pub fn new() -> Self {
        let remote = Arc::new(
            FakeRemoteService::new()
                .with_account("alice", "wonderland", "Alice")
                .with_stories(vec![
                    story("S1", "Ownership explained"),
                    story("S2", "Async in depth"),
                ]),
        );
        let kv = Arc::new(MemoryKeyValueStore::with_entries([("theme", "dark")]));
        let renderer = Arc::new(RecordingRenderer::default());
        let controller = Arc::new(ViewController::from_services(
            remote.clone(),
            kv.clone(),
            renderer.clone(),
        ));
        Self {
            remote,
            kv,
            renderer,
            controller,
        }
    }

    pub fn store(&self) -> PersistentCredentialStore {
        PersistentCredentialStore::new(self.kv.clone() as Arc<dyn KeyValueStore>)
    }

    /// Persists alice's credentials as a previous run would have.
    pub async fn persist_alice(&self) -> Session {
        let session = Session {
            token: "token-alice".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2019, 6, 1, 12, 0, 0).unwrap(),
        };
        self.store().write(&session).await.unwrap();
        session
    }

    /// Yields until at least `count` views have been rendered.
    pub async fn wait_for_renders(&self, count: usize) {
        for _ in 0..1000 {
            if self.renderer.count() >= count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {} renders, saw {}", count, self.renderer.count());
    }
}
