mod common;

use common::Harness;
use snooze_application::{NavState, Panels, UiEvent};
use snooze_core::favorite::FavoriteMark;
use snooze_core::fake::RemoteCall;
use snooze_core::storage::KeyValueStore;
use snooze_core::story::NewStory;

fn login(username: &str, password: &str) -> UiEvent {
    UiEvent::Login {
        username: username.to_string(),
        password: password.to_string(),
    }
}

fn toggle(story_id: &str) -> UiEvent {
    UiEvent::ToggleFavorite {
        story_id: story_id.to_string(),
    }
}

#[tokio::test]
async fn startup_without_record_shows_logged_out_catalog() {
    let h = Harness::new();

    assert!(h.controller.startup().await.is_none());

    let view = h.renderer.last();
    assert_eq!(view.nav, NavState::LoggedOut);
    assert!(view.panels.story_list);
    assert_eq!(view.stories.len(), 2);
    assert_eq!(view.stories[0].host, "example.com");
    assert!(view.stories.iter().all(|row| row.favorite.is_none()));
}

#[tokio::test]
async fn startup_renders_catalog_before_session_patch() {
    let h = Harness::new();
    h.persist_alice().await;
    h.remote.set_favorites("alice", &["S2"]);
    // Restore settles first; the catalog still renders logged out.
    h.remote.hold("stories");

    let startup = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.startup().await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(h.controller.session_manager().is_logged_in().await);
    assert_eq!(h.renderer.count(), 0);

    h.remote.release("stories");
    let restored = startup.await.unwrap().unwrap();

    let views = h.renderer.views();
    assert_eq!(views.len(), 2);
    assert_eq!(views[0].nav, NavState::LoggedOut);
    assert_eq!(views[0].stories.len(), 2);
    assert!(views[0].profile.is_none());

    let patched = &views[1];
    assert_eq!(
        patched.nav,
        NavState::LoggedIn {
            username: restored.username.clone()
        }
    );
    assert_eq!(patched.profile.as_ref().unwrap().created_on, "2019-06-01");
    assert_eq!(patched.story("S2").unwrap().favorite, Some(FavoriteMark::Favorited));
    assert_eq!(patched.story("S1").unwrap().favorite, Some(FavoriteMark::NotFavorited));
}

#[tokio::test]
async fn login_hides_forms_and_shows_logged_in_nav() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(UiEvent::ShowLogin).await.unwrap();
    let shown = h.renderer.last();
    assert!(shown.panels.login_forms);
    assert!(!shown.panels.story_list);

    h.controller.handle(login("alice", "wonderland")).await.unwrap();

    let view = h.renderer.last();
    assert!(!view.panels.login_forms);
    assert!(view.panels.story_list);
    assert!(view.is_logged_in());
    assert_eq!(view.profile.unwrap().name, "Alice");
    let record = h.store().read().await.unwrap().unwrap();
    assert_eq!(record.username, "alice");
}

#[tokio::test]
async fn failed_login_keeps_view_and_shows_notice() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(UiEvent::ShowLogin).await.unwrap();

    let err = h
        .controller
        .handle(login("alice", "wrong"))
        .await
        .unwrap_err();

    assert!(err.is_auth());
    let view = h.renderer.last();
    assert_eq!(view.nav, NavState::LoggedOut);
    assert!(view.panels.login_forms);
    assert!(view.notice.is_some());
    assert!(h.store().read().await.unwrap().is_none());
}

#[tokio::test]
async fn favorite_flips_before_service_answers() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(login("alice", "wonderland")).await.unwrap();
    let before = h.renderer.count();
    h.remote.hold("favorite:S1");

    let toggling = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.handle(toggle("S1")).await }
    });
    h.wait_for_renders(before + 1).await;

    let optimistic = h.renderer.last();
    let row = optimistic.story("S1").unwrap();
    assert_eq!(row.favorite, Some(FavoriteMark::Favorited));
    assert!(row.pending);

    h.remote.release("favorite:S1");
    toggling.await.unwrap().unwrap();

    let settled = h.renderer.last();
    let row = settled.story("S1").unwrap();
    assert_eq!(row.favorite, Some(FavoriteMark::Favorited));
    assert!(!row.pending);
    let marks: Vec<_> = h
        .remote
        .calls()
        .into_iter()
        .filter(|c| matches!(c, RemoteCall::MarkFavorite { .. }))
        .collect();
    assert_eq!(
        marks,
        vec![RemoteCall::MarkFavorite {
            token: "token-alice".to_string(),
            story_id: "S1".to_string(),
        }]
    );
}

#[tokio::test]
async fn failed_favorite_rolls_back_with_notice() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(login("alice", "wonderland")).await.unwrap();
    h.remote.fail("favorite");

    let err = h.controller.handle(toggle("S1")).await.unwrap_err();

    assert!(err.is_favorite());
    let view = h.renderer.last();
    assert_eq!(
        view.story("S1").unwrap().favorite,
        Some(FavoriteMark::NotFavorited)
    );
    assert!(view.notice.unwrap().contains("S1"));
}

#[tokio::test]
async fn favorite_while_logged_out_is_rejected() {
    let h = Harness::new();
    h.controller.startup().await;

    let err = h.controller.handle(toggle("S1")).await.unwrap_err();

    assert!(err.is_illegal_state());
    assert!(
        !h.remote
            .calls()
            .iter()
            .any(|c| matches!(c, RemoteCall::MarkFavorite { .. }))
    );
}

#[tokio::test]
async fn submit_refetches_and_returns_to_list() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(login("alice", "wonderland")).await.unwrap();
    h.controller.handle(UiEvent::ShowSubmit).await.unwrap();
    assert!(h.renderer.last().panels.submit_form);

    h.controller
        .handle(UiEvent::Submit(NewStory::new(
            "Pinning",
            "https://www.without.boats/blog/pin",
            "boats",
        )))
        .await
        .unwrap();

    let view = h.renderer.last();
    assert!(!view.panels.submit_form);
    assert!(view.panels.story_list);
    assert_eq!(view.stories.len(), 3);
    assert_eq!(view.stories[0].title, "Pinning");
    assert_eq!(view.stories[0].host, "without.boats");
    assert_eq!(view.stories[0].submitted_by, "alice");
}

#[tokio::test]
async fn submit_panels_require_session() {
    let h = Harness::new();
    h.controller.startup().await;

    assert!(
        h.controller
            .handle(UiEvent::ShowSubmit)
            .await
            .unwrap_err()
            .is_illegal_state()
    );
    assert!(
        h.controller
            .handle(UiEvent::Submit(NewStory::new("t", "https://x.io", "a")))
            .await
            .unwrap_err()
            .is_illegal_state()
    );
    assert_eq!(h.renderer.last().stories.len(), 2);
}

#[tokio::test]
async fn logout_resets_view_and_keeps_foreign_keys() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(login("alice", "wonderland")).await.unwrap();
    h.controller.handle(UiEvent::ShowSubmit).await.unwrap();

    h.controller.handle(UiEvent::Logout).await.unwrap();

    let view = h.renderer.last();
    assert_eq!(view.nav, NavState::LoggedOut);
    assert_eq!(
        view.panels,
        Panels {
            story_list: true,
            ..Default::default()
        }
    );
    assert!(view.stories.iter().all(|row| row.favorite.is_none()));
    assert_eq!(h.kv.keys().await.unwrap(), vec!["theme".to_string()]);
}

#[tokio::test]
async fn home_hides_panels_and_flags_stale_catalog() {
    let h = Harness::new();
    h.controller.startup().await;
    h.controller.handle(UiEvent::ShowLogin).await.unwrap();

    h.controller.handle(UiEvent::Home).await.unwrap();
    assert_eq!(
        h.renderer.last().panels,
        Panels {
            story_list: true,
            ..Default::default()
        }
    );

    h.remote.fail("list_stories");
    let err = h.controller.handle(UiEvent::Home).await.unwrap_err();

    assert!(err.is_catalog());
    let view = h.renderer.last();
    assert!(view.stale);
    assert_eq!(view.stories.len(), 2);
    assert!(view.notice.is_some());
}
