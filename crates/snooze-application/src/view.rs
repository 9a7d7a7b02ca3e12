//! Renderable view model.

use serde::Serialize;

use snooze_core::favorite::FavoriteMark;
use snooze_core::session::Session;
use snooze_core::story::Story;

/// Which panels are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Panels {
    /// Login and create-account forms (toggled together)
    pub login_forms: bool,
    pub submit_form: bool,
    pub story_list: bool,
}

impl Panels {
    pub fn hide_all(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavItem {
    Login,
    Submit,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NavState {
    LoggedOut,
    LoggedIn { username: String },
}

impl NavState {
    pub fn items(&self) -> &'static [NavItem] {
        match self {
            Self::LoggedOut => &[NavItem::Login],
            Self::LoggedIn { .. } => &[NavItem::Submit, NavItem::Logout],
        }
    }
}

/// Profile panel of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub username: String,
    /// Account creation date, `YYYY-MM-DD`
    pub created_on: String,
}

impl From<&Session> for Profile {
    fn from(session: &Session) -> Self {
        Self {
            name: session.display_name.clone(),
            username: session.username.clone(),
            created_on: session.created_on(),
        }
    }
}

/// One line of the story list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    pub host: String,
    pub submitted_by: String,
    /// `None` while logged out
    pub favorite: Option<FavoriteMark>,
    /// Set while a favorite toggle is in flight
    pub pending: bool,
}

impl StoryRow {
    pub fn new(story: &Story, favorite: Option<FavoriteMark>, pending: bool) -> Self {
        Self {
            id: story.id.clone(),
            title: story.title.clone(),
            author: story.author.clone(),
            url: story.url.clone(),
            host: host_name(&story.url),
            submitted_by: story.submitted_by.clone(),
            favorite,
            pending,
        }
    }
}

/// Everything a [`Renderer`](crate::Renderer) draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub nav: NavState,
    pub panels: Panels,
    pub profile: Option<Profile>,
    pub stories: Vec<StoryRow>,
    /// The story list predates a failed refresh
    pub stale: bool,
    pub notice: Option<String>,
}

impl ViewModel {
    pub fn is_logged_in(&self) -> bool {
        matches!(self.nav, NavState::LoggedIn { .. })
    }

    pub fn story(&self, id: &str) -> Option<&StoryRow> {
        self.stories.iter().find(|row| row.id == id)
    }
}

/// Host part of `url` without a leading `www.`.
///
/// ```
/// use snooze_application::host_name;
///
/// assert_eq!(host_name("https://www.rust-lang.org/learn"), "rust-lang.org");
/// assert_eq!(host_name("example.com/a/b"), "example.com");
/// ```
pub fn host_name(url: &str) -> String {
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let host = rest.split('/').next().unwrap_or_default();
    host.strip_prefix("www.").unwrap_or(host).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_host_name_variants() {
        assert_eq!(host_name("http://news.ycombinator.com/item?id=1"), "news.ycombinator.com");
        assert_eq!(host_name("https://www.example.com"), "example.com");
        assert_eq!(host_name("www.example.com/path"), "example.com");
        assert_eq!(host_name("localhost:8080/x"), "localhost:8080");
        assert_eq!(host_name(""), "");
    }

    #[test]
    fn test_nav_items_by_state() {
        assert_eq!(NavState::LoggedOut.items(), &[NavItem::Login]);
        let logged_in = NavState::LoggedIn {
            username: "alice".to_string(),
        };
        assert_eq!(logged_in.items(), &[NavItem::Submit, NavItem::Logout]);
    }

    #[test]
    fn test_profile_formats_creation_date() {
        let session = Session {
            token: "t".to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2019, 6, 1, 23, 59, 0).unwrap(),
        };

        let profile = Profile::from(&session);

        assert_eq!(profile.created_on, "2019-06-01");
        assert_eq!(profile.name, "Alice");
    }
}
