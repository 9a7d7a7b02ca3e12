use snooze_core::story::NewStory;

/// User triggers handled by [`ViewController`](crate::ViewController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Login {
        username: String,
        password: String,
    },
    Signup {
        username: String,
        password: String,
        display_name: String,
    },
    Submit(NewStory),
    Logout,
    /// Toggle the login/create-account forms and the story list
    ShowLogin,
    /// Toggle the submit form and the story list
    ShowSubmit,
    /// Hide every panel, refetch and show the story list
    Home,
    ToggleFavorite {
        story_id: String,
    },
}
