//! REPL command parsing.

use snooze_application::UiEvent;
use snooze_core::story::NewStory;

pub const COMMANDS: &[&str] = &[
    "login",
    "signup",
    "submit",
    "logout",
    "show-login",
    "show-submit",
    "home",
    "fav",
    "help",
    "quit",
];

pub const HELP: &str = "\
login <username> <password>          log in
signup <username> <password> <name>  create an account
submit <url> <author> | <title>      submit a story
fav <story-id>                       toggle a favorite
show-login | show-submit             toggle forms
home                                 refresh the story list
logout                               log out
quit                                 exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Event(UiEvent),
    Help,
    Quit,
}

/// Parses one REPL line. Errors carry a usage hint.
pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let event = match head {
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "login" => match args.as_slice() {
            [username, password] => UiEvent::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            _ => return Err("usage: login <username> <password>".to_string()),
        },
        "signup" => match args.as_slice() {
            [username, password, name @ ..] if !name.is_empty() => UiEvent::Signup {
                username: username.to_string(),
                password: password.to_string(),
                display_name: name.join(" "),
            },
            _ => return Err("usage: signup <username> <password> <name>".to_string()),
        },
        "submit" => UiEvent::Submit(parse_story(rest)?),
        "fav" => match args.as_slice() {
            [story_id] => UiEvent::ToggleFavorite {
                story_id: story_id.to_string(),
            },
            _ => return Err("usage: fav <story-id>".to_string()),
        },
        "logout" => UiEvent::Logout,
        "show-login" => UiEvent::ShowLogin,
        "show-submit" => UiEvent::ShowSubmit,
        "home" => UiEvent::Home,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Command::Event(event))
}

fn parse_story(rest: &str) -> Result<NewStory, String> {
    const USAGE: &str = "usage: submit <url> <author> | <title>";

    let (left, title) = rest.split_once('|').ok_or(USAGE)?;
    let (url, author) = left.trim().split_once(char::is_whitespace).ok_or(USAGE)?;
    let (author, title) = (author.trim(), title.trim());
    if author.is_empty() || title.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(NewStory::new(title, url, author))
}
