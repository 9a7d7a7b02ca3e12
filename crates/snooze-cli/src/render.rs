use colored::Colorize;

use snooze_application::{NavItem, Renderer, StoryRow, ViewModel};
use snooze_core::favorite::FavoriteMark;

/// Prints the view to stdout.
pub struct TerminalRenderer;

impl TerminalRenderer {
    fn nav_line(view: &ViewModel) -> String {
        let items: Vec<&str> = view
            .nav
            .items()
            .iter()
            .map(|item| match item {
                NavItem::Login => "login",
                NavItem::Submit => "submit",
                NavItem::Logout => "logout",
            })
            .collect();
        format!("Hack or Snooze  [{}]", items.join(" | "))
    }

    fn story_line(row: &StoryRow) -> String {
        let star = match row.favorite {
            Some(FavoriteMark::Favorited) => "★ ",
            Some(FavoriteMark::NotFavorited) => "☆ ",
            None => "",
        };
        let pending = if row.pending { " …" } else { "" };
        format!(
            "{}{} {} {}\n    by {} | posted by {} | id {}{}",
            star,
            row.title.bold(),
            format!("({})", row.host).bright_black(),
            row.url.underline(),
            row.author,
            row.submitted_by,
            row.id.bright_black(),
            pending
        )
    }
}

impl Renderer for TerminalRenderer {
    fn render(&self, view: &ViewModel) {
        println!();
        println!("{}", Self::nav_line(view).bright_magenta().bold());

        if let Some(profile) = &view.profile {
            println!(
                "{}",
                format!(
                    "{} (@{}) member since {}",
                    profile.name, profile.username, profile.created_on
                )
                .bright_cyan()
            );
        }
        if view.panels.login_forms {
            println!(
                "{}",
                "login <username> <password> | signup <username> <password> <name>".yellow()
            );
        }
        if view.panels.submit_form {
            println!("{}", "submit <url> <author> | <title>".yellow());
        }
        if view.panels.story_list {
            if view.stale {
                println!("{}", "(story list may be out of date)".bright_black());
            }
            if view.stories.is_empty() {
                println!("{}", "No stories yet.".bright_black());
            }
            for row in &view.stories {
                println!("{}", Self::story_line(row));
            }
        }
        if let Some(notice) = &view.notice {
            println!("{}", notice.red());
        }
    }
}
