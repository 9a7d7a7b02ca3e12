//! Story domain models.

use serde::{Deserialize, Serialize};

/// A shared story as returned by the remote service.
///
/// Stories are immutable once fetched; a refresh replaces the whole
/// collection instead of patching entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Server-assigned identifier
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    /// Username of the account that posted the story
    pub submitted_by: String,
}

/// Payload of a story submission. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStory {
    pub title: String,
    pub url: String,
    pub author: String,
}

impl NewStory {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            author: author.into(),
        }
    }
}
