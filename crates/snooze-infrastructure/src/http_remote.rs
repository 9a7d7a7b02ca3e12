//! HTTP binding of [`RemoteService`] for hack-or-snooze style APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use snooze_core::config::ClientConfig;
use snooze_core::error::{Result, StoryError};
use snooze_core::remote::RemoteService;
use snooze_core::session::{Account, Session};
use snooze_core::story::{NewStory, Story};

/// Which error variant a failed request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// login / signup: rejections are `Auth`, transport failures `Internal`
    Account,
    Catalog,
    Favorite,
}

impl Family {
    fn failure(self, message: String) -> StoryError {
        match self {
            Self::Account => StoryError::internal(message),
            Self::Catalog => StoryError::catalog(message),
            Self::Favorite => StoryError::favorite(message),
        }
    }
}

fn classify(family: Family, status: StatusCode, body: &str) -> StoryError {
    let detail = error_detail(body).unwrap_or_else(|| status.to_string());
    match (family, status.as_u16()) {
        (Family::Account, 400 | 401 | 403 | 404 | 409) => StoryError::auth(detail),
        _ => family.failure(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}

/// Extracts `error.message` from an API error body.
fn error_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorMessage,
    }
    #[derive(Deserialize)]
    struct ErrorMessage {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
}

// ============================================================================
// Wire DTOs
// ============================================================================

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct UserEnvelope<'a> {
    user: Credentials<'a>,
}

#[derive(Debug, Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateStoryBody<'a> {
    token: &'a str,
    story: &'a NewStory,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    username: String,
    name: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    favorites: Vec<StoryDto>,
}

impl UserDto {
    fn into_account(self, token: String) -> Account {
        Account {
            token,
            username: self.username,
            display_name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoryDto {
    story_id: String,
    title: String,
    url: String,
    author: String,
    username: String,
}

impl From<StoryDto> for Story {
    fn from(dto: StoryDto) -> Self {
        Story {
            id: dto.story_id,
            title: dto.title,
            url: dto.url,
            author: dto.author,
            submitted_by: dto.username,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: UserDto,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: UserDto,
}

#[derive(Debug, Deserialize)]
struct StoriesResponse {
    stories: Vec<StoryDto>,
}

#[derive(Debug, Deserialize)]
struct StoryResponse {
    story: StoryDto,
}

// ============================================================================
// Service
// ============================================================================

/// [`RemoteService`] over HTTP + JSON.
#[derive(Clone)]
pub struct HttpRemoteService {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpRemoteService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    /// Joins `segments` onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            StoryError::config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                StoryError::config(format!("Base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, family: Family, request: RequestBuilder) -> Result<Response> {
        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| family.failure(format!("Request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(classify(family, status, &body))
    }

    async fn json<T>(family: Family, response: Response) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        response
            .json::<T>()
            .await
            .map_err(|e| family.failure(format!("Malformed response: {}", e)))
    }

    /// Fetches `/users/{username}`; `Ok(None)` when the token is rejected.
    async fn fetch_user(&self, token: &str, username: &str) -> Result<Option<UserDto>> {
        let request = self
            .client
            .get(self.endpoint(&["users", username])?)
            .query(&[("token", token)]);

        let response = request
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| StoryError::internal(format!("Request failed: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body: UserResponse = Self::json(Family::Account, response).await?;
                Ok(Some(body.user))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(Family::Account.failure(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    error_detail(&body).unwrap_or_default()
                )))
            }
        }
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Account> {
        tracing::debug!("[HttpRemote] POST /login for '{}'", username);
        let body = UserEnvelope {
            user: Credentials {
                username,
                password,
                name: None,
            },
        };
        let response = self
            .send(
                Family::Account,
                self.client.post(self.endpoint(&["login"])?).json(&body),
            )
            .await?;
        let auth: AuthResponse = Self::json(Family::Account, response).await?;
        Ok(auth.user.into_account(auth.token))
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Account> {
        tracing::debug!("[HttpRemote] POST /signup for '{}'", username);
        let body = UserEnvelope {
            user: Credentials {
                username,
                password,
                name: Some(display_name),
            },
        };
        let response = self
            .send(
                Family::Account,
                self.client.post(self.endpoint(&["signup"])?).json(&body),
            )
            .await?;
        let auth: AuthResponse = Self::json(Family::Account, response).await?;
        Ok(auth.user.into_account(auth.token))
    }

    async fn resolve_user(&self, token: &str, username: &str) -> Result<Option<Account>> {
        tracing::debug!("[HttpRemote] GET /users/{}", username);
        Ok(self
            .fetch_user(token, username)
            .await?
            .map(|user| user.into_account(token.to_string())))
    }

    async fn list_stories(&self) -> Result<Vec<Story>> {
        tracing::debug!("[HttpRemote] GET /stories");
        let response = self
            .send(Family::Catalog, self.client.get(self.endpoint(&["stories"])?))
            .await?;
        let body: StoriesResponse = Self::json(Family::Catalog, response).await?;
        Ok(body.stories.into_iter().map(Story::from).collect())
    }

    async fn create_story(&self, token: &str, story: &NewStory) -> Result<Story> {
        tracing::debug!("[HttpRemote] POST /stories '{}'", story.title);
        let body = CreateStoryBody { token, story };
        let response = self
            .send(
                Family::Catalog,
                self.client.post(self.endpoint(&["stories"])?).json(&body),
            )
            .await?;
        let created: StoryResponse = Self::json(Family::Catalog, response).await?;
        Ok(created.story.into())
    }

    async fn mark_favorite(&self, session: &Session, story_id: &str) -> Result<()> {
        tracing::debug!("[HttpRemote] POST favorite {}", story_id);
        let url = self.endpoint(&["users", &session.username, "favorites", story_id])?;
        self.send(
            Family::Favorite,
            self.client.post(url).json(&TokenBody {
                token: &session.token,
            }),
        )
        .await?;
        Ok(())
    }

    async fn unmark_favorite(&self, session: &Session, story_id: &str) -> Result<()> {
        tracing::debug!("[HttpRemote] DELETE favorite {}", story_id);
        let url = self.endpoint(&["users", &session.username, "favorites", story_id])?;
        self.send(
            Family::Favorite,
            self.client.delete(url).json(&TokenBody {
                token: &session.token,
            }),
        )
        .await?;
        Ok(())
    }

    async fn list_favorites(&self, session: &Session) -> Result<Vec<String>> {
        let user = self
            .fetch_user(&session.token, &session.username)
            .await
            .map_err(|e| StoryError::favorite(e.to_string()))?
            .ok_or_else(|| StoryError::favorite("Session token was rejected"))?;
        Ok(user.favorites.into_iter().map(|s| s.story_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_BODY: &str = r#"{
        "token": "eyJhbGciOi",
        "user": {
            "createdAt": "2019-06-01T12:00:00.000Z",
            "favorites": [
                {"storyId": "s-1", "title": "T", "url": "https://a.io", "author": "A", "username": "bob"}
            ],
            "name": "Alice",
            "stories": [],
            "username": "alice"
        }
    }"#;

    #[test]
    fn test_login_response_maps_to_account() {
        let auth: AuthResponse = serde_json::from_str(LOGIN_BODY).unwrap();
        let account = auth.user.into_account(auth.token);

        assert_eq!(account.token, "eyJhbGciOi");
        assert_eq!(account.display_name, "Alice");
        assert_eq!(account.created_at.to_rfc3339(), "2019-06-01T12:00:00+00:00");
    }

    #[test]
    fn test_story_dto_maps_fields() {
        let body: StoriesResponse = serde_json::from_str(
            r#"{"stories":[{"storyId":"9","title":"Hi","url":"https://www.x.org/a","author":"Ann","username":"ann1","createdAt":"2020-01-01T00:00:00Z"}]}"#,
        )
        .unwrap();
        let stories: Vec<Story> = body.stories.into_iter().map(Story::from).collect();

        assert_eq!(stories[0].id, "9");
        assert_eq!(stories[0].submitted_by, "ann1");
    }

    #[test]
    fn test_create_story_body_shape() {
        let story = NewStory::new("Title", "https://x.io", "Me");
        let json = serde_json::to_value(CreateStoryBody {
            token: "t",
            story: &story,
        })
        .unwrap();

        assert_eq!(json["token"], "t");
        assert_eq!(json["story"]["author"], "Me");
        assert_eq!(json["story"]["url"], "https://x.io");
    }

    #[test]
    fn test_login_body_omits_name() {
        let json = serde_json::to_value(UserEnvelope {
            user: Credentials {
                username: "u",
                password: "p",
                name: None,
            },
        })
        .unwrap();

        assert!(json["user"].get("name").is_none());
    }

    #[test]
    fn test_status_classification() {
        let body = r#"{"error":{"status":401,"title":"Unauthorized","message":"Invalid password"}}"#;

        let err = classify(Family::Account, StatusCode::UNAUTHORIZED, body);
        assert_eq!(err, StoryError::auth("Invalid password"));

        assert!(classify(Family::Account, StatusCode::CONFLICT, "").is_auth());
        assert!(classify(Family::Account, StatusCode::BAD_REQUEST, "").is_auth());
        assert!(classify(Family::Account, StatusCode::NOT_FOUND, "").is_auth());
        assert!(!classify(Family::Account, StatusCode::BAD_GATEWAY, "").is_auth());
        assert!(classify(Family::Catalog, StatusCode::UNAUTHORIZED, "").is_catalog());
        assert!(classify(Family::Favorite, StatusCode::INTERNAL_SERVER_ERROR, "").is_favorite());
    }

    #[test]
    fn test_paths_are_encoded_and_trimmed() {
        let service = HttpRemoteService::new("https://api.example/", Duration::from_secs(1));

        assert_eq!(
            service.endpoint(&["stories"]).unwrap().as_str(),
            "https://api.example/stories"
        );
        assert_eq!(
            service
                .endpoint(&["users", "al ice", "favorites", "s/1"])
                .unwrap()
                .as_str(),
            "https://api.example/users/al%20ice/favorites/s%2F1"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let service = HttpRemoteService::new("https://api.example/v3", Duration::from_secs(1));

        assert_eq!(
            service.endpoint(&["login"]).unwrap().as_str(),
            "https://api.example/v3/login"
        );
    }

    #[test]
    fn test_endpoint_rejects_unparsable_base() {
        let service = HttpRemoteService::new("not a url", Duration::from_secs(1));

        assert!(matches!(
            service.endpoint(&["stories"]).unwrap_err(),
            StoryError::Config(_)
        ));
    }
}
