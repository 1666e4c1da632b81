//! X API v2 client
//!
//! Implements session handling, reading an account's latest post, posting and
//! re-sharing. Every request carries the configured credentials: a bearer
//! token, or a browser cookie jar plus its CSRF token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use shared::{component_debug, Component, MirroredPost, PostId, Session, SessionAuth};

use crate::error::{CuratorError, CuratorResult};
use crate::traits::{Publisher, SessionProvider, SocialSource};

/// Number of timeline posts requested; the API rejects values below 5
const TIMELINE_PAGE_SIZE: &str = "5";

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRetweet<'a> {
    tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct RetweetData {
    retweeted: bool,
}

/// HTTP client for the social platform, cheap to clone
#[derive(Clone)]
pub struct RealSocialClient {
    client: reqwest::Client,
    base_url: String,
    credentials: SessionAuth,
}

impl RealSocialClient {
    pub fn new(base_url: impl Into<String>, credentials: SessionAuth, timeout: Duration) -> CuratorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CuratorError::config("HTTP_TIMEOUT_SECS", format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(request: RequestBuilder, auth: &SessionAuth) -> RequestBuilder {
        match auth {
            SessionAuth::Bearer(token) => request.bearer_auth(token),
            SessionAuth::Cookies {
                cookie_header,
                csrf_token,
            } => {
                let request = request.header(reqwest::header::COOKIE, cookie_header.as_str());
                match csrf_token {
                    Some(token) => request.header("x-csrf-token", token.as_str()),
                    None => request,
                }
            }
        }
    }

    /// Send a request and decode its JSON body.
    ///
    /// 401 becomes `Unauthorized`; any other failure goes through `on_error`.
    async fn read_json<T, E>(request: RequestBuilder, operation: &str, on_error: E) -> CuratorResult<T>
    where
        T: DeserializeOwned,
        E: Fn(String) -> CuratorError,
    {
        let response: Response = request.send().await.map_err(|e| on_error(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(CuratorError::unauthorized(operation, format!("HTTP {status}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(on_error(format!("HTTP {status}: {}", body.trim())));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| on_error(format!("invalid response: {e}")))
    }

    async fn user_id_for(&self, session: &Session, account: &str) -> CuratorResult<Option<String>> {
        let request = Self::authorize(
            self.client.get(self.url(&format!("/2/users/by/username/{account}"))),
            &session.auth,
        );
        let envelope: DataEnvelope<UserData> =
            Self::read_json(request, "user lookup", |m| CuratorError::fetch("social", m)).await?;
        Ok(envelope.data.map(|user| user.id))
    }
}

#[async_trait]
impl SessionProvider for RealSocialClient {
    async fn open_session(&self) -> CuratorResult<Session> {
        let request = Self::authorize(self.client.get(self.url("/2/users/me")), &self.credentials);
        let envelope: DataEnvelope<UserData> = Self::read_json(request, "session check", |message| {
            CuratorError::SessionError { message }
        })
        .await?;

        let user = envelope.data.ok_or_else(|| CuratorError::SessionError {
            message: "session check returned no user".to_string(),
        })?;
        Ok(Session::new(user.id, self.credentials.clone()))
    }

    async fn close_session(&self, session: Session) -> CuratorResult<()> {
        // Credentials are long-lived; nothing is revoked server side.
        component_debug!(Component::Session, "Releasing session for user {}", session.user_id);
        Ok(())
    }
}

#[async_trait]
impl SocialSource for RealSocialClient {
    async fn latest_post(&self, session: &Session, account: &str) -> CuratorResult<Option<MirroredPost>> {
        let Some(user_id) = self.user_id_for(session, account).await? else {
            return Err(CuratorError::fetch("social", format!("account '{account}' not found")));
        };

        let request = Self::authorize(
            self.client
                .get(self.url(&format!("/2/users/{user_id}/tweets")))
                .query(&[("max_results", TIMELINE_PAGE_SIZE)]),
            &session.auth,
        );
        let envelope: DataEnvelope<Vec<TweetData>> =
            Self::read_json(request, "timeline", |m| CuratorError::fetch("social", m)).await?;

        Ok(envelope
            .data
            .and_then(|tweets| tweets.into_iter().next())
            .map(|tweet| MirroredPost {
                id: PostId::new(tweet.id),
                text: tweet.text,
            }))
    }
}

#[async_trait]
impl Publisher for RealSocialClient {
    async fn post(&self, session: &Session, text: &str) -> CuratorResult<PostId> {
        let request = Self::authorize(
            self.client.post(self.url("/2/tweets")).json(&CreateTweet { text }),
            &session.auth,
        );
        let envelope: DataEnvelope<TweetData> = Self::read_json(request, "post", |m| CuratorError::publish(m)).await?;

        envelope
            .data
            .map(|tweet| PostId::new(tweet.id))
            .ok_or_else(|| CuratorError::publish("response carried no post id"))
    }

    async fn mirror(&self, session: &Session, post_id: &PostId) -> CuratorResult<()> {
        let request = Self::authorize(
            self.client
                .post(self.url(&format!("/2/users/{}/retweets", session.user_id)))
                .json(&CreateRetweet {
                    tweet_id: post_id.as_str(),
                }),
            &session.auth,
        );
        let envelope: DataEnvelope<RetweetData> =
            Self::read_json(request, "mirror", |m| CuratorError::mirror(post_id.as_str(), m)).await?;

        match envelope.data {
            Some(RetweetData { retweeted: true }) => Ok(()),
            _ => Err(CuratorError::mirror(post_id.as_str(), "platform did not confirm the re-share")),
        }
    }
}
