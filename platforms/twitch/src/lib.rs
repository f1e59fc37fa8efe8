pub mod model;

use kiroku::{
    ArchiveError, ArchiveResult, ChannelIdentity, Credential, RecordingMetadata,
    RecordingPlatform,
};
use model::*;
use reqwest::{header::AUTHORIZATION, Client};
use serde::de::DeserializeOwned;

pub const TWITCH_AUTH_URL: &str = "https://id.twitch.tv";
pub const TWITCH_API_URL: &str = "https://api.twitch.tv";

#[derive(Clone)]
pub struct TwitchClient {
    client: Client,
    client_id: String,
    client_secret: String,

    auth_url: String,
    api_url: String,
}

impl TwitchClient {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_client(Client::new(), client_id, client_secret)
    }

    pub fn with_client(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: TWITCH_AUTH_URL.to_string(),
            api_url: TWITCH_API_URL.to_string(),
        }
    }

    /// Send requests to other hosts, e.g. a local mock server.
    pub fn with_endpoints(mut self, auth_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self.api_url = api_url.into();
        self
    }

    /// https://dev.twitch.tv/docs/authentication/getting-tokens-oauth/#client-credentials-grant-flow
    pub async fn access_token(&self) -> ArchiveResult<TokenResponse> {
        let response = self
            .client
            .post(format!("{}/oauth2/token", self.auth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;
        let response = ArchiveError::check_status(response).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// https://dev.twitch.tv/docs/api/reference/#get-users
    pub async fn users(&self, credential: &Credential, login: &str) -> ArchiveResult<Vec<User>> {
        self.helix(credential, "users", &[("login", login)]).await
    }

    /// https://dev.twitch.tv/docs/api/reference/#get-videos
    pub async fn latest_archives(
        &self,
        credential: &Credential,
        user_id: &str,
    ) -> ArchiveResult<Vec<Video>> {
        self.helix(
            credential,
            "videos",
            &[
                ("type", "archive"),
                ("sort", "time"),
                ("first", "1"),
                ("user_id", user_id),
            ],
        )
        .await
    }

    async fn helix<T>(
        &self,
        credential: &Credential,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> ArchiveResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(format!("{}/helix/{endpoint}", self.api_url))
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", credential.access_token))
            .header("Client-Id", &self.client_id)
            .send()
            .await?;
        let response = ArchiveError::check_status(response).await?;

        let body = response.text().await?;
        let data: DataResponse<T> = serde_json::from_str(&body)?;
        log::debug!("helix/{endpoint} returned {} item(s)", data.data.len());
        Ok(data.data)
    }
}

impl RecordingPlatform for TwitchClient {
    async fn authenticate(&self) -> ArchiveResult<Credential> {
        Ok(self.access_token().await?.into())
    }

    async fn search_users(
        &self,
        credential: &Credential,
        login: &str,
    ) -> ArchiveResult<Vec<ChannelIdentity>> {
        let users = self.users(credential, login).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn latest_recordings(
        &self,
        credential: &Credential,
        user_id: &str,
    ) -> ArchiveResult<Vec<RecordingMetadata>> {
        let videos = self.latest_archives(credential, user_id).await?;
        Ok(videos.into_iter().map(Into::into).collect())
    }
}
