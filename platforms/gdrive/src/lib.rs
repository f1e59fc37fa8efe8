pub mod auth;
pub mod model;

use std::path::Path;

use auth::{DriveAuth, ServiceAccountKey};
use kiroku::{ArchiveError, ArchiveResult, ArchiveStorage, Permission, RemoteItem};
use model::*;
use reqwest::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    Body, Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

pub const DRIVE_API_URL: &str = "https://www.googleapis.com";

const PAGE_SIZE: &str = "1000";
const MEDIA_MIME_TYPE: &str = "video/mp4";

/// Google Drive v3 backed archive storage.
pub struct DriveClient {
    client: Client,
    auth: DriveAuth,
    base_url: String,
}

impl DriveClient {
    pub fn new(client: Client, auth: DriveAuth) -> Self {
        Self {
            client,
            auth,
            base_url: DRIVE_API_URL.to_string(),
        }
    }

    /// Authenticate with the service account key stored at `path`.
    pub async fn from_service_account_file(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let key = ServiceAccountKey::from_file(path).await?;
        Ok(Self::new(Client::new(), DriveAuth::service_account(key)))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.base_url)
    }

    async fn authorized(&self, request: RequestBuilder) -> ArchiveResult<RequestBuilder> {
        let token = self.auth.token(&self.client).await?;
        Ok(request.bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder) -> ArchiveResult<reqwest::Response> {
        let response = self.authorized(request).await?.send().await?;
        ArchiveError::check_status(response).await
    }

    async fn send_json<T>(&self, request: RequestBuilder) -> ArchiveResult<T>
    where
        T: DeserializeOwned,
    {
        let body = self.send(request).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Run a `files.list` query, following every page.
    pub async fn list(&self, query: &str) -> ArchiveResult<Vec<DriveFile>> {
        let fields = format!("nextPageToken,files({FILE_FIELDS})");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(self.files_url()).query(&[
                ("q", query),
                ("fields", fields.as_str()),
                ("pageSize", PAGE_SIZE),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: FileList = self.send_json(request).await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(files)
    }

    pub async fn create(&self, file: &NewFile<'_>) -> ArchiveResult<DriveFile> {
        let request = self
            .client
            .post(self.files_url())
            .query(&[("fields", FILE_FIELDS)])
            .json(file);
        self.send_json(request).await
    }
}

impl ArchiveStorage for DriveClient {
    async fn find_folders(&self, name: &str) -> ArchiveResult<Vec<RemoteItem>> {
        let folders = self.list(&folder_query(name)).await?;
        Ok(folders.into_iter().map(Into::into).collect())
    }

    async fn create_folder(&self, name: &str) -> ArchiveResult<RemoteItem> {
        let folder = self
            .create(&NewFile {
                name,
                mime_type: Some(FOLDER_MIME_TYPE),
                parents: Vec::new(),
            })
            .await?;
        Ok(folder.into())
    }

    async fn create_file(&self, name: &str, parent_id: &str) -> ArchiveResult<RemoteItem> {
        let file = self
            .create(&NewFile {
                name,
                mime_type: Some(MEDIA_MIME_TYPE),
                parents: vec![parent_id],
            })
            .await?;
        Ok(file.into())
    }

    async fn upload_media(&self, file_id: &str, media: File, length: u64) -> ArchiveResult<()> {
        let request = self
            .client
            .patch(format!("{}/upload/drive/v3/files/{file_id}", self.base_url))
            .query(&[("uploadType", "media")])
            .header(CONTENT_TYPE, MEDIA_MIME_TYPE)
            .header(CONTENT_LENGTH, length)
            .body(Body::wrap_stream(ReaderStream::new(media)));
        self.send(request).await?;
        Ok(())
    }

    async fn grant_permission(&self, file_id: &str, permission: &Permission) -> ArchiveResult<()> {
        let request = self
            .client
            .post(format!("{}/{file_id}/permissions", self.files_url()))
            .json(&NewPermission::from(permission));
        self.send(request).await?;
        Ok(())
    }

    async fn list_children(&self, parent_id: &str) -> ArchiveResult<Vec<RemoteItem>> {
        let files = self.list(&children_query(parent_id)).await?;
        Ok(files.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: &str) -> ArchiveResult<()> {
        let request = self.client.delete(format!("{}/{id}", self.files_url()));
        self.send(request).await?;
        Ok(())
    }
}
