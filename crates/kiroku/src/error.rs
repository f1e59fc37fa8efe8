use std::{path::PathBuf, process::ExitStatus};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("HTTP error: {status}: {body}")]
    HttpError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("can not start downloader {path}: {source}")]
    DownloaderSpawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("downloader exited with {0}")]
    DownloaderExit(ExitStatus),

    #[error("can not read {path}: {source}")]
    LocalIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("upload failed: {0}")]
    Upload(#[source] Box<ArchiveError>),

    #[error("share failed: {0}")]
    Share(#[source] Box<ArchiveError>),

    #[error("delete failed: {0}")]
    Delete(#[source] Box<ArchiveError>),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid service credentials: {0}")]
    Credentials(String),
}

impl ArchiveError {
    pub fn upload(err: ArchiveError) -> Self {
        Self::Upload(Box::new(err))
    }

    pub fn share(err: ArchiveError) -> Self {
        Self::Share(Box::new(err))
    }

    pub fn delete(err: ArchiveError) -> Self {
        Self::Delete(Box::new(err))
    }

    /// Turns a non-success response into [ArchiveError::HttpError], keeping the body for diagnostics.
    pub async fn check_status(response: reqwest::Response) -> ArchiveResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::HttpError { status, body })
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
