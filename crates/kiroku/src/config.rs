use std::path::PathBuf;

use crate::error::{ArchiveError, ArchiveResult};

/// Name of the remote folder holding the archives of every channel.
pub const DEFAULT_FOLDER_NAME: &str = "twitch-videos";

const TWITCH_CLIENT_ID: &str = "TWITCH_CLIENT_ID";
const TWITCH_CLIENT_SECRET: &str = "TWITCH_CLIENT_SECRET";
const LOCAL_FILE_PATH: &str = "LOCAL_FILE_PATH";
const TWITCH_DOWNLOADER_CLI_PATH: &str = "TWITCH_DOWNLOADER_CLI_PATH";
const GOOGLE_CLOUD_CREDENTIALS_PATH: &str = "GOOGLE_CLOUD_CREDENTIALS_PATH";
const SHARE_WITH_USER: &str = "SHARE_WITH_USER";
const ARCHIVE_FOLDER_NAME: &str = "ARCHIVE_FOLDER_NAME";

/// Settings of a single archive run, validated once at startup.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    pub twitch_client_id: String,
    pub twitch_client_secret: String,
    /// Directory the downloader writes recordings into.
    pub download_dir: PathBuf,
    pub downloader_path: PathBuf,
    /// Service account key used by the storage backend.
    pub credentials_path: PathBuf,
    /// Recipient granted write access to every uploaded archive.
    pub share_with: String,
    pub folder_name: String,
}

impl ArchiverConfig {
    pub fn from_env() -> ArchiveResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    ///
    /// Every missing or empty required key is reported in a single [ArchiveError::Config].
    pub fn from_lookup<F>(lookup: F) -> ArchiveResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let twitch_client_id = required(TWITCH_CLIENT_ID);
        let twitch_client_secret = required(TWITCH_CLIENT_SECRET);
        let download_dir = required(LOCAL_FILE_PATH);
        let downloader_path = required(TWITCH_DOWNLOADER_CLI_PATH);
        let credentials_path = required(GOOGLE_CLOUD_CREDENTIALS_PATH);
        let share_with = required(SHARE_WITH_USER);

        if !missing.is_empty() {
            return Err(ArchiveError::Config(format!(
                "missing environment variable: {}",
                missing.join(", ")
            )));
        }

        let folder_name = lookup(ARCHIVE_FOLDER_NAME)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string());

        Ok(Self {
            twitch_client_id,
            twitch_client_secret,
            download_dir: PathBuf::from(download_dir),
            downloader_path: PathBuf::from(downloader_path),
            credentials_path: PathBuf::from(credentials_path),
            share_with,
            folder_name,
        })
    }
}
