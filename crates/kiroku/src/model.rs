use std::time::Duration;

use chrono::{DateTime, Utc};

/// Extension of every archived recording.
pub const ARCHIVE_EXTENSION: &str = "mp4";

/// Bearer token issued by the platform's client-credentials exchange.
///
/// Lives for a single run and is never persisted.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelIdentity {
    pub id: String,
    pub login: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutedSegment {
    /// Offset from the start of the recording, in seconds.
    pub offset: u64,
    /// Length of the muted part, in seconds.
    pub duration: u64,
}

#[derive(Debug, Clone)]
pub struct RecordingMetadata {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    /// Display name of the owning channel.
    pub user_name: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    pub duration: Duration,
    pub muted_segments: Vec<MutedSegment>,
}

impl RecordingMetadata {
    /// Name of the archived file: `<display name> - <title>.mp4`.
    ///
    /// Path separators are replaced so the name is always a single path component.
    pub fn archive_file_name(&self) -> String {
        format!(
            "{} - {}.{ARCHIVE_EXTENSION}",
            sanitize_component(&self.user_name),
            sanitize_component(&self.title)
        )
    }

    /// Prefix shared by every archived file of the owning channel.
    ///
    /// This is the bare display name, so channels whose display name starts
    /// with this one are matched too.
    pub fn archive_prefix(&self) -> String {
        sanitize_component(&self.user_name)
    }
}

fn sanitize_component(input: &str) -> String {
    input.replace(['/', '\\', '\0'], "_")
}

/// An item stored in the remote archive, either a folder or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionRole {
    Writer,
}

impl PermissionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionRole::Writer => "writer",
        }
    }
}

/// Access granted to a single user on an archived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub email_address: String,
    pub role: PermissionRole,
}

impl Permission {
    pub fn writer(email_address: impl Into<String>) -> Self {
        Self {
            email_address: email_address.into(),
            role: PermissionRole::Writer,
        }
    }
}
