use std::time::Duration;

use chrono::{DateTime, Utc};
use kiroku::{ChannelIdentity, Credential, MutedSegment, RecordingMetadata};
use serde::{Deserialize, Deserializer};

// {"access_token":"jostpf5q0uzmxmkba9iyug38kjtgh","expires_in":5011271,"token_type":"bearer"}
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl From<TokenResponse> for Credential {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
        }
    }
}

/// Envelope of every Helix list endpoint.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub display_name: String,

    /// admin, global_mod, staff or empty
    #[serde(default)]
    pub r#type: String,
    /// affiliate, partner or empty
    #[serde(default)]
    pub broadcaster_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub profile_image_url: String,
    #[serde(default)]
    pub offline_image_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for ChannelIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            display_name: user.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Video {
    pub id: String,
    pub stream_id: Option<String>,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// public or private
    #[serde(default)]
    pub viewable: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub language: String,
    /// archive, highlight or upload
    pub r#type: String,
    /// e.g. `3h8m33s`
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    /// `null` when nothing is muted
    #[serde(default)]
    pub muted_segments: Option<Vec<VideoMutedSegment>>,
}

#[derive(Debug, Deserialize)]
pub struct VideoMutedSegment {
    pub duration: u64,
    pub offset: u64,
}

impl From<Video> for RecordingMetadata {
    fn from(video: Video) -> Self {
        Self {
            id: video.id,
            user_id: video.user_id,
            user_login: video.user_login,
            user_name: video.user_name,
            title: video.title,
            created_at: video.created_at,
            published_at: video.published_at,
            duration: video.duration,
            muted_segments: video
                .muted_segments
                .unwrap_or_default()
                .into_iter()
                .map(|s| MutedSegment {
                    offset: s.offset,
                    duration: s.duration,
                })
                .collect(),
        }
    }
}

/// Parse durations in the `1h2m3s` form used by the video endpoint.
pub fn parse_duration(input: &str) -> Option<Duration> {
    if input.is_empty() {
        return None;
    }

    let mut seconds: u64 = 0;
    let mut number = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }

        let value: u64 = number.parse().ok()?;
        number.clear();
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        seconds = seconds.checked_add(value.checked_mul(unit)?)?;
    }

    // trailing number without unit
    if !number.is_empty() {
        return None;
    }

    Some(Duration::from_secs(seconds))
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {raw}")))
}
