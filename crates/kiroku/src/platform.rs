use std::{future::Future, sync::Arc};

use crate::{
    error::{ArchiveError, ArchiveResult},
    model::{ChannelIdentity, Credential, RecordingMetadata},
};

/// The streaming platform holding the channels and their recordings.
pub trait RecordingPlatform: Send + Sync {
    /// Exchange the configured application credentials for a bearer token.
    fn authenticate(&self) -> impl Future<Output = ArchiveResult<Credential>> + Send;

    /// Look up channels by login name.
    fn search_users(
        &self,
        credential: &Credential,
        login: &str,
    ) -> impl Future<Output = ArchiveResult<Vec<ChannelIdentity>>> + Send;

    /// List archived broadcasts of a channel, newest first, one per page.
    ///
    /// Ordering is decided by the platform. Implementations must not fetch a
    /// larger page and sort locally.
    fn latest_recordings(
        &self,
        credential: &Credential,
        user_id: &str,
    ) -> impl Future<Output = ArchiveResult<Vec<RecordingMetadata>>> + Send;
}

impl<P> RecordingPlatform for Arc<P>
where
    P: RecordingPlatform,
{
    fn authenticate(&self) -> impl Future<Output = ArchiveResult<Credential>> + Send {
        self.as_ref().authenticate()
    }

    fn search_users(
        &self,
        credential: &Credential,
        login: &str,
    ) -> impl Future<Output = ArchiveResult<Vec<ChannelIdentity>>> + Send {
        self.as_ref().search_users(credential, login)
    }

    fn latest_recordings(
        &self,
        credential: &Credential,
        user_id: &str,
    ) -> impl Future<Output = ArchiveResult<Vec<RecordingMetadata>>> + Send {
        self.as_ref().latest_recordings(credential, user_id)
    }
}

pub async fn acquire_credential(platform: &impl RecordingPlatform) -> ArchiveResult<Credential> {
    let credential = platform.authenticate().await.map_err(|e| match e {
        ArchiveError::Auth(_) => e,
        e => ArchiveError::Auth(e.to_string()),
    })?;

    if credential.access_token.is_empty() {
        return Err(ArchiveError::Auth("empty access token".to_string()));
    }

    log::debug!(
        "Obtained {} token, expires in {}s",
        credential.token_type,
        credential.expires_in
    );
    Ok(credential)
}

pub async fn resolve_channel(
    platform: &impl RecordingPlatform,
    credential: &Credential,
    login: &str,
) -> ArchiveResult<ChannelIdentity> {
    let channel = platform
        .search_users(credential, login)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ArchiveError::NotFound(format!("channel {login}")))?;

    log::info!("Resolved channel {} (id {})", channel.display_name, channel.id);
    Ok(channel)
}

pub async fn locate_latest_recording(
    platform: &impl RecordingPlatform,
    credential: &Credential,
    channel: &ChannelIdentity,
) -> ArchiveResult<RecordingMetadata> {
    let recording = platform
        .latest_recordings(credential, &channel.id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ArchiveError::NotFound(format!("recording of {}", channel.login)))?;

    log::info!(
        "Latest recording {}: {} ({}s, published at {})",
        recording.id,
        recording.title,
        recording.duration.as_secs(),
        recording.published_at
    );
    if !recording.muted_segments.is_empty() {
        log::warn!(
            "Recording {} has {} muted segment(s)",
            recording.id,
            recording.muted_segments.len()
        );
    }
    Ok(recording)
}
