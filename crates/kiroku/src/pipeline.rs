use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::{
    download::{DownloadOptions, DownloadRequest, RecordingDownloader},
    error::ArchiveError,
    model::{ChannelIdentity, RecordingMetadata, RemoteItem},
    platform::{acquire_credential, locate_latest_recording, resolve_channel, RecordingPlatform},
    publish::ArchivePublisher,
    retention::{enforce_retention, RetentionReport},
    storage::ArchiveStorage,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Authenticate,
    ResolveChannel,
    LocateRecording,
    Download,
    OpenLocalFile,
    ResolveContainer,
    Upload,
    Share,
    Retention,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Authenticate => "getting the access token",
            Stage::ResolveChannel => "resolving the channel",
            Stage::LocateRecording => "locating the latest recording",
            Stage::Download => "downloading the video",
            Stage::OpenLocalFile => "opening the downloaded file",
            Stage::ResolveContainer => "resolving the archive folder",
            Stage::Upload => "uploading the video",
            Stage::Share => "sharing the video",
            Stage::Retention => "cleaning up old videos",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
#[error("error on {stage}: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: ArchiveError,
}

trait StageContext<T> {
    fn stage(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T> StageContext<T> for Result<T, ArchiveError> {
    fn stage(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

/// Everything a successful run produced.
#[derive(Debug)]
pub struct ArchiveReport {
    pub channel: ChannelIdentity,
    pub recording: RecordingMetadata,
    pub local_path: PathBuf,
    pub container: RemoteItem,
    pub uploaded: RemoteItem,
    pub retention: RetentionReport,
}

/// Archives the latest recording of a channel.
///
/// ```text
/// token ─► channel ─► recording ─► local file ─► folder ─► upload ─► share ─► retention
/// ```
///
/// Stages run strictly in order and the first failure aborts the run.
pub struct Archiver<P, D, S> {
    platform: P,
    downloader: D,
    publisher: ArchivePublisher<S>,
    download_dir: PathBuf,
}

impl<P, D, S> Archiver<P, D, S>
where
    P: RecordingPlatform,
    D: RecordingDownloader,
    S: ArchiveStorage,
{
    pub fn new(
        platform: P,
        downloader: D,
        publisher: ArchivePublisher<S>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            platform,
            downloader,
            publisher,
            download_dir: download_dir.into(),
        }
    }

    pub async fn run(
        &self,
        login: &str,
        options: &DownloadOptions,
    ) -> Result<ArchiveReport, PipelineError> {
        let credential = acquire_credential(&self.platform)
            .await
            .stage(Stage::Authenticate)?;

        let channel = resolve_channel(&self.platform, &credential, login)
            .await
            .stage(Stage::ResolveChannel)?;

        let recording = locate_latest_recording(&self.platform, &credential, &channel)
            .await
            .stage(Stage::LocateRecording)?;

        let request = DownloadRequest::new(&recording, &self.download_dir, options);
        self.downloader
            .download(&request)
            .await
            .stage(Stage::Download)?;

        let local = self
            .publisher
            .open_local(&request.output)
            .await
            .stage(Stage::OpenLocalFile)?;

        let container = self
            .publisher
            .resolve_container()
            .await
            .stage(Stage::ResolveContainer)?;

        let uploaded = self
            .publisher
            .upload(local, &recording.archive_file_name(), &container)
            .await
            .stage(Stage::Upload)?;

        self.publisher.share(&uploaded).await.stage(Stage::Share)?;

        let retention = enforce_retention(
            self.publisher.storage(),
            &container.id,
            &uploaded,
            &recording.archive_prefix(),
        )
        .await
        .stage(Stage::Retention)?;

        Ok(ArchiveReport {
            channel,
            recording,
            local_path: request.output,
            container,
            uploaded,
            retention,
        })
    }
}
