use std::{
    ffi::OsString,
    future::Future,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
};

use tokio::process::Command;

use crate::{
    error::{ArchiveError, ArchiveResult},
    model::RecordingMetadata,
};

/// Quality requested from the downloader when none is given.
pub const DEFAULT_QUALITY: &str = "720p60";

/// Caller supplied download flags, forwarded verbatim to the downloader.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub quality: Option<String>,
    /// Trim start, in seconds.
    pub start: Option<String>,
    /// Trim end, in seconds.
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub recording_id: String,
    pub output: PathBuf,
    pub quality: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DownloadRequest {
    pub fn new(recording: &RecordingMetadata, download_dir: &Path, options: &DownloadOptions) -> Self {
        Self {
            recording_id: recording.id.clone(),
            output: download_dir.join(recording.archive_file_name()),
            quality: non_empty(&options.quality)
                .unwrap_or(DEFAULT_QUALITY)
                .to_string(),
            start: non_empty(&options.start).map(str::to_string),
            end: non_empty(&options.end).map(str::to_string),
        }
    }

    /// Arguments of the `videodownload` subcommand.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "videodownload".into(),
            "--id".into(),
            self.recording_id.clone().into(),
            "-o".into(),
            self.output.clone().into(),
            "-q".into(),
            self.quality.clone().into(),
        ];

        if let Some(start) = &self.start {
            args.push("-b".into());
            args.push(start.into());
        }
        if let Some(end) = &self.end {
            args.push("-e".into());
            args.push(end.into());
        }

        args
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Materializes a recording as a local file.
pub trait RecordingDownloader: Send + Sync {
    fn download(&self, request: &DownloadRequest) -> impl Future<Output = ArchiveResult<()>> + Send;
}

impl<D> RecordingDownloader for Arc<D>
where
    D: RecordingDownloader,
{
    fn download(&self, request: &DownloadRequest) -> impl Future<Output = ArchiveResult<()>> + Send {
        self.as_ref().download(request)
    }
}

/// Runs the external downloader executable and waits for it to exit.
///
/// Standard output of the child is inherited, so progress is shown live.
pub struct CliDownloader {
    executable: PathBuf,
}

impl CliDownloader {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

impl RecordingDownloader for CliDownloader {
    async fn download(&self, request: &DownloadRequest) -> ArchiveResult<()> {
        log::info!(
            "Downloading recording {} to {}",
            request.recording_id,
            request.output.display()
        );
        log::debug!("{} {:?}", self.executable.display(), request.args());

        let status = Command::new(&self.executable)
            .args(request.args())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ArchiveError::DownloaderSpawn {
                path: self.executable.clone(),
                source,
            })?;
        // terminate the progress line of the downloader
        println!();

        if !status.success() {
            return Err(ArchiveError::DownloaderExit(status));
        }

        Ok(())
    }
}
