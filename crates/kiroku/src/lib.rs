pub mod config;
pub mod download;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod platform;
pub mod publish;
pub mod retention;
pub mod storage;

pub use config::ArchiverConfig;
pub use download::{CliDownloader, DownloadOptions, DownloadRequest, RecordingDownloader};
pub use error::{ArchiveError, ArchiveResult};
pub use model::*;
pub use pipeline::{ArchiveReport, Archiver, PipelineError, Stage};
pub use platform::RecordingPlatform;
pub use publish::ArchivePublisher;
pub use storage::ArchiveStorage;
