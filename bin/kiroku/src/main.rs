use std::process::ExitCode;

use clap::{builder::NonEmptyStringValueParser, Parser};
use kiroku::{
    ArchivePublisher, ArchiveReport, Archiver, ArchiverConfig, CliDownloader, DownloadOptions,
};
use kiroku_gdrive::DriveClient;
use kiroku_twitch::TwitchClient;
use tracing_subscriber::filter::LevelFilter;

/// Archive the latest Twitch broadcast of a channel to Google Drive.
#[derive(Parser, Debug, Clone)]
#[clap(name = "kiroku", version)]
pub struct ArchiveArgs {
    /// Login name of the channel
    #[clap(short, long, value_parser = NonEmptyStringValueParser::new())]
    name: String,

    /// Video quality, eg. 1080p60. Defaults to 720p60
    #[clap(short, long)]
    quality: Option<String>,

    /// Trim start, in seconds
    #[clap(short = 'b', long)]
    start: Option<String>,

    /// Trim end, in seconds
    #[clap(short, long)]
    end: Option<String>,

    /// Debug output
    #[clap(short, long, alias = "debug")]
    verbose: bool,
}

impl ArchiveArgs {
    fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            quality: self.quality.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
        }
    }
}

fn print_report(report: &ArchiveReport) {
    log::info!(
        "Archived \"{}\" of {} as {} in {}",
        report.recording.title,
        report.channel.display_name,
        report.uploaded.id,
        report.container.name
    );
    log::debug!("Local copy kept at {}", report.local_path.display());

    let failed = report.retention.failed().count();
    if failed > 0 {
        log::warn!("{failed} old archive(s) could not be deleted");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = ArchiveArgs::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .try_from_env()
                .unwrap_or_else(|_| level.to_string().to_lowercase().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ArchiverConfig::from_env()?;

    let platform = TwitchClient::new(config.twitch_client_id, config.twitch_client_secret);
    let downloader = CliDownloader::new(config.downloader_path);
    let drive = DriveClient::from_service_account_file(&config.credentials_path).await?;
    let publisher = ArchivePublisher::new(drive, config.folder_name, config.share_with);
    let archiver = Archiver::new(platform, downloader, publisher, config.download_dir);

    match archiver.run(&args.name, &args.download_options()).await {
        Ok(report) => {
            print_report(&report);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            log::error!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
