use std::{path::Path, sync::Arc};

use kiroku::{
    config::DEFAULT_FOLDER_NAME, ArchiveError, ArchivePublisher, Archiver, DownloadOptions,
    PermissionRole, Stage,
};

use crate::fake::{channel, recording, FakeDownloader, FakePlatform, FakeStorage};

const RECIPIENT: &str = "archive@example.com";

fn archiver(
    platform: &Arc<FakePlatform>,
    downloader: &Arc<FakeDownloader>,
    storage: &Arc<FakeStorage>,
    download_dir: &Path,
) -> Archiver<Arc<FakePlatform>, Arc<FakeDownloader>, Arc<FakeStorage>> {
    Archiver::new(
        platform.clone(),
        downloader.clone(),
        ArchivePublisher::new(storage.clone(), DEFAULT_FOLDER_NAME, RECIPIENT),
        download_dir,
    )
}

#[tokio::test]
async fn test_archive_latest_recording() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Launch Stream")],
    ));
    let downloader = Arc::new(FakeDownloader::default());
    let storage = Arc::new(FakeStorage::new());
    let folder = storage.add_folder(DEFAULT_FOLDER_NAME);
    storage.add_file("ACME - Episode 4.mp4", &folder.id);
    storage.add_file("ACMEX - Other Channel.mp4", &folder.id);
    storage.add_file("Someone - Else.mp4", &folder.id);

    let report = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap();

    let requests = downloader.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].recording_id, "999");
    assert_eq!(requests[0].quality, "720p60");
    assert_eq!(requests[0].start, None);
    assert_eq!(requests[0].end, None);
    assert_eq!(
        requests[0].output,
        dir.path().join("ACME - Launch Stream.mp4")
    );
    assert!(report.local_path.exists());

    assert_eq!(report.container.id, folder.id);
    assert_eq!(report.uploaded.name, "ACME - Launch Stream.mp4");
    assert_eq!(report.uploaded.parents, vec![folder.id.clone()]);

    let contents = storage.contents.lock().unwrap().clone();
    assert_eq!(contents, vec![(report.uploaded.id.clone(), b"recording".to_vec())]);

    let permissions = storage.permissions.lock().unwrap().clone();
    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].0, report.uploaded.id);
    assert_eq!(permissions[0].1.email_address, RECIPIENT);
    assert_eq!(permissions[0].1.role, PermissionRole::Writer);

    let mut names = storage.file_names(&folder.id);
    names.sort();
    assert_eq!(
        names,
        ["ACME - Launch Stream.mp4", "Someone - Else.mp4"]
    );
    assert!(report.retention.is_clean());
    assert_eq!(report.retention.deleted().count(), 2);

    let acme = storage
        .file_names(&folder.id)
        .into_iter()
        .filter(|name| name.starts_with(&report.recording.user_name))
        .count();
    assert_eq!(acme, 1);
}

#[tokio::test]
async fn test_trim_flags_are_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Launch Stream")],
    ));
    let downloader = Arc::new(FakeDownloader::default());
    let storage = Arc::new(FakeStorage::new());

    let options = DownloadOptions {
        quality: Some("1080p60".to_string()),
        start: Some("30".to_string()),
        end: Some("90".to_string()),
    };
    archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &options)
        .await
        .unwrap();

    let request = &downloader.requests()[0];
    assert_eq!(request.quality, "1080p60");
    assert_eq!(request.start.as_deref(), Some("30"));
    assert_eq!(request.end.as_deref(), Some("90"));
    assert_eq!(request.output, dir.path().join("ACME - Launch Stream.mp4"));
}

#[tokio::test]
async fn test_unknown_channel_stops_before_video_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(vec![], vec![recording("Launch Stream")]));
    let downloader = Arc::new(FakeDownloader::default());
    let storage = Arc::new(FakeStorage::new());

    let err = archiver(&platform, &downloader, &storage, dir.path())
        .run("nobody", &DownloadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::ResolveChannel);
    assert!(matches!(err.source, ArchiveError::NotFound(_)));
    assert_eq!(platform.calls(), ["authenticate", "search_users"]);
    assert!(downloader.requests().is_empty());
    assert_eq!(storage.folders_named(DEFAULT_FOLDER_NAME), 0);
}

#[tokio::test]
async fn test_channel_without_recordings() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(vec![channel()], vec![]));
    let downloader = Arc::new(FakeDownloader::default());
    let storage = Arc::new(FakeStorage::new());

    let err = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::LocateRecording);
    assert!(matches!(err.source, ArchiveError::NotFound(_)));
    assert!(downloader.requests().is_empty());
}

#[tokio::test]
async fn test_empty_token_is_an_auth_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut platform = FakePlatform::new(vec![channel()], vec![recording("Launch Stream")]);
    platform.token = String::new();
    let platform = Arc::new(platform);
    let downloader = Arc::new(FakeDownloader::default());
    let storage = Arc::new(FakeStorage::new());

    let err = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Authenticate);
    assert!(matches!(err.source, ArchiveError::Auth(_)));
    assert_eq!(platform.calls(), ["authenticate"]);
}

#[tokio::test]
async fn test_download_failure_leaves_storage_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Launch Stream")],
    ));
    let downloader = Arc::new(FakeDownloader::failing());
    let storage = Arc::new(FakeStorage::new());

    let err = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Download);
    assert_eq!(storage.folders_named(DEFAULT_FOLDER_NAME), 0);
    assert!(err.to_string().starts_with("error on downloading the video"));
}

#[tokio::test]
async fn test_share_failure_keeps_upload_and_skips_retention() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Episode 5")],
    ));
    let downloader = Arc::new(FakeDownloader::default());
    let mut storage = FakeStorage::new();
    storage.fail_share = true;
    let storage = Arc::new(storage);
    let folder = storage.add_folder(DEFAULT_FOLDER_NAME);
    storage.add_file("ACME - Episode 4.mp4", &folder.id);

    let err = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Share);
    assert!(matches!(err.source, ArchiveError::Share(_)));

    let mut names = storage.file_names(&folder.id);
    names.sort();
    assert_eq!(names, ["ACME - Episode 4.mp4", "ACME - Episode 5.mp4"]);
}

#[tokio::test]
async fn test_failed_upload_removes_incomplete_file() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Episode 5")],
    ));
    let downloader = Arc::new(FakeDownloader::default());
    let mut storage = FakeStorage::new();
    storage.fail_upload = true;
    let storage = Arc::new(storage);
    let folder = storage.add_folder(DEFAULT_FOLDER_NAME);

    let err = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::Upload);
    assert!(matches!(err.source, ArchiveError::Upload(_)));
    assert!(storage.file_names(&folder.id).is_empty());
    // the local recording is kept
    assert!(dir.path().join("ACME - Episode 5.mp4").exists());
}

#[tokio::test]
async fn test_delete_failure_does_not_abort() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Episode 5")],
    ));
    let downloader = Arc::new(FakeDownloader::default());
    let mut storage = FakeStorage::new();
    let folder = storage.add_folder(DEFAULT_FOLDER_NAME);
    let stuck = storage.add_file("ACME - Episode 3.mp4", &folder.id);
    storage.add_file("ACME - Episode 4.mp4", &folder.id);
    storage.fail_delete.insert(stuck.id.clone());
    let storage = Arc::new(storage);

    let report = archiver(&platform, &downloader, &storage, dir.path())
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap();

    assert!(!report.retention.is_clean());
    let failed: Vec<_> = report.retention.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].item.id, stuck.id);
    assert!(matches!(failed[0].result, Err(ArchiveError::Delete(_))));

    let deleted: Vec<_> = report.retention.deleted().map(|i| i.name.clone()).collect();
    assert_eq!(deleted, ["ACME - Episode 4.mp4"]);

    let mut names = storage.file_names(&folder.id);
    names.sort();
    assert_eq!(names, ["ACME - Episode 3.mp4", "ACME - Episode 5.mp4"]);
}

#[tokio::test]
async fn test_container_is_created_once() {
    let dir = tempfile::tempdir().unwrap();
    let platform = Arc::new(FakePlatform::new(
        vec![channel()],
        vec![recording("Launch Stream")],
    ));
    let downloader = Arc::new(FakeDownloader::default());
    let storage = Arc::new(FakeStorage::new());
    let archiver = archiver(&platform, &downloader, &storage, dir.path());

    let first = archiver
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap();
    let second = archiver
        .run("acme", &DownloadOptions::default())
        .await
        .unwrap();

    assert_eq!(storage.folders_named(DEFAULT_FOLDER_NAME), 1);
    assert_eq!(first.container.id, second.container.id);
    // the second upload retires the first one
    assert_eq!(
        second.retention.deleted().map(|i| &i.id).collect::<Vec<_>>(),
        [&first.uploaded.id]
    );
    assert_eq!(
        storage.file_names(&first.container.id),
        ["ACME - Launch Stream.mp4"]
    );
}
