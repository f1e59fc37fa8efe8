use std::path::Path;

use tokio::fs::File;

use crate::{
    error::{ArchiveError, ArchiveResult},
    model::{Permission, RemoteItem},
    storage::ArchiveStorage,
};

/// A local recording opened for upload.
pub struct LocalArchive {
    pub file: File,
    pub length: u64,
}

/// Puts a downloaded recording into the archive folder and shares it.
pub struct ArchivePublisher<S> {
    storage: S,
    folder_name: String,
    share_with: String,
}

impl<S> ArchivePublisher<S>
where
    S: ArchiveStorage,
{
    pub fn new(storage: S, folder_name: impl Into<String>, share_with: impl Into<String>) -> Self {
        Self {
            storage,
            folder_name: folder_name.into(),
            share_with: share_with.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn open_local(&self, path: &Path) -> ArchiveResult<LocalArchive> {
        let local_io = |source| ArchiveError::LocalIo {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).await.map_err(local_io)?;
        let length = file.metadata().await.map_err(local_io)?.len();
        Ok(LocalArchive { file, length })
    }

    /// Find the archive folder, creating it when it does not exist yet.
    ///
    /// When several folders share the name the first one returned by the backend is used.
    pub async fn resolve_container(&self) -> ArchiveResult<RemoteItem> {
        let mut folders = self.storage.find_folders(&self.folder_name).await?;
        if folders.len() > 1 {
            log::warn!(
                "Found {} folders named {}, using the first one",
                folders.len(),
                self.folder_name
            );
        }

        if folders.is_empty() {
            let folder = self.storage.create_folder(&self.folder_name).await?;
            log::info!("Parent folder created");
            Ok(folder)
        } else {
            log::info!("Parent folder found");
            Ok(folders.swap_remove(0))
        }
    }

    pub async fn upload(
        &self,
        local: LocalArchive,
        name: &str,
        container: &RemoteItem,
    ) -> ArchiveResult<RemoteItem> {
        log::info!("Uploading file...");
        let file = self
            .storage
            .create_file(name, &container.id)
            .await
            .map_err(ArchiveError::upload)?;

        if let Err(e) = self
            .storage
            .upload_media(&file.id, local.file, local.length)
            .await
        {
            if let Err(cleanup) = self.storage.delete(&file.id).await {
                log::warn!("Failed to remove incomplete file {}: {cleanup}", file.id);
            }
            return Err(ArchiveError::upload(e));
        }

        log::info!("File uploaded successfully. File ID: {}", file.id);
        Ok(file)
    }

    pub async fn share(&self, file: &RemoteItem) -> ArchiveResult<()> {
        self.storage
            .grant_permission(&file.id, &Permission::writer(&self.share_with))
            .await
            .map_err(ArchiveError::share)?;

        log::info!("File shared successfully with {}", self.share_with);
        Ok(())
    }
}
