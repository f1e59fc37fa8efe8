use std::{future::Future, sync::Arc};

use tokio::fs::File;

use crate::{
    error::ArchiveResult,
    model::{Permission, RemoteItem},
};

/// The cloud storage backend holding the archived files.
pub trait ArchiveStorage: Send + Sync {
    /// Search folders with exactly the given name.
    fn find_folders(&self, name: &str) -> impl Future<Output = ArchiveResult<Vec<RemoteItem>>> + Send;

    fn create_folder(&self, name: &str) -> impl Future<Output = ArchiveResult<RemoteItem>> + Send;

    /// Create an empty file item under `parent_id`.
    fn create_file(
        &self,
        name: &str,
        parent_id: &str,
    ) -> impl Future<Output = ArchiveResult<RemoteItem>> + Send;

    /// Upload the content of a file item previously created by [ArchiveStorage::create_file].
    fn upload_media(
        &self,
        file_id: &str,
        media: File,
        length: u64,
    ) -> impl Future<Output = ArchiveResult<()>> + Send;

    fn grant_permission(
        &self,
        file_id: &str,
        permission: &Permission,
    ) -> impl Future<Output = ArchiveResult<()>> + Send;

    /// List every item directly under `parent_id`.
    fn list_children(
        &self,
        parent_id: &str,
    ) -> impl Future<Output = ArchiveResult<Vec<RemoteItem>>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = ArchiveResult<()>> + Send;
}

impl<S> ArchiveStorage for Arc<S>
where
    S: ArchiveStorage,
{
    fn find_folders(&self, name: &str) -> impl Future<Output = ArchiveResult<Vec<RemoteItem>>> + Send {
        self.as_ref().find_folders(name)
    }

    fn create_folder(&self, name: &str) -> impl Future<Output = ArchiveResult<RemoteItem>> + Send {
        self.as_ref().create_folder(name)
    }

    fn create_file(
        &self,
        name: &str,
        parent_id: &str,
    ) -> impl Future<Output = ArchiveResult<RemoteItem>> + Send {
        self.as_ref().create_file(name, parent_id)
    }

    fn upload_media(
        &self,
        file_id: &str,
        media: File,
        length: u64,
    ) -> impl Future<Output = ArchiveResult<()>> + Send {
        self.as_ref().upload_media(file_id, media, length)
    }

    fn grant_permission(
        &self,
        file_id: &str,
        permission: &Permission,
    ) -> impl Future<Output = ArchiveResult<()>> + Send {
        self.as_ref().grant_permission(file_id, permission)
    }

    fn list_children(
        &self,
        parent_id: &str,
    ) -> impl Future<Output = ArchiveResult<Vec<RemoteItem>>> + Send {
        self.as_ref().list_children(parent_id)
    }

    fn delete(&self, id: &str) -> impl Future<Output = ArchiveResult<()>> + Send {
        self.as_ref().delete(id)
    }
}
