use crate::{
    error::{ArchiveError, ArchiveResult},
    model::RemoteItem,
    storage::ArchiveStorage,
};

/// Result of deleting one stale archive.
#[derive(Debug)]
pub struct DeleteOutcome {
    pub item: RemoteItem,
    pub result: ArchiveResult<()>,
}

#[derive(Debug, Default)]
pub struct RetentionReport {
    pub outcomes: Vec<DeleteOutcome>,
}

impl RetentionReport {
    pub fn deleted(&self) -> impl Iterator<Item = &RemoteItem> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| &o.item)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DeleteOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn is_clean(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Delete every file under `container_id` that shares `prefix` with the new archive `keep`.
///
/// A failed listing aborts. A failed delete is recorded and the remaining
/// candidates are still processed.
pub async fn enforce_retention(
    storage: &impl ArchiveStorage,
    container_id: &str,
    keep: &RemoteItem,
    prefix: &str,
) -> ArchiveResult<RetentionReport> {
    let children = storage.list_children(container_id).await?;

    let mut report = RetentionReport::default();
    for item in children
        .into_iter()
        .filter(|item| item.id != keep.id && item.name.starts_with(prefix))
    {
        let result = storage.delete(&item.id).await.map_err(ArchiveError::delete);
        match &result {
            Ok(()) => log::info!("Old file deleted successfully: {}", item.name),
            Err(e) => log::warn!("Failed to delete old file {}: {e}", item.name),
        }
        report.outcomes.push(DeleteOutcome { item, result });
    }

    Ok(report)
}
