use crate::db::{self, Pool};
use crate::drive::DocumentSource;
use crate::glink;
use crate::model::Folder;
use anyhow::Result;
use tracing::{info, instrument, warn};

/// Result of syncing one name into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Published,
    /// No exportable document with that name; the store was not touched.
    NotFound,
}

/// Per-name results of a batch sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub published: Vec<String>,
    pub not_found: Vec<String>,
    /// Names whose store write failed, with the error text.
    pub failed: Vec<(String, String)>,
}

/// Fetch and transform the named document from the folder.
///
/// Returns `None` when there is no such file, when it is not a Google Doc,
/// or when the source fails; source faults are logged, never returned.
#[instrument(skip_all, fields(name = %name))]
pub async fn fetch_post(
    source: &dyn DocumentSource,
    folder: &Folder,
    name: &str,
) -> Option<String> {
    let doc = match source.find_document(&folder.id, name).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            info!("file not found in folder");
            return None;
        }
        Err(err) => {
            warn!(?err, "document lookup failed");
            return None;
        }
    };

    info!(id = %doc.id, mime_type = %doc.mime_type, "found file");
    if !doc.is_exportable() {
        info!("file is not a Google Doc; skipping");
        return None;
    }

    match source.export_html(&doc.id).await {
        Ok(html) => Some(glink::transform(&html)),
        Err(err) => {
            warn!(?err, id = %doc.id, "export failed");
            None
        }
    }
}

/// Fetch one document and upsert it. A missing document leaves the store as is.
pub async fn sync_post(
    pool: &Pool,
    source: &dyn DocumentSource,
    folder: &Folder,
    name: &str,
) -> Result<SyncOutcome> {
    match fetch_post(source, folder, name).await {
        Some(content) => {
            db::upsert_post(pool, name, &content).await?;
            info!(name, bytes = content.len(), "post published");
            Ok(SyncOutcome::Published)
        }
        None => Ok(SyncOutcome::NotFound),
    }
}

/// Merge explicit names with a comma-separated list. Entries are trimmed and
/// blanks dropped; order is kept.
pub fn collect_names<S: AsRef<str>>(names: &[S], csv: &str) -> Vec<String> {
    names
        .iter()
        .map(|n| n.as_ref())
        .chain(csv.split(','))
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sync each name independently; one failure never stops the rest.
#[instrument(skip_all, fields(count = names.len()))]
pub async fn sync_batch(
    pool: &Pool,
    source: &dyn DocumentSource,
    folder: &Folder,
    names: &[String],
) -> BatchReport {
    let mut report = BatchReport::default();
    for name in names {
        match sync_post(pool, source, folder, name).await {
            Ok(SyncOutcome::Published) => report.published.push(name.clone()),
            Ok(SyncOutcome::NotFound) => report.not_found.push(name.clone()),
            Err(err) => {
                warn!(?err, name = %name, "failed to store post");
                report.failed.push((name.clone(), format!("{err:#}")));
            }
        }
    }
    info!(
        published = report.published.len(),
        not_found = report.not_found.len(),
        failed = report.failed.len(),
        "batch sync finished"
    );
    report
}
