//! Folder/store reconciliation and the admin actions built on it.

use crate::db::{self, Pool};
use crate::drive::DocumentSource;
use crate::model::{Document, FileState, Folder};
use crate::sync::{self, SyncOutcome};
use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{info, instrument};

/// Every name from the folder listing and the store, each in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// In the folder and in the store, in listing order.
    pub active: Vec<Document>,
    /// In the folder only, in listing order.
    pub available: Vec<Document>,
    /// In the store only, in store order.
    pub orphaned: Vec<String>,
}

impl Reconciliation {
    pub fn state_of(&self, name: &str) -> Option<FileState> {
        if self.active.iter().any(|d| d.name == name) {
            Some(FileState::Active)
        } else if self.available.iter().any(|d| d.name == name) {
            Some(FileState::Available)
        } else if self.orphaned.iter().any(|n| n == name) {
            Some(FileState::Orphaned)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.active.len() + self.available.len() + self.orphaned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify the folder listing against stored post names.
///
/// Only exportable documents count as listed. A name listed twice in the
/// folder is classified once, by its first entry.
pub fn reconcile(documents: &[Document], stored: &[String]) -> Reconciliation {
    let stored_set: HashSet<&str> = stored.iter().map(String::as_str).collect();
    let mut listed: HashSet<&str> = HashSet::with_capacity(documents.len());
    let mut out = Reconciliation::default();

    for doc in documents.iter().filter(|d| d.is_exportable()) {
        if !listed.insert(doc.name.as_str()) {
            continue;
        }
        if stored_set.contains(doc.name.as_str()) {
            out.active.push(doc.clone());
        } else {
            out.available.push(doc.clone());
        }
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for name in stored {
        if !listed.contains(name.as_str()) && seen.insert(name.as_str()) {
            out.orphaned.push(name.clone());
        }
    }
    out
}

/// Build the current reconciliation from the live folder listing and the store.
#[instrument(skip_all)]
pub async fn load(
    pool: &Pool,
    source: &dyn DocumentSource,
    folder: &Folder,
) -> Result<Reconciliation> {
    let documents = source
        .list_documents(&folder.id)
        .await
        .context("failed to list folder documents")?;
    let stored = db::list_post_names(pool).await?;
    Ok(reconcile(&documents, &stored))
}

/// Admin form actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Activate,
    Deactivate,
    Delete,
    Refresh,
    DeleteAllOrphaned,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::Activate => "activate",
            AdminAction::Deactivate => "deactivate",
            AdminAction::Delete => "delete",
            AdminAction::Refresh => "refresh",
            AdminAction::DeleteAllOrphaned => "delete_all_orphaned",
        }
    }

    /// Whether the action acts on a single named post.
    pub fn needs_name(&self) -> bool {
        !matches!(self, AdminAction::DeleteAllOrphaned)
    }
}

impl FromStr for AdminAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activate" => Ok(AdminAction::Activate),
            "deactivate" => Ok(AdminAction::Deactivate),
            "delete" => Ok(AdminAction::Delete),
            "refresh" => Ok(AdminAction::Refresh),
            "delete_all_orphaned" => Ok(AdminAction::DeleteAllOrphaned),
            other => Err(anyhow!("unknown admin action '{}'", other)),
        }
    }
}

/// What an admin action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Published,
    /// The source returned nothing; the store is unchanged.
    NothingFetched,
    Removed,
    /// Nothing to remove.
    NotPresent,
    OrphansRemoved(u64),
}

/// Run one admin action. Every action is safe to repeat.
#[instrument(skip_all, fields(action = action.as_str(), name = %name))]
pub async fn apply(
    pool: &Pool,
    source: &dyn DocumentSource,
    folder: &Folder,
    action: AdminAction,
    name: &str,
) -> Result<ActionOutcome> {
    let outcome = match action {
        AdminAction::Activate | AdminAction::Refresh => {
            match sync::sync_post(pool, source, folder, name).await? {
                SyncOutcome::Published => ActionOutcome::Published,
                SyncOutcome::NotFound => ActionOutcome::NothingFetched,
            }
        }
        AdminAction::Deactivate | AdminAction::Delete => {
            if db::delete_post(pool, name).await? {
                ActionOutcome::Removed
            } else {
                ActionOutcome::NotPresent
            }
        }
        AdminAction::DeleteAllOrphaned => {
            ActionOutcome::OrphansRemoved(delete_all_orphaned(pool, source, folder).await?)
        }
    };
    info!(?outcome, "admin action applied");
    Ok(outcome)
}

/// Remove every post with no eligible document in the folder.
///
/// Fails without touching the store when the listing cannot be fetched.
pub async fn delete_all_orphaned(
    pool: &Pool,
    source: &dyn DocumentSource,
    folder: &Folder,
) -> Result<u64> {
    let documents = source
        .list_documents(&folder.id)
        .await
        .context("failed to list folder documents")?;
    let keep: Vec<String> = documents
        .into_iter()
        .filter(|d| d.is_exportable())
        .map(|d| d.name)
        .collect();
    db::delete_posts_not_in(pool, &keep).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GOOGLE_DOC_MIME;

    fn doc(name: &str) -> Document {
        Document {
            id: format!("id-{name}"),
            name: name.into(),
            mime_type: GOOGLE_DOC_MIME.into(),
            modified_time: None,
            parents: vec!["folder".into()],
        }
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn classifies_three_ways() {
        let docs = vec![doc("index"), doc("about"), doc("draft")];
        let stored = vec!["about".to_string(), "index".to_string(), "old".to_string()];
        let r = reconcile(&docs, &stored);
        assert_eq!(names(&r.active), vec!["index", "about"]);
        assert_eq!(names(&r.available), vec!["draft"]);
        assert_eq!(r.orphaned, vec!["old".to_string()]);
        assert_eq!(r.state_of("old"), Some(FileState::Orphaned));
        assert_eq!(r.state_of("missing"), None);
    }

    #[test]
    fn classification_is_a_partition() {
        let docs = vec![doc("a"), doc("b"), doc("b"), doc("c")];
        let stored = vec!["b".to_string(), "d".to_string(), "d".to_string(), "e".to_string()];
        let r = reconcile(&docs, &stored);

        let mut all: Vec<String> = r
            .active
            .iter()
            .chain(r.available.iter())
            .map(|d| d.name.clone())
            .chain(r.orphaned.iter().cloned())
            .collect();
        all.sort();
        assert_eq!(all, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn empty_inputs() {
        assert!(reconcile(&[], &[]).is_empty());
        let r = reconcile(&[], &["x".to_string()]);
        assert_eq!(r.orphaned, vec!["x".to_string()]);
    }

    #[test]
    fn non_docs_are_not_listed() {
        let mut sheet = doc("budget");
        sheet.mime_type = "application/vnd.google-apps.spreadsheet".into();
        let stored = vec!["budget".to_string()];
        let r = reconcile(&[sheet, doc("about")], &stored);
        assert_eq!(names(&r.available), vec!["about"]);
        assert!(r.active.is_empty());
        assert_eq!(r.orphaned, vec!["budget".to_string()]);
    }

    #[test]
    fn parse_actions() {
        assert_eq!("Activate".parse::<AdminAction>().unwrap(), AdminAction::Activate);
        assert_eq!(
            "delete_all_orphaned".parse::<AdminAction>().unwrap(),
            AdminAction::DeleteAllOrphaned
        );
        assert!(!AdminAction::DeleteAllOrphaned.needs_name());
        assert!("publish".parse::<AdminAction>().is_err());
    }
}
