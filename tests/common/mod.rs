#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use gdoc_press::drive::DocumentSource;
use gdoc_press::model::{Document, Folder, GOOGLE_DOC_MIME};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const FOLDER_ID: &str = "folder-1";

pub async fn setup_pool() -> sqlx::SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn folder() -> Folder {
    Folder {
        id: FOLDER_ID.into(),
        name: "Site".into(),
    }
}

pub fn doc(name: &str) -> Document {
    typed_doc(name, GOOGLE_DOC_MIME)
}

pub fn typed_doc(name: &str, mime_type: &str) -> Document {
    Document {
        id: format!("id-{name}"),
        name: name.into(),
        mime_type: mime_type.into(),
        modified_time: None,
        parents: vec![FOLDER_ID.into()],
    }
}

/// In-memory document source that records export calls.
#[derive(Clone, Default)]
pub struct RecordingSource {
    pub folders: Vec<Folder>,
    documents: Arc<Mutex<Vec<Document>>>,
    exports: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<Mutex<Vec<String>>>,
    listing_fails: Arc<Mutex<bool>>,
    export_calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingSource {
    pub fn new() -> Self {
        Self {
            folders: vec![folder()],
            ..Default::default()
        }
    }

    pub async fn add(&self, doc: Document, html: &str) {
        self.exports.lock().await.insert(doc.id.clone(), html.to_string());
        self.documents.lock().await.push(doc);
    }

    pub async fn remove(&self, name: &str) {
        self.documents.lock().await.retain(|d| d.name != name);
    }

    /// Make lookups for this name fail as a transport error would.
    pub async fn fail_on(&self, name: &str) {
        self.failing.lock().await.push(name.to_string());
    }

    pub async fn fail_listing(&self) {
        *self.listing_fails.lock().await = true;
    }

    pub async fn export_calls(&self) -> Vec<String> {
        self.export_calls.lock().await.clone()
    }
}

#[async_trait]
impl DocumentSource for RecordingSource {
    async fn find_folders(&self, name: &str) -> Result<Vec<Folder>> {
        Ok(self
            .folders
            .iter()
            .filter(|f| f.name == name)
            .cloned()
            .collect())
    }

    async fn list_documents(&self, folder_id: &str) -> Result<Vec<Document>> {
        if *self.listing_fails.lock().await {
            return Err(anyhow!("drive list error 503: backend unavailable"));
        }
        Ok(self
            .documents
            .lock()
            .await
            .iter()
            .filter(|d| d.parents.iter().any(|p| p == folder_id))
            .cloned()
            .collect())
    }

    async fn find_document(&self, folder_id: &str, name: &str) -> Result<Option<Document>> {
        if self.failing.lock().await.iter().any(|n| n == name) {
            return Err(anyhow!("failed to reach Drive"));
        }
        Ok(self
            .documents
            .lock()
            .await
            .iter()
            .find(|d| d.name == name && d.parents.iter().any(|p| p == folder_id))
            .cloned())
    }

    async fn export_html(&self, file_id: &str) -> Result<String> {
        self.export_calls.lock().await.push(file_id.to_string());
        self.exports
            .lock()
            .await
            .get(file_id)
            .cloned()
            .ok_or_else(|| anyhow!("drive export error 404"))
    }
}
