use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// MIME type of a native Google Doc, the only exportable kind.
pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// A file as described by the document source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl Document {
    pub fn is_exportable(&self) -> bool {
        self.mime_type == GOOGLE_DOC_MIME
    }
}

/// The Drive folder every document lookup is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

/// A published page.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Post {
    pub post_name: String,
    pub content: String,
    pub updated_at: NaiveDateTime,
}

/// Where a name sits between the folder listing and the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FileState {
    /// In the folder and published.
    Active,
    /// In the folder, not published.
    Available,
    /// Published, but gone from the folder.
    Orphaned,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::Active => "active",
            FileState::Available => "available",
            FileState::Orphaned => "orphaned",
        }
    }
}
