use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Url};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::drive::model::FileList;
use crate::model::{Document, Folder, FOLDER_MIME, GOOGLE_DOC_MIME};

pub mod auth;
pub mod model;

pub use auth::{ServiceAccountAuth, StaticToken, TokenProvider};

const DRIVE_API_BASE: &str = "https://www.googleapis.com/";
const FILE_FIELDS: &str = "nextPageToken, files(id, name, mimeType, modifiedTime, parents)";
/// Upper bound on the export buffer reserved up front from `Content-Length`.
const MAX_PREALLOC: u64 = 8 << 20;

/// Read access to the documents backing the site.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Folders (not trashed) with exactly this name, in source order.
    async fn find_folders(&self, name: &str) -> Result<Vec<Folder>>;

    /// Every Google Doc directly inside the folder.
    async fn list_documents(&self, folder_id: &str) -> Result<Vec<Document>>;

    /// First file of any type in the folder with exactly this name.
    async fn find_document(&self, folder_id: &str, name: &str) -> Result<Option<Document>>;

    /// Export a Google Doc as HTML.
    async fn export_html(&self, file_id: &str) -> Result<String>;
}

#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for DriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DriveClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let base_url = Url::parse(DRIVE_API_BASE).context("invalid default Drive URL")?;
        Self::with_base_url(tokens, base_url)
    }

    pub fn with_base_url(tokens: Arc<dyn TokenProvider>, base_url: Url) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("gdoc-press/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Build a `files.list` request for one page of results.
    pub async fn build_list_request(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<reqwest::Request> {
        let endpoint = self
            .base_url
            .join("drive/v3/files")
            .context("invalid Drive base URL")?;
        let token = self.tokens.access_token().await?;
        let mut req = self
            .http
            .get(endpoint)
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("spaces", "drive"),
                ("fields", FILE_FIELDS),
                ("pageSize", "1000"),
            ]);
        if let Some(page_token) = page_token {
            req = req.query(&[("pageToken", page_token)]);
        }
        req.build().context("failed to build Drive request")
    }

    /// Run a `files.list` query, following `nextPageToken` to the end.
    async fn list_files(&self, query: &str) -> Result<Vec<Document>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let request = self.build_list_request(query, page_token.as_deref()).await?;
            debug!(url=%request.url(), "listing drive files");
            let res = self
                .http
                .execute(request)
                .await
                .context("failed to reach Drive")?;
            if !res.status().is_success() {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                return Err(anyhow!("drive list error {}: {}", status, body));
            }
            let page: FileList = res.json().await.context("invalid Drive file list")?;
            files.extend(page.files);
            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }
        Ok(files)
    }
}

#[async_trait]
impl DocumentSource for DriveClient {
    async fn find_folders(&self, name: &str) -> Result<Vec<Folder>> {
        let files = self.list_files(&folder_query(name)).await?;
        Ok(files
            .into_iter()
            .map(|f| Folder {
                id: f.id,
                name: f.name,
            })
            .collect())
    }

    async fn list_documents(&self, folder_id: &str) -> Result<Vec<Document>> {
        self.list_files(&documents_query(folder_id)).await
    }

    async fn find_document(&self, folder_id: &str, name: &str) -> Result<Option<Document>> {
        let files = self
            .list_files(&document_by_name_query(folder_id, name))
            .await?;
        Ok(files.into_iter().next())
    }

    async fn export_html(&self, file_id: &str) -> Result<String> {
        let endpoint = self
            .base_url
            .join(&format!("drive/v3/files/{}/export", file_id))
            .context("invalid Drive base URL")?;
        let token = self.tokens.access_token().await?;
        let res = self
            .http
            .get(endpoint)
            .bearer_auth(token)
            .query(&[("mimeType", "text/html")])
            .send()
            .await
            .context("failed to reach Drive")?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("drive export error {}: {}", status, body));
        }

        let total = res.content_length();
        let mut buf: Vec<u8> = Vec::with_capacity(initial_capacity(total));
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("export download interrupted")?;
            buf.extend_from_slice(&chunk);
            match total {
                Some(total) if total > 0 => {
                    debug!(file_id, "download {}%", buf.len() as u64 * 100 / total)
                }
                _ => debug!(file_id, bytes = buf.len(), "download progress"),
            }
        }
        info!(file_id, bytes = buf.len(), "exported document");
        String::from_utf8(buf).context("exported document is not UTF-8")
    }
}

fn initial_capacity(content_length: Option<u64>) -> usize {
    content_length.unwrap_or(0).min(MAX_PREALLOC) as usize
}

/// Quote a value for use inside a single-quoted Drive query literal.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn folder_query(name: &str) -> String {
    format!(
        "mimeType='{}' and name='{}' and trashed=false",
        FOLDER_MIME,
        escape_query_value(name)
    )
}

pub fn documents_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType='{}' and trashed=false",
        escape_query_value(folder_id),
        GOOGLE_DOC_MIME
    )
}

pub fn document_by_name_query(folder_id: &str, name: &str) -> String {
    format!(
        "'{}' in parents and name='{}' and trashed=false",
        escape_query_value(folder_id),
        escape_query_value(name)
    )
}
