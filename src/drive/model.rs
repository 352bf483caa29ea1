use serde::Deserialize;

use crate::model::Document;

/// One page of `files.list`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<Document>,
    pub next_page_token: Option<String>,
}
