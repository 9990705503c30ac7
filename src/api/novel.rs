//! Purpose: Map novel operations onto backend endpoints.
//! Exports: `NovelApi`, `NovelContent`, `DEFAULT_NOVEL_FORMAT`.
//! Role: Thin per-domain layer over `InstrumentedClient`.
//! Invariants: Non-download calls always go through the instrumented wrapper.
//! Invariants: Downloads only build a URL and hand it to a `Navigator`.
#![allow(clippy::result_large_err)]

use super::client::InstrumentedClient;
use super::navigate::Navigator;
use crate::core::address::endpoint_path;
use crate::core::error::Error;
use serde::Deserialize;
use serde_json::Value;

type ApiResult<T> = Result<T, Error>;

pub const DEFAULT_NOVEL_FORMAT: &str = "txt";

/// Body of `GET /novel/{id}/content`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct NovelContent {
    pub id: String,
    pub title: String,
    pub author: String,
    pub content: String,
}

#[derive(Clone)]
pub struct NovelApi {
    client: InstrumentedClient,
}

impl InstrumentedClient {
    pub fn novels(&self) -> NovelApi {
        NovelApi {
            client: self.clone(),
        }
    }
}

impl NovelApi {
    pub fn search(&self, keyword: &str, page: u32) -> ApiResult<Value> {
        let page = page.to_string();
        let path = endpoint_path(
            &["novel", "search"],
            &[("keyword", keyword), ("page", page.as_str())],
        );
        self.client.get(&path)
    }

    pub fn info(&self, novel_id: &str) -> ApiResult<Value> {
        self.client.get(&endpoint_path(&["novel", novel_id], &[]))
    }

    pub fn content(&self, novel_id: &str) -> ApiResult<Value> {
        self.client
            .get(&endpoint_path(&["novel", novel_id, "content"], &[]))
    }

    pub fn text(&self, novel_id: &str) -> ApiResult<NovelContent> {
        self.client
            .get_json(&endpoint_path(&["novel", novel_id, "content"], &[]))
    }

    pub fn download_url(&self, novel_id: &str, format: &str) -> ApiResult<String> {
        let path = endpoint_path(&["novel", novel_id, "download"], &[("format", format)]);
        self.client.resolve(&path)
    }

    /// Navigates to the download URL and returns it. The sink is not notified.
    pub fn download(
        &self,
        novel_id: &str,
        format: &str,
        navigator: &dyn Navigator,
    ) -> ApiResult<String> {
        let url = self.download_url(novel_id, format)?;
        navigator.navigate(&url);
        Ok(url)
    }
}
