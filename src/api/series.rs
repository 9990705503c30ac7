//! Purpose: Map series operations onto backend endpoints.
//! Exports: `SeriesApi`, `SeriesContent`, `SeriesDownloadMode`.
//! Role: Thin per-domain layer over `InstrumentedClient`.
//! Invariants: Downloads only build a URL and hand it to a `Navigator`.
#![allow(clippy::result_large_err)]

use super::client::InstrumentedClient;
use super::navigate::Navigator;
use crate::core::address::endpoint_path;
use crate::core::error::{Error, ErrorKind};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

type ApiResult<T> = Result<T, Error>;

/// Body of `GET /series/{id}/content`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SeriesContent {
    pub series_id: String,
    pub novel_ids: Vec<String>,
}

/// How the backend packages a series download.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeriesDownloadMode {
    /// One file per novel, zipped.
    #[default]
    Split,
    /// All novels concatenated into one file.
    Merge,
}

impl SeriesDownloadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesDownloadMode::Split => "split",
            SeriesDownloadMode::Merge => "merge",
        }
    }
}

impl fmt::Display for SeriesDownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesDownloadMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "split" => Ok(SeriesDownloadMode::Split),
            "merge" => Ok(SeriesDownloadMode::Merge),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown series download mode {other:?}"))
                .with_hint("Use split or merge.")),
        }
    }
}

#[derive(Clone)]
pub struct SeriesApi {
    client: InstrumentedClient,
}

impl InstrumentedClient {
    pub fn series(&self) -> SeriesApi {
        SeriesApi {
            client: self.clone(),
        }
    }
}

impl SeriesApi {
    pub fn info(&self, series_id: &str) -> ApiResult<Value> {
        self.client.get(&endpoint_path(&["series", series_id], &[]))
    }

    pub fn content(&self, series_id: &str) -> ApiResult<Value> {
        self.client
            .get(&endpoint_path(&["series", series_id, "content"], &[]))
    }

    pub fn novel_ids(&self, series_id: &str) -> ApiResult<SeriesContent> {
        self.client
            .get_json(&endpoint_path(&["series", series_id, "content"], &[]))
    }

    pub fn download_url(&self, series_id: &str, mode: SeriesDownloadMode) -> ApiResult<String> {
        let path = endpoint_path(
            &["series", series_id, "download"],
            &[("mode", mode.as_str())],
        );
        self.client.resolve(&path)
    }

    pub fn download(
        &self,
        series_id: &str,
        mode: SeriesDownloadMode,
        navigator: &dyn Navigator,
    ) -> ApiResult<String> {
        let url = self.download_url(series_id, mode)?;
        navigator.navigate(&url);
        Ok(url)
    }
}
