//! Purpose: Wrap the backend's service endpoints (welcome, version, config, proxy check).
//! Exports: `ServiceApi`.
//! Role: Thin per-domain layer over `InstrumentedClient`.
#![allow(clippy::result_large_err)]

use super::client::InstrumentedClient;
use crate::core::address::endpoint_path;
use crate::core::error::Error;
use serde_json::Value;

type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct ServiceApi {
    client: InstrumentedClient,
}

impl InstrumentedClient {
    pub fn service(&self) -> ServiceApi {
        ServiceApi {
            client: self.clone(),
        }
    }
}

impl ServiceApi {
    pub fn welcome(&self) -> ApiResult<Value> {
        self.client.get("/")
    }

    pub fn latest_version(&self) -> ApiResult<Value> {
        self.client.get(&endpoint_path(&["version", "latest"], &[]))
    }

    pub fn config(&self) -> ApiResult<Value> {
        self.client.get(&endpoint_path(&["config", "info"], &[]))
    }

    /// Asks the backend to fetch `url` through its configured proxy.
    pub fn proxy_test(&self, url: &str) -> ApiResult<Value> {
        self.client
            .get(&endpoint_path(&["proxy", "test"], &[("url", url)]))
    }
}
