//! Purpose: Define the public Rust API boundary for novelfetch.
//! Exports: The instrumented client, domain APIs, navigator, and error types.
//! Role: Public, additive-only surface; hides the address helpers' internals.
//! Invariants: Every backend call except downloads flows through `InstrumentedClient`.

mod client;
mod navigate;
mod novel;
mod series;
mod service;

pub use crate::core::address::DEFAULT_BASE_URL;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use client::{ClientOptions, InstrumentedClient, PayloadShape, StatusPolicy};
pub use navigate::{Navigator, RecordingNavigator};
pub use novel::{DEFAULT_NOVEL_FORMAT, NovelApi, NovelContent};
pub use series::{SeriesApi, SeriesContent, SeriesDownloadMode};
pub use service::ServiceApi;
