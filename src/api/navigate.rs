//! Purpose: Hand download URLs to whatever performs the actual transfer.
//! Exports: `Navigator`, `RecordingNavigator`.
//! Role: Download operations bypass the instrumented client and end here.
use std::sync::Mutex;

pub trait Navigator {
    fn navigate(&self, url: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str),
{
    fn navigate(&self, url: &str) {
        self(url)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(url.to_string());
    }
}
