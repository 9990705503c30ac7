//! Purpose: Print debug sink events to stderr for the CLI.
//! Exports: `DebugMode`, `StderrSink`.
//! Role: CLI stand-in for the debug panel; never touches stdout.
//! Invariants: Text mode is for humans; JSON mode emits one envelope per line.
use crate::color_json::{JsonStyle, paint, render_json};
use clap::ValueEnum;
use novelfetch::debug::{DebugEvent, DebugSink, RequestDescriptor, debug_event_json};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

// Novel bodies can run to megabytes; the text panel shows only the head.
const TEXT_STRING_LIMIT: usize = 200;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum DebugMode {
    Off,
    Text,
    Json,
}

pub(crate) struct StderrSink {
    mode: DebugMode,
    use_color: bool,
}

impl StderrSink {
    pub(crate) fn new(mode: DebugMode, use_color: bool) -> Option<Self> {
        match mode {
            DebugMode::Off => None,
            DebugMode::Text | DebugMode::Json => Some(Self { mode, use_color }),
        }
    }

    fn emit(&self, event: DebugEvent) {
        if self.mode == DebugMode::Json {
            let value = debug_event_json(&event, event_time_now().as_deref());
            let json = serde_json::to_string(&value).unwrap_or_else(|_| {
                "{\"debug\":{\"event\":\"error\",\"payload\":\"json encode failed\"}}".to_string()
            });
            eprintln!("{json}");
            return;
        }
        eprintln!("{}", self.event_text(&event));
    }

    fn event_text(&self, event: &DebugEvent) -> String {
        match event {
            DebugEvent::Request(request) => {
                format!("{} {} {}", self.label("request:", "36"), request.method, request.url)
            }
            DebugEvent::Success(payload) => {
                format!("{} {}", self.label("success:", "32"), self.payload_text(payload))
            }
            DebugEvent::Error(payload) => {
                format!("{} {}", self.label("error:", "31"), self.payload_text(payload))
            }
        }
    }

    fn payload_text(&self, payload: &Value) -> String {
        match payload {
            Value::String(text) => text.clone(),
            other => render_json(
                other,
                JsonStyle::colored(self.use_color).with_max_string_chars(TEXT_STRING_LIMIT),
            ),
        }
    }

    fn label(&self, text: &str, color: &str) -> String {
        paint(text, color, self.use_color)
    }
}

impl DebugSink for StderrSink {
    fn update_request(&self, request: &RequestDescriptor) {
        self.emit(DebugEvent::Request(request.clone()));
    }

    fn update_success(&self, payload: &Value) {
        self.emit(DebugEvent::Success(payload.clone()));
    }

    fn update_error(&self, payload: &Value) {
        self.emit(DebugEvent::Error(payload.clone()));
    }
}

fn event_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let duration = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    let ts = time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()?;
    ts.format(&Rfc3339).ok()
}
