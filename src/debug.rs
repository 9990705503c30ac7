//! Purpose: Define the debug sink contract and the built-in sinks.
//! Exports: `DebugSink`, `RequestDescriptor`, `DebugEvent`, `DebugStatus`, `DebugPanel`,
//! `RecordingSink`, `debug_event_json`.
//! Role: Developer-facing request tracing; observers never affect request outcomes.
//! Invariants: Sink payloads use one representation (`serde_json::Value`).
//! Invariants: JSON envelope fields are additive-only once published.
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::{Mutex, MutexGuard};

/// Method and resolved URL of a request about to be dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    pub method: String,
    pub url: String,
}

/// Observer for request tracing.
///
/// Each instrumented call produces one `update_request`, then exactly one of
/// `update_success` or `update_error`.
pub trait DebugSink: Send + Sync {
    fn update_request(&self, request: &RequestDescriptor);
    fn update_success(&self, payload: &Value);
    fn update_error(&self, payload: &Value);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DebugEvent {
    Request(RequestDescriptor),
    Success(Value),
    Error(Value),
}

impl DebugEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DebugEvent::Request(_) => "request",
            DebugEvent::Success(_) => "success",
            DebugEvent::Error(_) => "error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebugStatus {
    Loading,
    Ok,
    Error,
}

/// What a debug display shows for the most recent request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DebugPanel {
    pub method: String,
    pub url: String,
    pub status: DebugStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

#[derive(Default)]
struct RecordingState {
    events: Vec<DebugEvent>,
    panel: Option<DebugPanel>,
}

/// In-memory sink that keeps every event and the current panel state.
#[derive(Default)]
pub struct RecordingSink {
    state: Mutex<RecordingState>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DebugEvent> {
        self.lock().events.clone()
    }

    pub fn panel(&self) -> Option<DebugPanel> {
        self.lock().panel.clone()
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.events.clear();
        state.panel = None;
    }

    fn lock(&self) -> MutexGuard<'_, RecordingState> {
        self.state
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    fn finish(&self, event: DebugEvent, status: DebugStatus, payload: &Value) {
        let mut state = self.lock();
        state.events.push(event);
        if let Some(panel) = state.panel.as_mut() {
            panel.status = status;
            panel.result = Some(panel_text(payload));
        }
    }
}

impl DebugSink for RecordingSink {
    fn update_request(&self, request: &RequestDescriptor) {
        let mut state = self.lock();
        state.events.push(DebugEvent::Request(request.clone()));
        state.panel = Some(DebugPanel {
            method: request.method.clone(),
            url: request.url.clone(),
            status: DebugStatus::Loading,
            result: None,
        });
    }

    fn update_success(&self, payload: &Value) {
        self.finish(DebugEvent::Success(payload.clone()), DebugStatus::Ok, payload);
    }

    fn update_error(&self, payload: &Value) {
        self.finish(DebugEvent::Error(payload.clone()), DebugStatus::Error, payload);
    }
}

// Strings are shown as-is so serialized payloads are not quoted twice.
fn panel_text(payload: &Value) -> String {
    match payload {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub fn debug_event_json(event: &DebugEvent, time: Option<&str>) -> Value {
    let mut inner = Map::new();
    inner.insert("event".to_string(), json!(event.name()));
    if let Some(time) = time {
        inner.insert("time".to_string(), json!(time));
    }
    match event {
        DebugEvent::Request(request) => {
            inner.insert("method".to_string(), json!(request.method));
            inner.insert("url".to_string(), json!(request.url));
        }
        DebugEvent::Success(payload) | DebugEvent::Error(payload) => {
            inner.insert("payload".to_string(), payload.clone());
        }
    }

    let mut outer = Map::new();
    outer.insert("debug".to_string(), Value::Object(inner));
    Value::Object(outer)
}

#[cfg(test)]
mod tests {
    use super::{
        DebugEvent, DebugSink, DebugStatus, RecordingSink, RequestDescriptor, debug_event_json,
    };
    use serde_json::json;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor {
            method: "GET".to_string(),
            url: "http://127.0.0.1:8000/novel/1".to_string(),
        }
    }

    #[test]
    fn recording_sink_tracks_panel_state() {
        let sink = RecordingSink::new();
        sink.update_request(&descriptor());
        let panel = sink.panel().expect("panel");
        assert_eq!(panel.status, DebugStatus::Loading);
        assert_eq!(panel.result, None);

        sink.update_success(&json!({"a": 1}));
        let panel = sink.panel().expect("panel");
        assert_eq!(panel.status, DebugStatus::Ok);
        assert_eq!(panel.result.as_deref(), Some("{\n  \"a\": 1\n}"));
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn recording_sink_shows_string_payloads_verbatim() {
        let sink = RecordingSink::new();
        sink.update_request(&descriptor());
        sink.update_error(&json!("Transport: request failed"));
        let panel = sink.panel().expect("panel");
        assert_eq!(panel.status, DebugStatus::Error);
        assert_eq!(panel.result.as_deref(), Some("Transport: request failed"));
    }

    #[test]
    fn clear_resets_events_and_panel() {
        let sink = RecordingSink::new();
        sink.update_request(&descriptor());
        sink.clear();
        assert!(sink.events().is_empty());
        assert!(sink.panel().is_none());
    }

    #[test]
    fn debug_event_json_has_required_fields() {
        let value = debug_event_json(
            &DebugEvent::Request(descriptor()),
            Some("2026-02-01T00:00:00Z"),
        );
        let obj = value
            .get("debug")
            .and_then(|v| v.as_object())
            .expect("debug object");
        assert_eq!(obj.get("event").and_then(|v| v.as_str()), Some("request"));
        assert_eq!(obj.get("method").and_then(|v| v.as_str()), Some("GET"));
        assert_eq!(
            obj.get("time").and_then(|v| v.as_str()),
            Some("2026-02-01T00:00:00Z")
        );

        let value = debug_event_json(&DebugEvent::Error(json!({"detail": "x"})), None);
        assert_eq!(value["debug"]["event"], "error");
        assert_eq!(value["debug"]["payload"]["detail"], "x");
        assert!(value["debug"].get("time").is_none());
    }

    #[test]
    fn panel_serializes_status_uppercase() {
        let sink = RecordingSink::new();
        sink.update_request(&descriptor());
        let value = serde_json::to_value(sink.panel().expect("panel")).expect("json");
        assert_eq!(value["status"], "LOADING");
        assert!(value.get("result").is_none());
    }
}
