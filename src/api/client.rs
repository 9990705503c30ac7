//! Purpose: Provide the instrumented HTTP client every backend call goes through.
//! Exports: `InstrumentedClient`, `ClientOptions`, `PayloadShape`, `StatusPolicy`.
//! Role: Resolve targets, notify the debug sink, dispatch, classify, and report outcomes.
//! Invariants: One start and exactly one terminal notification per dispatched call.
//! Invariants: A missing sink never changes the request outcome.
//! Invariants: Non-JSON responses resolve to the fixed placeholder object.
//! Invariants: Empty bodies (HEAD, 204) resolve to `null`.
#![allow(clippy::result_large_err)]

use crate::core::address::{normalize_base_url, resolve_url};
use crate::core::error::{Error, ErrorKind};
use crate::debug::{DebugSink, RequestDescriptor};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

type ApiResult<T> = Result<T, Error>;

const DEFAULT_USER_AGENT: &str = concat!("novelfetch/", env!("CARGO_PKG_VERSION"));
const FALLBACK_STATUS_MESSAGE: &str = "Request failed";

/// Form of the payload handed to the debug sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PayloadShape {
    /// The parsed JSON value itself.
    #[default]
    Structured,
    /// The value pretty-printed into a JSON string.
    Serialized,
}

/// Contract for responses outside the 2xx range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Fail with an `ErrorKind::Status` error carrying the payload.
    #[default]
    Reject,
    /// Return the parsed payload as if the call succeeded.
    Resolve,
}

#[derive(Clone, Default)]
pub struct ClientOptions {
    sink: Option<Arc<dyn DebugSink>>,
    payload_shape: PayloadShape,
    status_policy: StatusPolicy,
    user_agent: Option<String>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_payload_shape(mut self, shape: PayloadShape) -> Self {
        self.payload_shape = shape;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn payload_shape(&self) -> PayloadShape {
        self.payload_shape
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("sink", &self.sink.is_some())
            .field("payload_shape", &self.payload_shape)
            .field("status_policy", &self.status_policy)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Clone)]
pub struct InstrumentedClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: String,
    agent: ureq::Agent,
    options: ClientOptions,
}

struct Completed {
    status: u16,
    value: Value,
    body: BodyKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyKind {
    Json,
    Empty,
    NonJson,
}

impl fmt::Debug for InstrumentedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentedClient")
            .field("base_url", &self.inner.base_url)
            .field("options", &self.inner.options)
            .finish()
    }
}

impl InstrumentedClient {
    pub fn new(base_url: impl AsRef<str>) -> ApiResult<Self> {
        Self::with_options(base_url, ClientOptions::default())
    }

    pub fn with_options(base_url: impl AsRef<str>, options: ClientOptions) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.as_ref())?;
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let agent = ureq::AgentBuilder::new().user_agent(user_agent).build();
        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                agent,
                options,
            }),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.options.sink = Some(sink);
        } else {
            self.inner = Arc::new(ClientInner {
                base_url: self.inner.base_url.clone(),
                agent: self.inner.agent.clone(),
                options: self.inner.options.clone().with_sink(sink),
            });
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    pub fn resolve(&self, target: &str) -> ApiResult<String> {
        resolve_url(&self.inner.base_url, target)
    }

    pub fn get(&self, target: &str) -> ApiResult<Value> {
        self.request("GET", target)
    }

    /// Runs `GET target` through the wrapper, then decodes the result into `R`.
    pub fn get_json<R>(&self, target: &str) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        let value = self.get(target)?;
        serde_json::from_value(value).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message("unexpected response shape")
                .with_source(err)
        })
    }

    /// Issues one instrumented request.
    ///
    /// Input validation failures return before the sink hears anything.
    /// Everything after dispatch reports exactly one terminal event.
    pub fn request(&self, method: &str, target: &str) -> ApiResult<Value> {
        let method = normalize_method(method)?;
        let url = self.resolve(target)?;

        self.notify(|sink| {
            sink.update_request(&RequestDescriptor {
                method: method.clone(),
                url: url.clone(),
            })
        });
        debug!(method = %method, url = %url, "dispatching request");

        match self.dispatch(&method, &url) {
            Ok(completed) => self.complete(completed, &url),
            Err(err) => {
                warn!(method = %method, url = %url, error = %err, "request failed");
                self.notify(|sink| sink.update_error(&Value::String(err.describe())));
                Err(err)
            }
        }
    }

    fn dispatch(&self, method: &str, url: &str) -> ApiResult<Completed> {
        let response = self
            .inner
            .agent
            .request(method, url)
            .set("Accept", "application/json")
            .call();
        match response {
            Ok(resp) => read_payload(resp, url),
            Err(ureq::Error::Status(_, resp)) => read_payload(resp, url),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_url(url)
                .with_source(err)),
        }
    }

    fn complete(&self, completed: Completed, url: &str) -> ApiResult<Value> {
        let Completed {
            status,
            value,
            body,
        } = completed;
        if (200..300).contains(&status) {
            debug!(status, url = %url, "request succeeded");
            self.notify(|sink| sink.update_success(&self.shaped(&value)));
            return Ok(value);
        }

        debug!(status, url = %url, "request returned error status");
        self.notify(|sink| sink.update_error(&self.shaped(&value)));
        match self.inner.options.status_policy {
            StatusPolicy::Resolve => Ok(value),
            StatusPolicy::Reject => Err(Error::new(ErrorKind::Status)
                .with_message(status_message(&value, body))
                .with_status(status)
                .with_url(url)
                .with_payload(value)),
        }
    }

    fn notify(&self, f: impl FnOnce(&dyn DebugSink)) {
        if let Some(sink) = &self.inner.options.sink {
            f(sink.as_ref());
        }
    }

    fn shaped(&self, value: &Value) -> Value {
        shape_payload(value, self.inner.options.payload_shape)
    }
}

fn normalize_method(method: &str) -> ApiResult<String> {
    let method = method.trim();
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid http method {method:?}"))
            .with_hint("Use a method name like GET or POST."));
    }
    Ok(method.to_ascii_uppercase())
}

fn read_payload(response: ureq::Response, url: &str) -> ApiResult<Completed> {
    let status = response.status();
    let is_json = is_json_content_type(response.content_type());
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_status(status)
            .with_url(url)
            .with_source(err)
    })?;
    if body.trim().is_empty() {
        return Ok(Completed {
            status,
            value: Value::Null,
            body: BodyKind::Empty,
        });
    }
    if !is_json {
        return Ok(Completed {
            status,
            value: non_json_placeholder(),
            body: BodyKind::NonJson,
        });
    }
    let value = serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid response json")
            .with_status(status)
            .with_url(url)
            .with_source(err)
    })?;
    Ok(Completed {
        status,
        value,
        body: BodyKind::Json,
    })
}

pub(crate) fn non_json_placeholder() -> Value {
    json!({ "error": "Invalid JSON response" })
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.trim().to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn shape_payload(value: &Value, shape: PayloadShape) -> Value {
    match shape {
        PayloadShape::Structured => value.clone(),
        PayloadShape::Serialized => Value::String(
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        ),
    }
}

// Only a parsed backend body can name the failure; placeholders and empty bodies cannot.
fn status_message(value: &Value, body: BodyKind) -> String {
    if body != BodyKind::Json {
        return FALLBACK_STATUS_MESSAGE.to_string();
    }
    ["detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .unwrap_or(FALLBACK_STATUS_MESSAGE)
        .to_string()
}
