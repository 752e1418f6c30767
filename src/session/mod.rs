//! Query session — transcript, in-flight request, and schema gate.
//!
//! DESIGN
//! ======
//! All mutable state sits behind one mutex that is only held for short
//! synchronous sections, never across an `.await`. A submission is split
//! into an accept phase (validate, append the user message, mark pending)
//! and a settle phase (append exactly one result or error, clear pending).
//! Because both phases run under the lock, a second submission can never
//! observe a half-applied first one, and is rejected while one is pending.
//!
//! A submission whose future is dropped before it settles (timeout,
//! `select!`, task abort) is settled from its drop guard with a
//! "request cancelled" error, so the pending slot is always released.
//!
//! The schema machine is independent: it may be loading while a query is
//! in flight, and it moves `Loading → Ready | Unavailable` exactly once.
//!
//! Every state change and the delivery of its events happen under a
//! separate delivery lock, so observers see events in transcript order
//! even when submissions settle on different worker threads. Observers
//! may read the session but must not call its mutating methods.

pub mod events;
pub mod message;
pub mod schema;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::api::{ApiError, ExecuteResponse, QueryBackend};
use crate::config::{ClientConfig, SchemaPolicy};
use crate::csv::{self, CsvExport, ExportError};
use crate::error::{SessionError, ValidationError};
use crate::log::{EventLog, Severity, TracingLog};

use events::{Banner, BannerSource, SessionEvent, SessionObserver};
use message::{Message, MessageId, MessageKind, QueryResult};
use schema::SchemaState;

/// Transcript text for a submission dropped before its reply arrived.
pub const CANCELLED_TEXT: &str = "request cancelled";

/// The single outstanding submission.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub query: String,
    pub issued_at: Instant,
}

#[derive(Default)]
struct SessionInner {
    transcript: Vec<Message>,
    schema: SchemaState,
    schema_requested: bool,
    pending: Option<PendingRequest>,
    draft: String,
    banner: Option<Banner>,
    next_id: u64,
}

impl SessionInner {
    fn append(&mut self, build: impl FnOnce(MessageId) -> Message) -> Message {
        self.next_id += 1;
        let message = build(MessageId(self.next_id));
        self.transcript.push(message.clone());
        message
    }
}

/// Releases the pending slot if a submission is dropped mid-flight.
struct PendingGuard<'a> {
    session: &'a QuerySession,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.cancel_pending();
        }
    }
}

pub struct QuerySession {
    backend: Arc<dyn QueryBackend>,
    log: Arc<dyn EventLog>,
    schema_policy: SchemaPolicy,
    charts: bool,
    inner: Mutex<SessionInner>,
    delivery: Mutex<()>,
    observers: RwLock<Vec<Arc<dyn SessionObserver>>>,
}

impl QuerySession {
    #[must_use]
    pub fn new(backend: Arc<dyn QueryBackend>, config: &ClientConfig) -> Self {
        Self {
            backend,
            log: Arc::new(TracingLog),
            schema_policy: config.schema_policy,
            charts: config.charts,
            inner: Mutex::new(SessionInner::default()),
            delivery: Mutex::new(()),
            observers: RwLock::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn EventLog>) -> Self {
        self.log = log;
        self
    }

    pub fn subscribe(&self, observer: impl SessionObserver + 'static) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one state change and deliver its events before any other
    /// change can start. The state lock is released before observers run.
    fn apply<T>(&self, change: impl FnOnce(&mut SessionInner) -> (T, Vec<SessionEvent>)) -> T {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        let (value, events) = change(&mut self.lock());
        self.notify(&events);
        value
    }

    fn notify(&self, events: &[SessionEvent]) {
        if events.is_empty() {
            return;
        }
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for event in events {
            for observer in &observers {
                observer.on_event(event);
            }
        }
    }

    // =========================================================================
    // SCHEMA
    // =========================================================================

    /// Fetch the schema once. A failure becomes `Unavailable` plus a
    /// one-shot banner; it is never written to the transcript.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::AlreadyInitialized` on a second call.
    pub async fn initialize(&self) -> Result<SchemaState, SessionError> {
        self.apply(|inner| {
            if inner.schema_requested {
                return (Err(ValidationError::AlreadyInitialized), vec![]);
            }
            inner.schema_requested = true;
            inner.schema = SchemaState::Loading;
            (Ok(()), vec![SessionEvent::SchemaChanged(SchemaState::Loading)])
        })?;
        self.log.log(Severity::Info, "schema.request", &[]);

        let state = match self.backend.fetch_schema().await {
            Ok(schema) => {
                self.log.log(Severity::Info, "schema.ready", &[("tables", schema.tables.len().to_string())]);
                SchemaState::Ready(schema)
            }
            Err(e) => {
                self.log.log(Severity::Warn, "schema.unavailable", &[("error", e.to_string())]);
                SchemaState::Unavailable(e.to_string())
            }
        };

        self.apply(|inner| {
            inner.schema = state.clone();
            let mut events = vec![SessionEvent::SchemaChanged(state.clone())];
            if let SchemaState::Unavailable(reason) = &state {
                let banner = Banner { source: BannerSource::Schema, text: reason.clone() };
                inner.banner = Some(banner.clone());
                events.push(SessionEvent::Banner(banner));
            }
            ((), events)
        });
        Ok(state)
    }

    // =========================================================================
    // SUBMISSION
    // =========================================================================

    /// Submit a query and wait for its outcome.
    ///
    /// Returns the system message appended for the outcome: `SystemResult`
    /// on success, `SystemError` on any backend failure. The draft is
    /// cleared as soon as the submission is accepted. Dropping the returned
    /// future before it completes appends a [`CANCELLED_TEXT`] error and
    /// frees the session for the next submission.
    ///
    /// # Errors
    ///
    /// Local rejections only, with no transcript entry and no request:
    /// empty text, a query already in flight, or (under
    /// `SchemaPolicy::RequireReady`) a schema that is not ready.
    pub async fn submit_query(&self, text: &str) -> Result<Message, SessionError> {
        self.accept(text)?;
        let guard = PendingGuard { session: self, armed: true };

        let mut fields = vec![("query", text.to_string())];
        if let Some(curl) = self.backend.curl_for(text) {
            fields.push(("curl", curl));
        }
        self.log.log(Severity::Info, "query.request", &fields);

        let outcome = match self.backend.execute(text).await {
            Ok(response) => {
                if let Some(curl) = response.curl_command.as_deref() {
                    self.log.log(Severity::Debug, "query.backend_curl", &[("curl", curl.to_string())]);
                }
                self.build_result(response)
            }
            Err(e) => Err(e),
        };
        guard.disarm();
        Ok(self.settle(text, outcome))
    }

    /// Submit the current draft.
    ///
    /// # Errors
    ///
    /// Same as [`QuerySession::submit_query`]; a rejected draft is kept.
    pub async fn submit_draft(&self) -> Result<Message, SessionError> {
        let text = self.draft();
        self.submit_query(&text).await
    }

    fn accept(&self, text: &str) -> Result<Message, SessionError> {
        self.apply(|inner| {
            if text.trim().is_empty() {
                return (Err(SessionError::from(ValidationError::EmptyQuery)), vec![]);
            }
            if let Some(pending) = &inner.pending {
                let err = ValidationError::RequestInFlight { pending: pending.query.clone() };
                return (Err(SessionError::from(err)), vec![]);
            }
            if self.schema_policy == SchemaPolicy::RequireReady && !inner.schema.is_ready() {
                return (Err(SessionError::SchemaUnavailable(inner.schema.reason())), vec![]);
            }

            let user = inner.append(|id| Message::user(id, text));
            inner.pending = Some(PendingRequest { query: text.to_string(), issued_at: Instant::now() });
            inner.draft.clear();
            (Ok(user.clone()), vec![SessionEvent::MessageAppended(user), SessionEvent::PendingChanged(true)])
        })
    }

    fn settle(&self, text: &str, outcome: Result<QueryResult, ApiError>) -> Message {
        let (reply, elapsed_ms) = self.apply(|inner| {
            let elapsed_ms = inner
                .pending
                .take()
                .map_or(0, |p| p.issued_at.elapsed().as_millis());
            let (reply, banner) = match outcome {
                Ok(result) => (inner.append(|id| Message::system_result(id, result)), None),
                Err(e) => {
                    let banner = Banner { source: BannerSource::Query, text: e.to_string() };
                    inner.banner = Some(banner.clone());
                    (inner.append(|id| Message::system_error(id, e.to_string())), Some(banner))
                }
            };
            let mut events = vec![SessionEvent::MessageAppended(reply.clone()), SessionEvent::PendingChanged(false)];
            events.extend(banner.map(SessionEvent::Banner));
            ((reply, elapsed_ms), events)
        });

        match reply.result() {
            Some(result) => self.log.log(
                Severity::Info,
                "query.result",
                &[
                    ("query", text.to_string()),
                    ("sql", result.sql().to_string()),
                    ("rows", result.rows().len().to_string()),
                    ("chart", result.chart_image().is_some().to_string()),
                    ("elapsed_ms", elapsed_ms.to_string()),
                ],
            ),
            None => self.log.log(
                Severity::Warn,
                "query.error",
                &[
                    ("query", text.to_string()),
                    ("error", reply.text().unwrap_or_default().to_string()),
                    ("elapsed_ms", elapsed_ms.to_string()),
                ],
            ),
        }
        reply
    }

    fn cancel_pending(&self) {
        let cancelled = self.apply(|inner| {
            let Some(pending) = inner.pending.take() else {
                return (None, vec![]);
            };
            let reply = inner.append(|id| Message::system_error(id, CANCELLED_TEXT));
            let elapsed_ms = pending.issued_at.elapsed().as_millis();
            (
                Some((pending.query, elapsed_ms)),
                vec![SessionEvent::MessageAppended(reply), SessionEvent::PendingChanged(false)],
            )
        });
        if let Some((query, elapsed_ms)) = cancelled {
            self.log.log(
                Severity::Warn,
                "query.cancelled",
                &[("query", query), ("elapsed_ms", elapsed_ms.to_string())],
            );
        }
    }

    fn build_result(&self, response: ExecuteResponse) -> Result<QueryResult, ApiError> {
        let result = QueryResult::new(response.sql, response.columns, response.data)?;
        if !self.charts {
            return Ok(result);
        }
        match response.graph.as_deref().map(str::trim) {
            None | Some("") => Ok(result),
            Some(encoded) => match STANDARD.decode(encoded) {
                Ok(image) => Ok(result.with_chart(image)),
                Err(e) => {
                    self.log.log(Severity::Warn, "query.chart_dropped", &[("error", e.to_string())]);
                    Ok(result)
                }
            },
        }
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    /// Export a result message as CSV.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NotAResult` for user and error messages.
    pub fn export_csv(&self, message: &Message, filename: Option<&str>) -> Result<CsvExport, SessionError> {
        let export = csv::export_message(message, filename)?;
        self.log.log(
            Severity::Info,
            "export.csv",
            &[
                ("message", message.id.0.to_string()),
                ("filename", export.filename.clone()),
                ("bytes", export.bytes.len().to_string()),
            ],
        );
        Ok(export)
    }

    /// Export the most recent query result in the transcript.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NoResult` when no result has been received yet.
    pub fn export_last_csv(&self, filename: Option<&str>) -> Result<CsvExport, SessionError> {
        let last = self
            .lock()
            .transcript
            .iter()
            .rev()
            .find(|m| m.kind() == MessageKind::SystemResult)
            .cloned()
            .ok_or(ExportError::NoResult)?;
        self.export_csv(&last, filename)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Snapshot of the transcript in display order.
    #[must_use]
    pub fn transcript(&self) -> Vec<Message> {
        self.lock().transcript.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().pending.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<PendingRequest> {
        self.lock().pending.clone()
    }

    #[must_use]
    pub fn schema_state(&self) -> SchemaState {
        self.lock().schema.clone()
    }

    /// Read and clear the one-shot banner.
    pub fn take_banner(&self) -> Option<Banner> {
        self.lock().banner.take()
    }

    #[must_use]
    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
