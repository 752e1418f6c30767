//! Observer contract between the session and renderers.

use super::message::Message;
use super::schema::SchemaState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerSource {
    Schema,
    Query,
}

/// A transient, one-shot error notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub source: BannerSource,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SchemaChanged(SchemaState),
    MessageAppended(Message),
    /// `true` when a query was issued, `false` when it settled.
    PendingChanged(bool),
    Banner(Banner),
}

/// Receives session events after each state change has been applied.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, event: &SessionEvent);
}

impl<F> SessionObserver for F
where
    F: Fn(&SessionEvent) + Send + Sync,
{
    fn on_event(&self, event: &SessionEvent) {
        self(event);
    }
}
