//! Event publisher
//!
//! Serializes a payload, wraps it in an [`Envelope`], sends it through a
//! [`Transport`] under a fixed deadline and returns the broker's ack.
//! Nothing is retried here.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, Route, SessionRoutes};
use crate::error::{ClientError, ConnectError, PublishError, SerializationError};
use crate::nats::client::{connect, Connection};
use crate::nats::message_envelope::{Envelope, IdGenerator, UuidGenerator};
use crate::nats::transport::{Ack, Transport};
use crate::session::SessionData;

/// Record of one acknowledged publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    pub subject: String,
    pub event_type: String,
    pub event_id: String,
    pub task_id: Option<String>,
    pub stream: String,
    pub sequence: u64,
}

/// Receives a [`PublishRecord`] after every successful publish
pub trait EventSink: Send + Sync {
    fn published(&self, record: &PublishRecord);
}

impl<F> EventSink for F
where
    F: Fn(&PublishRecord) + Send + Sync,
{
    fn published(&self, record: &PublishRecord) {
        self(record)
    }
}

/// Emits each record as a structured `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn published(&self, record: &PublishRecord) {
        tracing::info!(
            subject = %record.subject,
            task_id = record.task_id.as_deref().unwrap_or(""),
            stream = %record.stream,
            seq = record.sequence,
            event_id = %record.event_id,
            "published session event"
        );
    }
}

pub struct EventPublisher<T: Transport> {
    transport: T,
    source: String,
    routes: SessionRoutes,
    publish_timeout: Duration,
    ids: Box<dyn IdGenerator>,
    sink: Arc<dyn EventSink>,
}

impl EventPublisher<Connection> {
    /// Connect to the broker configured in `config` and wrap the connection
    pub async fn connect(config: &ClientConfig) -> Result<Self, ConnectError> {
        let connection = connect(config).await?;
        Ok(Self::new(connection, config))
    }
}

impl<T: Transport> EventPublisher<T> {
    /// Create a publisher over an existing transport.
    ///
    /// Source label, routes and publish deadline are taken from `config`;
    /// ids are random UUIDv4 and records go to [`TracingSink`].
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            source: config.source.clone(),
            routes: config.routes.clone(),
            publish_timeout: config.publish_timeout(),
            ids: Box::new(UuidGenerator),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_publish_timeout(mut self, timeout: Duration) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Publish `payload` to `subject` as an event of type `event_type`.
    ///
    /// # Errors
    /// * `ClientError::Serialization` - payload or envelope could not be encoded
    /// * `ClientError::Publish` - no ack before the deadline, or the broker refused
    /// * `ClientError::Connect` - the connection was lost for good
    pub async fn publish<P>(&self, subject: &str, event_type: &str, payload: &P) -> Result<Ack, ClientError>
    where
        P: Serialize + ?Sized,
    {
        self.publish_traced(subject, event_type, payload, None).await
    }

    /// Report a session that finished its task.
    ///
    /// A task has exactly one terminal outcome: callers must not report the
    /// same task through both this and [`publish_failed`](Self::publish_failed).
    pub async fn publish_completed(&self, data: &SessionData) -> Result<Ack, ClientError> {
        self.publish_session(&self.routes.completed, data).await
    }

    /// Report a session that failed its task
    pub async fn publish_failed(&self, data: &SessionData) -> Result<Ack, ClientError> {
        self.publish_session(&self.routes.failed, data).await
    }

    /// Flush in-flight messages and release the transport
    pub async fn close(self) {
        self.transport.close().await
    }

    async fn publish_session(&self, route: &Route, data: &SessionData) -> Result<Ack, ClientError> {
        let task_id = Some(data.task_id.as_str()).filter(|id| !id.is_empty());
        self.publish_traced(&route.subject, &route.event_type, data, task_id).await
    }

    async fn publish_traced<P>(
        &self,
        subject: &str,
        event_type: &str,
        payload: &P,
        task_id: Option<&str>,
    ) -> Result<Ack, ClientError>
    where
        P: Serialize + ?Sized,
    {
        let data = serde_json::value::to_raw_value(payload).map_err(SerializationError::Payload)?;

        let envelope = Envelope::build(event_type, &self.source, data, self.ids.as_ref());
        let bytes = envelope.to_vec().map_err(SerializationError::Envelope)?;

        let ack = tokio::time::timeout(
            self.publish_timeout,
            self.transport.send(subject, &envelope.id, bytes),
        )
        .await
        .map_err(|_| PublishError::Timeout(self.publish_timeout))??;

        self.sink.published(&PublishRecord {
            subject: subject.to_string(),
            event_type: event_type.to_string(),
            event_id: envelope.id,
            task_id: task_id.map(str::to_string),
            stream: ack.stream.clone(),
            sequence: ack.sequence,
        });

        Ok(ack)
    }
}
