/// NATS JetStream connection for short-lived worker processes
///
/// Provides bounded connection management, acknowledged publishing and a
/// best-effort flush on shutdown.

use async_nats::jetstream::{self, context::PublishErrorKind};
use async_nats::{ConnectOptions, Event};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{ClientError, ConnectError, PublishError};
use crate::nats::transport::{Ack, Transport};

/// Open connection to the broker, owned by a single worker process
pub struct Connection {
    client: async_nats::Client,
    jetstream: jetstream::Context,
    reconnects: Arc<ReconnectBudget>,
    publish_timeout: Duration,
    drain_timeout: Duration,
}

/// Tracks whether the client has given up reconnecting
#[derive(Debug)]
struct ReconnectBudget {
    exhausted: AtomicBool,
    max_reconnects: usize,
}

impl ReconnectBudget {
    fn new(max_reconnects: usize) -> Self {
        Self {
            exhausted: AtomicBool::new(false),
            max_reconnects,
        }
    }

    fn on_event(&self, event: Event) {
        match event {
            Event::Connected => tracing::debug!("NATS connection (re)established"),
            Event::Disconnected => tracing::warn!("NATS connection lost, reconnecting"),
            Event::ClientError(async_nats::ClientError::MaxReconnects) => {
                self.exhausted.store(true, Ordering::SeqCst);
                tracing::error!("NATS reconnect attempts exhausted, giving up");
            }
            other => tracing::debug!("NATS event: {}", other),
        }
    }

    /// Fails once the connection has been abandoned
    fn check(&self) -> Result<(), ConnectError> {
        if self.exhausted.load(Ordering::SeqCst) {
            Err(ConnectError::ReconnectsExhausted {
                max_reconnects: self.max_reconnects,
            })
        } else {
            Ok(())
        }
    }
}

/// Connect to NATS with fail-fast settings.
///
/// The handshake is bounded by `connect_timeout`. Once connected, a dropped
/// connection is retried `max_reconnects` times, `reconnect_wait` apart, and
/// then abandoned; later publishes return [`ConnectError::ReconnectsExhausted`].
///
/// # Example
/// ```ignore
/// let connection = connect(&ClientConfig::from_env()).await?;
/// ```
pub async fn connect(config: &ClientConfig) -> Result<Connection, ConnectError> {
    if config.url.trim().is_empty() {
        return Err(ConnectError::InvalidConfig("broker URL is empty".to_string()));
    }

    let reconnects = Arc::new(ReconnectBudget::new(config.max_reconnects));
    let budget = Arc::clone(&reconnects);
    let reconnect_wait = config.reconnect_wait();

    let mut options = ConnectOptions::new()
        .name(&config.client_name)
        .connection_timeout(config.connect_timeout())
        .max_reconnects(config.max_reconnects)
        // Fixed backoff; the first attempt goes out immediately
        .reconnect_delay_callback(move |attempts| {
            if attempts <= 1 {
                Duration::ZERO
            } else {
                reconnect_wait
            }
        })
        .event_callback(move |event| {
            let budget = Arc::clone(&budget);
            async move { budget.on_event(event) }
        });

    if let Some(token) = config.auth_token() {
        options = options.token(token.to_string());
    }

    let client = tokio::time::timeout(config.connect_timeout(), options.connect(config.url.as_str()))
        .await
        .map_err(|_| ConnectError::HandshakeTimeout(config.connect_timeout()))?
        .map_err(ConnectError::Handshake)?;

    tracing::info!("Connected to NATS at {} as {}", config.url, config.client_name);

    let mut jetstream = jetstream::new(client.clone());
    jetstream.set_timeout(config.publish_timeout());

    Ok(Connection {
        client,
        jetstream,
        reconnects,
        publish_timeout: config.publish_timeout(),
        drain_timeout: config.drain_timeout(),
    })
}

impl Connection {
    fn publish_error(&self, err: jetstream::context::PublishError) -> PublishError {
        if matches!(err.kind(), PublishErrorKind::TimedOut) {
            PublishError::Timeout(self.publish_timeout)
        } else {
            PublishError::Broker(Box::new(err))
        }
    }
}

impl Transport for Connection {
    async fn send(&self, subject: &str, message_id: &str, payload: Vec<u8>) -> Result<Ack, ClientError> {
        self.reconnects.check()?;

        let mut headers = async_nats::HeaderMap::new();
        headers.insert(async_nats::header::NATS_MESSAGE_ID, message_id);

        // Publish with JetStream (durable, acknowledged)
        let ack_future = self
            .jetstream
            .publish_with_headers(subject.to_string(), headers, payload.into())
            .await
            .map_err(|e| self.publish_error(e))?;

        // Wait for acknowledgment
        let ack = ack_future.await.map_err(|e| self.publish_error(e))?;

        Ok(Ack {
            stream: ack.stream,
            sequence: ack.sequence,
            duplicate: ack.duplicate,
        })
    }

    async fn close(self) {
        match tokio::time::timeout(self.drain_timeout, self.client.flush()).await {
            Ok(Ok(())) => tracing::debug!("NATS connection flushed"),
            Ok(Err(e)) => tracing::debug!("NATS flush failed on close: {}", e),
            Err(_) => tracing::warn!(
                "NATS flush did not finish within {}ms, closing anyway",
                self.drain_timeout.as_millis()
            ),
        }
        // Dropping the last client handle closes the connection
        drop(self.jetstream);
        drop(self.client);
    }
}
