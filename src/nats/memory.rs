//! In-process transport
//!
//! Stores published messages in memory and acks them the way a single
//! JetStream stream would: one sequence counter per stream, starting at 1.
//! Useful for exercising publishers without a broker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ClientError, PublishError};
use crate::nats::transport::{Ack, Transport};

/// A message accepted by [`MemoryTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub subject: String,
    pub message_id: String,
    pub payload: Vec<u8>,
    pub sequence: u64,
}

#[derive(Debug, Clone)]
enum Mode {
    Ack,
    Stall,
    Reject(String),
}

#[derive(Debug, Default)]
struct State {
    sequences: HashMap<String, u64>,
    messages: Vec<StoredMessage>,
    closed: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryTransport {
    stream: String,
    mode: Mode,
    state: Arc<Mutex<State>>,
}

impl MemoryTransport {
    /// Transport whose every subject is captured by `stream`
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            mode: Mode::Ack,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Transport that accepts messages but never acks them
    pub fn stalled(stream: impl Into<String>) -> Self {
        Self {
            mode: Mode::Stall,
            ..Self::new(stream)
        }
    }

    /// Transport that rejects every message with `reason`
    pub fn rejecting(stream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            mode: Mode::Reject(reason.into()),
            ..Self::new(stream)
        }
    }

    /// Messages acked so far, in publish order
    pub fn messages(&self) -> Vec<StoredMessage> {
        self.lock().messages.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep using it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for MemoryTransport {
    async fn send(&self, subject: &str, message_id: &str, payload: Vec<u8>) -> Result<Ack, ClientError> {
        match &self.mode {
            Mode::Stall => std::future::pending().await,
            Mode::Reject(reason) => Err(PublishError::Broker(reason.clone().into()).into()),
            Mode::Ack => {
                let mut state = self.lock();
                if state.closed {
                    return Err(PublishError::Broker("transport closed".into()).into());
                }

                // A repeated id is acked with the sequence it was first stored at
                let original = state
                    .messages
                    .iter()
                    .find(|m| m.message_id == message_id)
                    .map(|m| m.sequence);
                let duplicate = original.is_some();
                let sequence = if let Some(sequence) = original {
                    sequence
                } else {
                    let counter = state.sequences.entry(self.stream.clone()).or_insert(0);
                    *counter += 1;
                    let sequence = *counter;
                    state.messages.push(StoredMessage {
                        subject: subject.to_string(),
                        message_id: message_id.to_string(),
                        payload,
                        sequence,
                    });
                    sequence
                };

                Ok(Ack {
                    stream: self.stream.clone(),
                    sequence,
                    duplicate,
                })
            }
        }
    }

    async fn close(self) {
        self.lock().closed = true;
    }
}
