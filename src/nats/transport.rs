//! Transport seam between the publisher and the broker
//!
//! The publisher only needs "put these bytes on this subject and tell me where
//! they landed". `Connection` does that over JetStream, `MemoryTransport` in
//! process.

use std::future::Future;

use crate::error::ClientError;

/// Broker confirmation that a message was durably stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    /// Stream that captured the subject
    pub stream: String,

    /// Position in that stream; strictly increasing per stream
    pub sequence: u64,

    /// The broker had already stored a message with the same id
    pub duplicate: bool,
}

pub trait Transport: Send + Sync {
    /// Publish `payload` on `subject` and wait for the stream ack.
    ///
    /// `message_id` is handed to the broker for duplicate detection.
    fn send(
        &self,
        subject: &str,
        message_id: &str,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<Ack, ClientError>> + Send;

    /// Flush what is in flight and release the transport. Never fails.
    fn close(self) -> impl Future<Output = ()> + Send
    where
        Self: Sized;
}
