/// NATS JetStream integration module
///
/// Provides the event envelope, a bounded JetStream connection and the
/// publisher that reports worker session outcomes.

pub mod message_envelope;
pub mod transport;
pub mod client;
pub mod memory;
pub mod publisher;

pub use message_envelope::{Envelope, IdGenerator, UuidGenerator};
pub use transport::{Ack, Transport};
pub use client::{connect, Connection};
pub use memory::{MemoryTransport, StoredMessage};
pub use publisher::{EventPublisher, EventSink, PublishRecord, TracingSink};

/// Publisher over a live NATS connection
pub type SessionPublisher = EventPublisher<Connection>;
