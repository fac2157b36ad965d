//! # swarm-events: worker outcome publishing for the swarm event bus
//!
//! A swarm worker lives for minutes: it reads its briefing, runs one task,
//! writes its findings and reports the outcome to NATS JetStream, where the
//! orchestrator consumes it. This crate is the reporting half of that.
//!
//! ## Features
//!
//! - **Bounded connection**: handshake timeout and a small reconnect budget, so a
//!   dead broker fails the worker fast instead of hanging it
//! - **Standard envelope**: `{id, type, source, timestamp, data}` with a fresh id per event
//! - **Acknowledged publish**: every publish waits for the stream ack under a fixed deadline
//! - **Best-effort shutdown**: flush with a grace period, errors discarded
//! - **Mission files**: briefing reader, findings writer and worker prompt builder
//!
//! ## Example
//!
//! ```ignore
//! use swarm_events::{ClientConfig, SessionData, SessionPublisher};
//!
//! let config = ClientConfig::from_env();
//! let publisher = SessionPublisher::connect(&config).await?;
//!
//! let data = SessionData::new("worker-1", "worker", "/work")
//!     .with_task_id("task-42")
//!     .with_exit(0, 12_345);
//! let ack = publisher.publish_completed(&data).await?;
//! println!("stored as {}#{}", ack.stream, ack.sequence);
//!
//! publisher.close().await;
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod usage;

// NATS JetStream integration
pub mod nats;

// Briefing / findings handoff files
pub mod mission;

// Re-export key types
pub use config::{ClientConfig, Route, SessionRoutes};
pub use error::{ClientError, ConfigError, ConnectError, MissionError, PublishError, SerializationError};
pub use session::SessionData;
pub use usage::TokenUsage;

// Re-export nats types
pub use nats::{
    connect, Ack, Connection, Envelope, EventPublisher, EventSink, IdGenerator, MemoryTransport,
    PublishRecord, SessionPublisher, TracingSink, Transport, UuidGenerator,
};
