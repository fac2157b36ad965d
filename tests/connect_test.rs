//! Connection tests against unreachable and (optionally) live brokers

use std::time::{Duration, Instant};

use swarm_events::{connect, ClientConfig, ConnectError, SessionData, SessionPublisher};

fn unused_local_url() -> String {
    // Bind and drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("nats://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_connect_refused_fails_fast() {
    let config = ClientConfig {
        url: unused_local_url(),
        connect_timeout_ms: 500,
        reconnect_wait_ms: 100,
        max_reconnects: 2,
        ..Default::default()
    };

    let started = Instant::now();
    let result = connect(&config).await;

    assert!(matches!(
        result,
        Err(ConnectError::Handshake(_)) | Err(ConnectError::HandshakeTimeout(_))
    ));
    let bound = config.connect_timeout() + config.reconnect_budget() + Duration::from_secs(1);
    assert!(started.elapsed() < bound, "connect took {:?}", started.elapsed());
}

#[tokio::test]
async fn test_connect_rejects_empty_url() {
    let config = ClientConfig {
        url: "  ".to_string(),
        ..Default::default()
    };

    let result = SessionPublisher::connect(&config).await;
    assert!(matches!(result, Err(ConnectError::InvalidConfig(_))));
}

#[tokio::test]
#[ignore] // Requires NATS server with a stream capturing swarm.cc.session.>
async fn test_live_sequences_increase() {
    let publisher = SessionPublisher::connect(&ClientConfig::from_env()).await.unwrap();

    let data = SessionData::new("live-test", "worker", "/tmp").with_task_id("live-1");
    let first = publisher.publish_completed(&data).await.unwrap();
    let second = publisher.publish_completed(&data).await.unwrap();

    assert_eq!(first.stream, second.stream);
    assert!(second.sequence > first.sequence);

    publisher.close().await;
}
