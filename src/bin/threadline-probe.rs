//! Threadline Probe
//!
//! Headless smoke client: connects to a backend, sends one message, and
//! logs the reconciled timeline as the reply streams in. Useful for
//! checking a backend deployment without any UI.
//!
//! # Usage
//!
//! ```bash
//! # Connect to the default endpoint and say hello
//! threadline-probe
//!
//! # Custom endpoint and message
//! THREADLINE_ENDPOINT=ws://chat.local:8001/ws/chat threadline-probe "ping"
//!
//! # With verbose logging
//! RUST_LOG=debug threadline-probe
//! ```
//!
//! # Environment Variables
//!
//! - `THREADLINE_ENDPOINT`: backend WebSocket URL
//! - `THREADLINE_RECONNECT_ATTEMPTS` / `THREADLINE_RECONNECT_DELAY`
//! - `RUST_LOG`: log level (trace, debug, info, warn, error)

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use threadline::{ChatClient, ClientConfig, NoticeLevel, Role};

/// How long to wait for the backend before giving up
const REPLY_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("threadline_probe=info".parse()?)
                .add_directive("threadline=info".parse()?),
        )
        .with_target(true)
        .init();

    let config = ClientConfig::from_env();
    let message = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello from threadline-probe".to_string());

    info!(endpoint = %config.endpoint, "connecting");
    let mut client = ChatClient::new(config);
    client.connect().await?;

    let mut sent = false;
    let outcome = timeout(REPLY_TIMEOUT, async {
        loop {
            if !client.drive().await {
                anyhow::bail!("transport closed before a reply arrived");
            }

            for notice in client.take_notices() {
                match notice.level {
                    NoticeLevel::Error => warn!(notice = %notice.message, "notice"),
                    _ => info!(notice = %notice.message, "notice"),
                }
            }

            // Send once the connection is confirmed open
            if !sent && client.connection_state().is_open() {
                info!(message = %message, "sending");
                client.send_text(message.clone()).await;
                sent = true;
            }

            // Done when the assistant's reply has finalized
            let replied = sent
                && !client.is_streaming()
                && client
                    .timeline()
                    .iter()
                    .any(|m| m.role == Role::Assistant && !m.in_progress);
            if replied {
                return Ok(());
            }
        }
    })
    .await;

    match outcome {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("timed out after {REPLY_TIMEOUT:?} waiting for a reply"),
    }

    info!(
        thread = ?client.active_thread(),
        threads = client.thread_ids().len(),
        "conversation state"
    );
    for message in client.timeline() {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        info!(role, tool = ?message.tool, error = message.is_error, "{}", message.content);
    }

    client.disconnect().await;
    Ok(())
}
