//! End to end client used against a running socket.io server.
//!
//! * `SERVER_URL`: the server to connect to, defaults to `http://localhost:3000`
//! * `EVENTS`: comma separated event names to log, defaults to `message`
//! * `PROBE`: if set, the websocket upgrade uses the `2probe` exchange
//! * `RUST_LOG`: log filter, defaults to `debug`

use engineio_client::{ClientBuilder, ClientConfig, UpgradeMode};
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let url = std::env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let events = std::env::var("EVENTS").unwrap_or_else(|_| "message".into());
    let upgrade = match std::env::var("PROBE") {
        Ok(_) => UpgradeMode::Probe,
        Err(_) => UpgradeMode::Confirm,
    };

    let mut builder =
        ClientBuilder::new(url).config(ClientConfig::builder().upgrade(upgrade).build());
    for event in events.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let name = event.to_string();
        builder = builder.on(event, move |data: Value| info!(event = %name, %data, "event received"));
    }

    info!("Connecting");
    let session = builder.connect().await?;
    info!(sid = session.sid(), "Connected");

    let emitter = session.emitter();
    let handle = tokio::spawn(session.run());
    emitter.emit("message", json!("hello from rust")).await?;

    let reason = handle.await??;
    info!(?reason, "Session ended");
    Ok(())
}
