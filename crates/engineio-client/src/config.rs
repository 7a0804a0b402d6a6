//! ## Configuration for the client
//!
//! The heartbeat timings are not configurable: they are negotiated with the server
//! during the handshake and carried by the [`OpenPacket`](engineio_client_core::OpenPacket).

/// The heartbeat frames emitted periodically by the client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HeartbeatMode {
    /// Emit a ping packet every ping interval.
    #[default]
    Ping,
    /// Emit a pong packet every ping interval.
    Pong,
    /// Do not emit any heartbeat. Pings from the server are still answered.
    Disabled,
}

/// How the websocket connection is confirmed by the server after it is opened.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum UpgradeMode {
    /// The server sends an open packet as the first frame.
    #[default]
    Confirm,
    /// The client sends a `2probe` ping, expects a `3probe` pong and sends an upgrade packet.
    Probe,
}

/// Configuration of a [`ClientBuilder`](crate::ClientBuilder).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The path used when the server url does not have one.
    /// Defaults to "/socket.io/".
    pub req_path: String,

    /// The heartbeat frames sent by the client.
    /// Defaults to [`HeartbeatMode::Ping`].
    pub heartbeat: HeartbeatMode,

    /// The way the websocket upgrade is confirmed.
    /// Defaults to [`UpgradeMode::Confirm`].
    pub upgrade: UpgradeMode,

    /// Send a socket.io connect packet for the default namespace when the session starts.
    /// Defaults to true.
    pub connect_namespace: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            req_path: "/socket.io/".to_string(),
            heartbeat: HeartbeatMode::default(),
            upgrade: UpgradeMode::default(),
            connect_namespace: true,
        }
    }
}

impl ClientConfig {
    /// Create a new [`ClientConfigBuilder`]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The path used when the server url does not have one.
    /// Defaults to "/socket.io/".
    pub fn req_path(mut self, req_path: impl Into<String>) -> Self {
        self.config.req_path = req_path.into();
        self
    }

    /// The heartbeat frames sent by the client.
    pub fn heartbeat(mut self, heartbeat: HeartbeatMode) -> Self {
        self.config.heartbeat = heartbeat;
        self
    }

    /// The way the websocket upgrade is confirmed.
    pub fn upgrade(mut self, upgrade: UpgradeMode) -> Self {
        self.config.upgrade = upgrade;
        self
    }

    /// Send a socket.io connect packet when the session starts.
    /// Disable it to talk to a bare engine.io server.
    pub fn connect_namespace(mut self, connect_namespace: bool) -> Self {
        self.config.connect_namespace = connect_namespace;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
