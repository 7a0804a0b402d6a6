/// The `transport` a request is made on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransportType {
    /// Http long polling, only used for the handshake
    Polling,
    /// Websocket transport, kept for the whole session
    Websocket,
}

impl TransportType {
    /// The value of the `transport` query parameter, also the name advertised in `upgrades`.
    pub const fn as_query(self) -> &'static str {
        match self {
            TransportType::Polling => "polling",
            TransportType::Websocket => "websocket",
        }
    }
}

/// The engine.io protocol version spoken by the client.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// The protocol version 4
    V4 = 4,
}

impl ProtocolVersion {
    /// The value of the `EIO` query parameter.
    pub const fn as_query(self) -> &'static str {
        match self {
            ProtocolVersion::V4 => "4",
        }
    }
}
