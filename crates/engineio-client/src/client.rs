use bytes::Bytes;
use http::{Request, Response};
use http_body::Body;
use http_body_util::Full;
use hyper::service::Service;
use tokio::net::TcpStream;
use tokio_tungstenite::MaybeTlsStream;
use url::Url;

use crate::{
    config::ClientConfig,
    errors::{BoxError, ConnectError},
    handler::{EventHandler, Handlers},
    session::Session,
    transport::{
        polling::{HttpClient, HyperClient},
        with_default_path, ws,
    },
};

/// A session connected over a tcp websocket.
pub type ClientSession = Session<MaybeTlsStream<TcpStream>>;

/// Configure handlers and connect to a server.
///
/// [`connect`](ClientBuilder::connect) negotiates a session with a polling request,
/// upgrades it to a websocket connection and returns the [`Session`], which must then be
/// [run](Session::run) to receive events.
#[derive(Debug)]
pub struct ClientBuilder<H = HyperClient> {
    url: String,
    handlers: Handlers,
    config: ClientConfig,
    http: H,
}

impl ClientBuilder {
    /// Create a new builder for the given server url, e.g. `http://localhost:3000`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handlers: Handlers::new(),
            config: ClientConfig::default(),
            http: HyperClient::default(),
        }
    }
}

impl<H> ClientBuilder<H> {
    /// Bind a handler to an event name.
    pub fn on(self, event: impl Into<String>, handler: impl EventHandler) -> Self {
        self.handlers.on(event, handler);
        self
    }

    /// Set the client configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Send the handshake request through another http service.
    pub fn http_service<T>(self, http: T) -> ClientBuilder<T> {
        ClientBuilder {
            url: self.url,
            handlers: self.handlers,
            config: self.config,
            http,
        }
    }

    /// Negotiate and upgrade a session.
    pub async fn connect<B>(self) -> Result<ClientSession, ConnectError>
    where
        H: Service<Request<Full<Bytes>>, Response = Response<B>>,
        H::Error: Into<BoxError>,
        B: Body,
        B::Error: Into<BoxError>,
    {
        let url = with_default_path(Url::parse(&self.url)?, &self.config.req_path);
        let open = HttpClient::new(self.http).handshake(&url).await?;
        let session = ws::upgrade(&url, open, self.handlers, self.config).await?;
        Ok(session)
    }
}
