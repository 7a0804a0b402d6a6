//! The polling transport is only used to negotiate a session.
//!
//! ## Handshake :
//! ```text
//! CLIENT                                                 SERVER
//!│                                                      │
//!│   GET /socket.io/?EIO=4&transport=polling            │
//!│ ───────────────────────────────────────────────────► │
//!│  ◄─────────────────────────────────────────────────┘ │
//!│   HTTP 200  0{"sid":...,"pingInterval":...}          │
//! ```
//!
//! The request is sent through any hyper [`Service`] so the handshake can be driven
//! without a network. [`HyperClient`] is the default one.

use bytes::Bytes;
use engineio_client_core::{HandshakeParseError, OpenPacket, TransportType};
use http::{Request, Response};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use hyper::{body::Incoming, service::Service};
use hyper_util::{
    client::legacy::{Client, ResponseFuture, connect::HttpConnector},
    rt::TokioExecutor,
};
use url::Url;

use crate::{
    errors::{BoxError, HandshakeError},
    transport::engine_url,
};

/// The default http service, a plain http/1 hyper client.
///
/// It has no tls connector: a handshake with an `https` url fails with
/// [`HandshakeError::Unreachable`]. Use [`ClientBuilder::http_service`](crate::ClientBuilder::http_service)
/// to provide a client able to reach such servers.
#[derive(Debug, Clone)]
pub struct HyperClient {
    inner: Client<HttpConnector, Full<Bytes>>,
}

impl Default for HyperClient {
    fn default() -> Self {
        Self {
            inner: Client::builder(TokioExecutor::new()).build_http(),
        }
    }
}

impl Service<Request<Full<Bytes>>> for HyperClient {
    type Response = Response<Incoming>;
    type Error = hyper_util::client::legacy::Error;
    type Future = ResponseFuture;

    fn call(&self, req: Request<Full<Bytes>>) -> Self::Future {
        self.inner.request(req)
    }
}

/// Negotiates a session with a single polling request.
#[derive(Debug, Clone, Default)]
pub struct HttpClient<S> {
    svc: S,
}

impl<S, B> HttpClient<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>>,
    S::Error: Into<BoxError>,
    B: Body,
    B::Error: Into<BoxError>,
{
    /// Create a new client sending its requests through the given service.
    pub fn new(svc: S) -> Self {
        Self { svc }
    }

    /// Send the handshake request and parse the [`OpenPacket`] from the response.
    ///
    /// It is never retried.
    pub async fn handshake(&self, url: &Url) -> Result<OpenPacket, HandshakeError> {
        let url = engine_url(url, TransportType::Polling, None);

        #[cfg(feature = "tracing")]
        tracing::debug!(%url, "sending handshake request");

        let req = Request::get(url.as_str())
            .body(Full::default())
            .map_err(|e| HandshakeError::Unreachable(e.into()))?;
        let res = self
            .svc
            .call(req)
            .await
            .map_err(|e| HandshakeError::Unreachable(e.into()))?;
        let status = res.status();
        let body = res
            .into_body()
            .collect()
            .await
            .map_err(|e| HandshakeError::Unreachable(e.into()))?
            .to_bytes();

        #[cfg(feature = "tracing")]
        tracing::trace!(?status, ?body, "handshake response");

        if !status.is_success() {
            return Err(HandshakeParseError::Status(status.as_u16()).into());
        }
        let open = OpenPacket::from_handshake_body(&body)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(sid = %open.sid, "session negotiated");

        Ok(open)
    }
}
