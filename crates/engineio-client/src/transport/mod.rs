//! The transports used by the client.
//!
//! A session is always negotiated with a single [`polling`] request and then upgraded
//! to a [`ws`] connection which is kept for the whole session.

use engineio_client_core::{ProtocolVersion, TransportType};
use url::Url;

pub mod polling;
pub mod ws;

/// Query parameters owned by the engine.io protocol. They are replaced if the user provided them.
const PROTOCOL_PARAMS: [&str; 3] = ["EIO", "transport", "sid"];

/// Use `req_path` if the url has no path.
pub(crate) fn with_default_path(mut url: Url, req_path: &str) -> Url {
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(req_path);
    }
    url
}

/// Build the url of an engine.io request.
///
/// The user query parameters are preserved and the protocol ones are appended.
/// For the websocket transport, the scheme is switched to its websocket equivalent.
pub(crate) fn engine_url(base: &Url, transport: TransportType, sid: Option<&str>) -> Url {
    let mut url = base.clone();
    let user_params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !PROTOCOL_PARAMS.contains(&&**k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query
            .clear()
            .extend_pairs(user_params)
            .append_pair("EIO", ProtocolVersion::V4.as_query())
            .append_pair("transport", transport.as_query());
        if let Some(sid) = sid {
            query.append_pair("sid", sid);
        }
    }

    if transport == TransportType::Websocket {
        let scheme = match url.scheme() {
            "http" => Some("ws"),
            "https" => Some("wss"),
            _ => None,
        };
        if let Some(scheme) = scheme {
            // http(s) and ws(s) are all special schemes, switching between them cannot fail
            url.set_scheme(scheme).ok();
        }
    }
    url
}
