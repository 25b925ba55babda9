use std::fmt;
use std::sync::mpsc::Sender;

use core_types::{Params, RequestId};
use serde_json::Value;

mod ureq_transport;

#[cfg(any(test, feature = "test-harness"))]
pub mod testing;

pub use ureq_transport::UreqTransport;

/// One GET to `url` with `params` in the query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub request_id: RequestId,
    pub url: String,
    pub params: Params,
}

/// Outcome of a [`FetchRequest`], delivered over the reply channel.
#[derive(Debug)]
pub struct FetchReply {
    pub request_id: RequestId,
    pub result: Result<Value, TransportError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Non-2xx response.
    Http,
    /// Connection, DNS, TLS or timeout failure.
    Network,
    /// Response body was not valid JSON.
    Parse,
    /// The request could not be built (bad URL and the like).
    Client,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub status: Option<u16>,
    pub reason: String,
}

impl TransportError {
    pub fn http(status: u16, reason: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Http,
            status: Some(status),
            reason: reason.into(),
        }
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Network,
            status: None,
            reason: reason.into(),
        }
    }

    pub fn parse(reason: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Parse,
            status: None,
            reason: reason.into(),
        }
    }

    pub fn client(reason: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Client,
            status: None,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.status) {
            (TransportErrorKind::Http, Some(status)) => write!(f, "HTTP {status}: {}", self.reason),
            (TransportErrorKind::Network, _) => write!(f, "network error: {}", self.reason),
            (TransportErrorKind::Parse, _) => write!(f, "invalid response body: {}", self.reason),
            _ => write!(f, "request error: {}", self.reason),
        }
    }
}

impl std::error::Error for TransportError {}

/// The network boundary.
///
/// `send` must not block: the reply goes to `reply` whenever it is ready.
/// `cancel` is best effort. A transport may still deliver a reply for a
/// cancelled request, and callers must be prepared to discard it.
pub trait Transport {
    fn send(&self, request: FetchRequest, reply: Sender<FetchReply>);
    fn cancel(&self, request_id: RequestId);
}

/// Canonical form of a request: `url`, then `?` (or `&` if the URL already
/// has a query), then the form-urlencoded params.
///
/// Doubles as the cache key, so it must stay a pure function of its inputs.
pub fn request_signature(url: &str, params: &Params) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    if query.is_empty() {
        return url.to_string();
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(v: &[(&str, &str)]) -> Params {
        v.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn signature_appends_query() {
        let sig = request_signature("/search", &params(&[("q", "new york")]));
        assert_eq!(sig, "/search?q=new+york");
    }

    #[test]
    fn signature_extends_existing_query() {
        let sig = request_signature(
            "https://api.test/s?v=2",
            &params(&[("limit", "5"), ("q", "a&b")]),
        );
        assert_eq!(sig, "https://api.test/s?v=2&limit=5&q=a%26b");
    }

    #[test]
    fn signature_depends_on_param_order() {
        let a = request_signature("/s", &params(&[("a", "1"), ("b", "2")]));
        let b = request_signature("/s", &params(&[("b", "2"), ("a", "1")]));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_params_leave_url_untouched() {
        assert_eq!(request_signature("/s", &Vec::new()), "/s");
    }

    #[test]
    fn error_display_names_the_cause() {
        assert_eq!(
            TransportError::http(503, "Service Unavailable").to_string(),
            "HTTP 503: Service Unavailable"
        );
        assert_eq!(
            TransportError::network("timed out").to_string(),
            "network error: timed out"
        );
    }
}
