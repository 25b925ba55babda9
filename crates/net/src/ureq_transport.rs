use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
    mpsc::Sender,
};
use std::thread;
use std::time::Duration;

use core_types::RequestId;
use serde_json::Value;
use url::Url;

use crate::{FetchReply, FetchRequest, Transport, TransportError, request_signature};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "typeahead/0.1";

/// Blocking `ureq` requests, one worker thread per request.
///
/// Each request gets its own cancel flag. A cancelled request still runs to
/// completion on its thread (ureq cannot interrupt a call), but its reply is
/// dropped instead of sent.
pub struct UreqTransport {
    agent: ureq::Agent,
    base: Option<Url>,
    cancels: Arc<Mutex<HashMap<RequestId, Arc<AtomicBool>>>>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_base(None)
    }

    /// Relative endpoint URLs (e.g. a form's `action="/search"`) are joined
    /// onto `base`.
    pub fn with_base(base: Option<Url>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            base,
            cancels: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: FetchRequest, reply: Sender<FetchReply>) {
        let request_id = request.request_id;
        let cancel = Arc::new(AtomicBool::new(false));
        if let Ok(mut cancels) = self.cancels.lock() {
            cancels.insert(request_id, Arc::clone(&cancel));
        }

        let agent = self.agent.clone();
        let base = self.base.clone();
        let cancels = Arc::clone(&self.cancels);

        thread::spawn(move || {
            let result = fetch_json(&agent, base.as_ref(), &request);

            if let Ok(mut cancels) = cancels.lock() {
                cancels.remove(&request_id);
            }
            if cancel.load(Ordering::Acquire) {
                log::trace!(
                    target: "net.transport",
                    "dropping reply for cancelled request {request_id}"
                );
                return;
            }
            // The receiver is gone once the widget is destroyed.
            let _ = reply.send(FetchReply { request_id, result });
        });
    }

    fn cancel(&self, request_id: RequestId) {
        if let Ok(cancels) = self.cancels.lock()
            && let Some(flag) = cancels.get(&request_id)
        {
            flag.store(true, Ordering::Release);
        }
    }
}

fn resolve(base: Option<&Url>, target: &str) -> Result<Url, TransportError> {
    match Url::parse(target) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| {
                TransportError::client(format!("relative URL without base: {target}"))
            })?;
            base.join(target)
                .map_err(|e| TransportError::client(format!("{target}: {e}")))
        }
        Err(e) => Err(TransportError::client(format!("{target}: {e}"))),
    }
}

fn fetch_json(
    agent: &ureq::Agent,
    base: Option<&Url>,
    request: &FetchRequest,
) -> Result<Value, TransportError> {
    let url = resolve(base, &request_signature(&request.url, &request.params))?;
    log::debug!(target: "net.transport", "GET {url} (request {})", request.request_id);

    let resp = agent
        .get(url.as_str())
        .set("Accept", "application/json")
        .call()
        .map_err(TransportError::from)?;

    resp.into_json::<Value>()
        .map_err(|e| TransportError::parse(e.to_string()))
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, resp) => TransportError::http(status, resp.status_text()),
            ureq::Error::Transport(t) => TransportError::network(t.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_ignore_base() {
        let base = Url::parse("https://example.test/app/").unwrap();
        let url = resolve(Some(&base), "https://api.test/s?q=a").unwrap();
        assert_eq!(url.as_str(), "https://api.test/s?q=a");
    }

    #[test]
    fn relative_urls_join_base() {
        let base = Url::parse("https://example.test/app/page").unwrap();
        let url = resolve(Some(&base), "/search?q=a").unwrap();
        assert_eq!(url.as_str(), "https://example.test/search?q=a");
    }

    #[test]
    fn relative_url_without_base_is_a_client_error() {
        let err = resolve(None, "/search?q=a").unwrap_err();
        assert_eq!(err.kind, crate::TransportErrorKind::Client);
    }

    #[test]
    fn cancel_of_unknown_request_is_a_no_op() {
        let transport = UreqTransport::new();
        transport.cancel(42);
        assert!(transport.cancels.lock().unwrap().is_empty());
    }
}
