//! Debounce -> cache -> network choreography.
//!
//! At most one debounce timer and one request are live. Starting either
//! cancels the previous one. A cancelled request is remembered as aborted, and
//! whatever its transport delivers later is thrown away: the flag is the
//! authority, not the transport's error reason.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Instant;

use bus::RequestStatus;
use core_types::{Params, RequestId, query_params};
use net::{FetchReply, FetchRequest, Transport, TransportError};
use serde_json::Value;

use crate::options::Options;
use crate::timer::Timer;

/// Aborted ids older than this many requests are forgotten.
const ABORTED_WINDOW: RequestId = 64;

/// Something the widget has to act on, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestStep {
    /// The query is shorter than `min_chars`; nothing was requested.
    MinChars { q: String },
    CacheHit { q: String, payload: Value },
    /// A request went out (announce `requestBefore`, show busy).
    Dispatched { q: String, request_id: RequestId },
    Success { q: String, payload: Value },
    Failure { q: String, error: TransportError },
    /// Always follows a dispatched request exactly once (announce
    /// `requestAfter`, clear busy).
    Finished { q: String, status: RequestStatus },
}

#[derive(Debug)]
struct InFlight {
    request_id: RequestId,
    q: String,
    params: Params,
    url: String,
}

pub struct RequestCoordinator {
    debounce: Timer<String>,
    in_flight: Option<InFlight>,
    aborted: HashSet<RequestId>,
    next_id: RequestId,
    transport: Box<dyn Transport>,
    reply_tx: Sender<FetchReply>,
    reply_rx: Receiver<FetchReply>,
}

impl RequestCoordinator {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();
        Self {
            debounce: Timer::new(),
            in_flight: None,
            aborted: HashSet::new(),
            next_id: 1,
            transport,
            reply_tx,
            reply_rx,
        }
    }

    /// Arm the debounce timer for `q`, replacing any pending one.
    pub fn schedule(&mut self, q: String, due: Instant) {
        log::trace!(target: "autocomplete.request", "debounce {q:?}");
        self.debounce.arm(due, q);
    }

    /// Clear the debounce timer and abort the in-flight request, if any.
    ///
    /// Returns the `Finished` step for an aborted request. Calling this with
    /// nothing pending is a no-op.
    pub fn cancel_pending(&mut self) -> Option<RequestStep> {
        self.debounce.clear();
        self.abort_in_flight()
    }

    fn abort_in_flight(&mut self) -> Option<RequestStep> {
        let flight = self.in_flight.take()?;

        log::debug!(
            target: "autocomplete.request",
            "abort request {} for {:?}",
            flight.request_id,
            flight.q
        );
        self.aborted.insert(flight.request_id);
        self.transport.cancel(flight.request_id);
        Some(RequestStep::Finished {
            q: flight.q,
            status: RequestStatus::Aborted,
        })
    }

    pub fn has_pending_timer(&self) -> bool {
        self.debounce.is_armed()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight.as_ref().map(|f| f.request_id)
    }

    pub fn is_aborted(&self, request_id: RequestId) -> bool {
        self.aborted.contains(&request_id)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Fire the debounce timer if due, then drain transport replies.
    pub fn poll(
        &mut self,
        now: Instant,
        options: &Options,
        url: Option<&str>,
    ) -> Vec<RequestStep> {
        let mut steps = Vec::new();
        if let Some(q) = self.debounce.fire(now) {
            self.fire(q, options, url, &mut steps);
        }
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.deliver(reply, options, &mut steps);
        }
        steps
    }

    fn fire(
        &mut self,
        q: String,
        options: &Options,
        url: Option<&str>,
        steps: &mut Vec<RequestStep>,
    ) {
        // The new query supersedes whatever is still on the wire.
        steps.extend(self.abort_in_flight());

        if q.chars().count() < options.min_chars {
            steps.push(RequestStep::MinChars { q });
            return;
        }

        let params = query_params(&options.data, &options.param, &q);
        // No url and no enclosing form: the request goes to "" and fails in
        // the transport.
        let url = url.unwrap_or_default().to_string();

        if let Some(cache) = options.cache.resolve()
            && let Some(payload) = cache.fetch(&q, &params, &url)
        {
            log::debug!(target: "autocomplete.cache", "hit for {q:?}");
            steps.push(RequestStep::CacheHit { q, payload });
            return;
        }

        let request_id = self.next_id;
        self.next_id += 1;
        self.aborted
            .retain(|id| id + ABORTED_WINDOW > request_id);

        log::debug!(target: "autocomplete.request", "request {request_id} for {q:?}");
        steps.push(RequestStep::Dispatched {
            q: q.clone(),
            request_id,
        });
        self.transport.send(
            FetchRequest {
                request_id,
                url: url.clone(),
                params: params.clone(),
            },
            self.reply_tx.clone(),
        );
        self.in_flight = Some(InFlight {
            request_id,
            q,
            params,
            url,
        });
    }

    fn deliver(&mut self, reply: FetchReply, options: &Options, steps: &mut Vec<RequestStep>) {
        if self.aborted.remove(&reply.request_id) {
            log::debug!(
                target: "autocomplete.request",
                "discarding reply for aborted request {}",
                reply.request_id
            );
            return;
        }
        let Some(flight) = self
            .in_flight
            .take_if(|f| f.request_id == reply.request_id)
        else {
            log::trace!(target: "autocomplete.request", "stale reply {}", reply.request_id);
            return;
        };

        match reply.result {
            Ok(payload) => {
                if let Some(cache) = options.cache.resolve() {
                    cache.add(&flight.q, &flight.params, &flight.url, &payload);
                }
                steps.push(RequestStep::Success {
                    q: flight.q.clone(),
                    payload,
                });
                steps.push(RequestStep::Finished {
                    q: flight.q,
                    status: RequestStatus::Success,
                });
            }
            Err(error) => {
                log::debug!(
                    target: "autocomplete.request",
                    "request {} failed: {error}",
                    flight.request_id
                );
                steps.push(RequestStep::Failure {
                    q: flight.q.clone(),
                    error,
                });
                steps.push(RequestStep::Finished {
                    q: flight.q,
                    status: RequestStatus::Error,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheOption, SharedCache};
    use crate::timer::{Clock, ManualClock};
    use net::testing::RecordingTransport;
    use serde_json::json;
    use std::time::Duration;

    struct Rig {
        clock: ManualClock,
        transport: RecordingTransport,
        coord: RequestCoordinator,
        options: Options,
    }

    fn rig(options: Options) -> Rig {
        let transport = RecordingTransport::new();
        Rig {
            clock: ManualClock::new(),
            coord: RequestCoordinator::new(Box::new(transport.clone())),
            transport,
            options,
        }
    }

    impl Rig {
        fn type_q(&mut self, q: &str) {
            self.coord.cancel_pending();
            let due = self.clock.now() + self.options.delay;
            self.coord.schedule(q.to_string(), due);
        }

        fn poll(&mut self) -> Vec<RequestStep> {
            self.coord
                .poll(self.clock.now(), &self.options, Some("/search"))
        }
    }

    fn uncached() -> Options {
        Options::default().with_cache(false)
    }

    #[test]
    fn rapid_keystrokes_collapse_into_one_request() {
        let mut r = rig(uncached().with_min_chars(3));
        for q in ["a", "ab", "abc"] {
            r.type_q(q);
            r.clock.advance_ms(100);
            assert!(r.poll().is_empty());
        }
        r.clock.advance_ms(150);
        let steps = r.poll();

        assert_eq!(
            steps,
            vec![RequestStep::Dispatched {
                q: "abc".into(),
                request_id: 1
            }]
        );
        assert_eq!(r.transport.sent_count(), 1);
        let sent = r.transport.last().unwrap();
        assert_eq!(sent.url, "/search");
        assert_eq!(sent.params, vec![("q".to_string(), "abc".to_string())]);
    }

    #[test]
    fn short_query_reports_min_chars_without_request() {
        let mut r = rig(uncached().with_min_chars(2));
        r.type_q("é");
        r.clock.advance(Duration::from_millis(250));
        assert_eq!(r.poll(), vec![RequestStep::MinChars { q: "é".into() }]);
        assert_eq!(r.transport.sent_count(), 0);
    }

    #[test]
    fn success_is_followed_by_finished() {
        let mut r = rig(uncached());
        r.type_q("ber");
        r.clock.advance_ms(250);
        r.poll();
        r.transport.respond_ok(1, json!(["Berlin"]));

        assert_eq!(
            r.poll(),
            vec![
                RequestStep::Success {
                    q: "ber".into(),
                    payload: json!(["Berlin"])
                },
                RequestStep::Finished {
                    q: "ber".into(),
                    status: RequestStatus::Success
                },
            ]
        );
        assert_eq!(r.coord.in_flight(), None);
    }

    #[test]
    fn real_failure_is_reported() {
        let mut r = rig(uncached());
        r.type_q("ber");
        r.clock.advance_ms(250);
        r.poll();
        r.transport
            .respond_err(1, TransportError::http(502, "Bad Gateway"));

        let steps = r.poll();
        assert!(matches!(
            &steps[0],
            RequestStep::Failure { error, .. } if error.status == Some(502)
        ));
        assert!(matches!(
            &steps[1],
            RequestStep::Finished {
                status: RequestStatus::Error,
                ..
            }
        ));
    }

    #[test]
    fn aborted_reply_never_surfaces() {
        let mut r = rig(uncached());
        r.type_q("ber");
        r.clock.advance_ms(250);
        r.poll();

        let finished = r.coord.cancel_pending();
        assert_eq!(
            finished,
            Some(RequestStep::Finished {
                q: "ber".into(),
                status: RequestStatus::Aborted
            })
        );
        assert!(r.coord.is_aborted(1));
        assert_eq!(r.transport.cancelled(), vec![1]);

        r.transport
            .respond_err(1, TransportError::network("connection reset"));
        assert!(r.poll().is_empty());
        assert!(!r.coord.is_aborted(1));
    }

    #[test]
    fn stale_success_cannot_clobber_newer_request() {
        let mut r = rig(uncached());
        r.type_q("a");
        r.clock.advance_ms(250);
        r.poll();

        r.type_q("ab");
        r.clock.advance_ms(250);
        r.poll();
        assert_eq!(r.coord.in_flight(), Some(2));

        r.transport.respond_ok(1, json!(["old"]));
        r.transport.respond_ok(2, json!(["new"]));
        let steps = r.poll();
        assert_eq!(steps.len(), 2);
        assert_eq!(
            steps[0],
            RequestStep::Success {
                q: "ab".into(),
                payload: json!(["new"])
            }
        );
    }

    #[test]
    fn firing_again_aborts_the_request_on_the_wire() {
        let mut r = rig(uncached());
        r.coord.schedule("a".into(), r.clock.now());
        r.poll();

        r.coord.schedule("ab".into(), r.clock.now());
        let steps = r.poll();
        assert_eq!(
            steps,
            vec![
                RequestStep::Finished {
                    q: "a".into(),
                    status: RequestStatus::Aborted
                },
                RequestStep::Dispatched {
                    q: "ab".into(),
                    request_id: 2
                },
            ]
        );
        assert_eq!(r.transport.cancelled(), vec![1]);
        assert!(r.coord.is_aborted(1));

        r.transport.respond_ok(1, json!(["late"]));
        assert!(r.poll().is_empty());
        assert_eq!(r.coord.in_flight(), Some(2));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut r = rig(uncached());
        assert_eq!(r.coord.cancel_pending(), None);
        r.type_q("abc");
        assert!(r.coord.has_pending_timer());
        assert_eq!(r.coord.cancel_pending(), None);
        assert!(!r.coord.has_pending_timer());
        assert_eq!(r.coord.cancel_pending(), None);
        r.clock.advance_ms(1000);
        assert!(r.poll().is_empty());
    }

    #[test]
    fn second_identical_request_is_served_from_cache() {
        SharedCache::clear();
        let mut r = rig(Options::default().with_cache(CacheOption::Shared));
        r.type_q("ber");
        r.clock.advance_ms(250);
        r.poll();
        r.transport.respond_ok(1, json!(["Berlin"]));
        r.poll();

        r.type_q("ber");
        r.clock.advance_ms(250);
        assert_eq!(
            r.poll(),
            vec![RequestStep::CacheHit {
                q: "ber".into(),
                payload: json!(["Berlin"])
            }]
        );
        assert_eq!(r.transport.sent_count(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        SharedCache::clear();
        let mut r = rig(Options::default());
        r.type_q("ber");
        r.clock.advance_ms(250);
        r.poll();
        r.transport.respond_err(1, TransportError::http(500, "x"));
        r.poll();
        assert!(SharedCache::is_empty());
    }

    #[test]
    fn static_data_rides_along() {
        let mut r = rig(uncached().with_data("limit", "5").with_param("term"));
        r.type_q("x");
        r.clock.advance_ms(250);
        r.poll();
        assert_eq!(
            r.transport.last().unwrap().params,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("term".to_string(), "x".to_string())
            ]
        );
    }
}
