//! Result caching.
//!
//! The cache is a capability (`add` + `fetch`). `CacheOption::Shared` selects
//! the built-in store shared by every widget on the UI thread; hosts can plug
//! in their own with `CacheOption::Custom`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use core_types::Params;
use net::request_signature;
use serde_json::Value;

pub trait ResultCache {
    fn add(&self, q: &str, params: &Params, url: &str, payload: &Value);
    fn fetch(&self, q: &str, params: &Params, url: &str) -> Option<Value>;
}

thread_local! {
    static SHARED: RefCell<HashMap<String, Value>> = RefCell::new(HashMap::new());
}

/// Unbounded store keyed by the request signature, shared by all widgets on
/// this thread. Entries are never evicted; last write wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct SharedCache;

impl SharedCache {
    pub fn len() -> usize {
        SHARED.with(|c| c.borrow().len())
    }

    pub fn is_empty() -> bool {
        Self::len() == 0
    }

    pub fn clear() {
        SHARED.with(|c| c.borrow_mut().clear());
    }
}

impl ResultCache for SharedCache {
    fn add(&self, _q: &str, params: &Params, url: &str, payload: &Value) {
        let key = request_signature(url, params);
        log::trace!(target: "autocomplete.cache", "store {key}");
        SHARED.with(|c| c.borrow_mut().insert(key, payload.clone()));
    }

    fn fetch(&self, _q: &str, params: &Params, url: &str) -> Option<Value> {
        let key = request_signature(url, params);
        SHARED.with(|c| c.borrow().get(&key).cloned())
    }
}

#[derive(Clone, Default)]
pub enum CacheOption {
    Disabled,
    #[default]
    Shared,
    Custom(Rc<dyn ResultCache>),
}

impl CacheOption {
    /// The cache to consult, if caching is on.
    pub fn resolve(&self) -> Option<Rc<dyn ResultCache>> {
        match self {
            CacheOption::Disabled => None,
            CacheOption::Shared => Some(Rc::new(SharedCache)),
            CacheOption::Custom(cache) => Some(Rc::clone(cache)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, CacheOption::Disabled)
    }
}

impl From<bool> for CacheOption {
    fn from(enabled: bool) -> Self {
        if enabled {
            CacheOption::Shared
        } else {
            CacheOption::Disabled
        }
    }
}

impl fmt::Debug for CacheOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOption::Disabled => f.write_str("Disabled"),
            CacheOption::Shared => f.write_str("Shared"),
            CacheOption::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(q: &str) -> Params {
        vec![("q".to_string(), q.to_string())]
    }

    #[test]
    fn shared_cache_is_keyed_by_url_and_params() {
        SharedCache::clear();
        let cache = SharedCache;
        cache.add("ber", &params("ber"), "/cities", &json!(["Berlin"]));

        assert_eq!(cache.fetch("ber", &params("ber"), "/cities"), Some(json!(["Berlin"])));
        assert_eq!(cache.fetch("ber", &params("ber"), "/towns"), None);
        assert_eq!(cache.fetch("bern", &params("bern"), "/cities"), None);
    }

    #[test]
    fn shared_cache_spans_instances() {
        SharedCache::clear();
        let a = CacheOption::Shared.resolve().unwrap();
        let b = CacheOption::from(true).resolve().unwrap();
        a.add("x", &params("x"), "/s", &json!([1]));
        assert_eq!(b.fetch("x", &params("x"), "/s"), Some(json!([1])));
        assert_eq!(SharedCache::len(), 1);
    }

    #[test]
    fn last_write_wins() {
        SharedCache::clear();
        SharedCache.add("x", &params("x"), "/s", &json!([1]));
        SharedCache.add("x", &params("x"), "/s", &json!([2]));
        assert_eq!(SharedCache.fetch("x", &params("x"), "/s"), Some(json!([2])));
    }

    #[test]
    fn disabled_resolves_to_none() {
        assert!(CacheOption::from(false).resolve().is_none());
        assert!(!CacheOption::Disabled.is_enabled());
    }

    #[test]
    fn custom_cache_is_used_as_is() {
        #[derive(Default)]
        struct Fixed;
        impl ResultCache for Fixed {
            fn add(&self, _: &str, _: &Params, _: &str, _: &Value) {}
            fn fetch(&self, q: &str, _: &Params, _: &str) -> Option<Value> {
                Some(json!([q]))
            }
        }

        let cache = CacheOption::Custom(Rc::new(Fixed)).resolve().unwrap();
        assert_eq!(cache.fetch("abc", &params("abc"), "/s"), Some(json!(["abc"])));
    }
}
