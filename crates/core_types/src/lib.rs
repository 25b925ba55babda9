pub type InstanceId = u64;
pub type RequestId = u64;

/// One result entry as returned by the remote endpoint.
///
/// Items are opaque: only the configured formatting and comparison hooks look
/// inside them.
pub type Item = serde_json::Value;

/// Ordered query-string pairs. Order is preserved on the wire and in cache keys.
pub type Params = Vec<(String, String)>;

/// Keys the widget reacts to on `keydown`. Everything else is `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Home,
    End,
    Enter,
    Tab,
    Escape,
    Other,
}

/// Build the request parameters: the static `data` pairs in order, with `param`
/// set to `q` (replacing a same-named entry, otherwise appended last).
pub fn query_params(data: &[(String, String)], param: &str, q: &str) -> Params {
    let mut params: Params = data.to_vec();
    match params.iter_mut().find(|(k, _)| k == param) {
        Some((_, v)) => *v = q.to_string(),
        None => params.push((param.to_string(), q.to_string())),
    }
    params
}

/// Display text of an item: a string item itself, otherwise its `title` or
/// `name` field.
pub fn item_label(item: &Item) -> Option<&str> {
    match item {
        Item::String(s) => Some(s.as_str()),
        Item::Object(map) => ["title", "name"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Item::as_str).filter(|s| !s.is_empty())),
        _ => None,
    }
}
