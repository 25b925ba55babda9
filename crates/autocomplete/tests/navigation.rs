mod common;

use std::path::Path;
use std::rc::Rc;

use autocomplete::{Key, Options, Selectable};
use common::rig;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
struct NavigationManifest {
    case: Vec<NavigationCase>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
struct NavigationCase {
    name: String,
    selectable: Vec<bool>,
    #[serde(default)]
    hidden: Vec<usize>,
    #[serde(default = "default_auto_highlight")]
    auto_highlight: bool,
    keys: Vec<String>,
    expect: Option<usize>,
}

fn default_auto_highlight() -> bool {
    true
}

fn load_cases() -> Vec<NavigationCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/navigation.toml");
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let manifest: NavigationManifest = toml::from_str(&content)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));
    manifest.case
}

fn parse_key(name: &str) -> Key {
    match name {
        "up" => Key::Up,
        "down" => Key::Down,
        "home" => Key::Home,
        "end" => Key::End,
        "escape" => Key::Escape,
        other => panic!("unsupported key in fixture: {other}"),
    }
}

fn run(case: &NavigationCase) -> Option<usize> {
    let options = Options::default()
        .with_cache(false)
        .with_auto_highlight(case.auto_highlight)
        .with_selectable(Selectable::Predicate(Rc::new(|item: &Value| {
            item["ok"] == json!(true)
        })));
    let payload: Vec<Value> = case
        .selectable
        .iter()
        .enumerate()
        .map(|(i, ok)| json!({"title": format!("row {i}"), "ok": ok}))
        .collect();

    let mut r = rig(options);
    r.search("r", Value::Array(payload));
    for index in &case.hidden {
        r.widget.set_row_hidden(*index, true);
    }
    for key in &case.keys {
        r.key(parse_key(key));
    }
    r.widget.list().highlighted()
}

#[test]
fn navigation_fixture_cases() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    let failures: Vec<String> = cases
        .iter()
        .filter_map(|case| {
            let got = run(case);
            (got != case.expect).then(|| {
                format!("{}: expected {:?}, got {got:?}", case.name, case.expect)
            })
        })
        .collect();
    assert!(failures.is_empty(), "navigation mismatches:\n{}", failures.join("\n"));
}
