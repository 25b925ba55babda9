//! `typeahead <endpoint> <query>`: run one search through the widget against a
//! live JSON endpoint and print the rendered rows.

use std::error::Error;
use std::process::ExitCode;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use dom::{Document, elem};
use typeahead::{DomHost, Host, Options, SystemClock, UreqTransport, Widget};
use url::Url;

const GIVE_UP_AFTER: Duration = Duration::from_secs(15);
const IDLE_NAP: Duration = Duration::from_millis(10);

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let (Some(endpoint), Some(query)) = (args.next(), args.next()) else {
        eprintln!("usage: typeahead <endpoint> <query>");
        return ExitCode::from(2);
    };

    match run(&endpoint, &query) {
        Ok(rows) => {
            for row in rows {
                println!("{row}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("typeahead: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(endpoint: &str, query: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let base = Url::parse(endpoint)?;
    let doc = Document::new(vec![elem(
        "form",
        &[("action", base.as_str())],
        vec![elem("input", &[("id", "q")], Vec::new())],
    )]);
    let host = DomHost::new(doc, "q")?;
    let transport = UreqTransport::with_base(Some(base));
    let mut widget = Widget::create(
        host,
        Options::default().with_cache(false),
        Box::new(transport),
        Rc::new(SystemClock),
    )?;

    widget.host_mut().focus_input();
    widget.on_focus();
    widget.host_mut().type_text(query);
    widget.on_keyup();

    let started = Instant::now();
    loop {
        widget.pump();
        let deadline = widget.next_deadline();
        if deadline.is_none() && !widget.is_waiting() {
            break;
        }
        if started.elapsed() > GIVE_UP_AFTER {
            return Err("no reply from endpoint".into());
        }
        let nap = deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_NAP)
            .min(IDLE_NAP);
        thread::sleep(nap);
    }

    let rows = widget.list().rows().iter().map(|r| r.html.clone()).collect();
    widget.destroy();
    Ok(rows)
}
