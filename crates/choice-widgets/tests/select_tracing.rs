#![forbid(unsafe_code)]

//! Structured log events emitted by the controller and the store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use choice_core::event::{KeyCode, KeyEvent};
use choice_widgets::{OptionRecord, SelectConfig, SelectController, StructuralChange};
use tracing::Subscriber;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use web_time::Instant;

#[derive(Default)]
struct SelectTraceState {
    messages: Vec<String>,
    typeahead_queries: Vec<String>,
}

struct SelectTraceCapture {
    state: Arc<Mutex<SelectTraceState>>,
}

impl<S> Layer<S> for SelectTraceCapture
where
    S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        #[derive(Default)]
        struct Fields {
            message: Option<String>,
            query: Option<String>,
        }
        impl tracing::field::Visit for Fields {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                match field.name() {
                    "message" => self.message = Some(value.to_string()),
                    "query" => self.query = Some(value.to_string()),
                    _ => {}
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut fields = Fields::default();
        event.record(&mut fields);
        let mut state = self.state.lock().expect("select trace lock");
        if let Some(query) = fields.query {
            state.typeahead_queries.push(query);
        }
        if let Some(message) = fields.message {
            state.messages.push(message);
        }
    }
}

fn capture() -> (Arc<Mutex<SelectTraceState>>, tracing::subscriber::DefaultGuard) {
    let state = Arc::new(Mutex::new(SelectTraceState::default()));
    let subscriber = tracing_subscriber::registry().with(SelectTraceCapture {
        state: Arc::clone(&state),
    });
    let guard = tracing::subscriber::set_default(subscriber);
    (state, guard)
}

#[test]
fn controller_logs_lifecycle_and_selection() {
    let (state, _guard) = capture();
    let now = Instant::now();
    let options = ["Apple", "Banana", "Blueberry"]
        .into_iter()
        .map(OptionRecord::from)
        .collect();
    let mut select: SelectController =
        SelectController::new(SelectConfig::select(), options)
            .with_dispatcher(choice_widgets::dispatcher::shared());

    select.handle_key(&KeyEvent::new(KeyCode::Char('b')), now);
    select.handle_key(&KeyEvent::new(KeyCode::Char('l')), now);
    select.handle_key(&KeyEvent::new(KeyCode::Enter), now);

    let snapshot = state.lock().expect("select trace lock");
    let position = |name: &str| {
        snapshot
            .messages
            .iter()
            .position(|message| message == name)
            .unwrap_or_else(|| panic!("expected {name} in {:?}", snapshot.messages))
    };
    assert!(position("select.open") < position("select.typeahead"));
    assert!(position("select.selection") < position("select.close"));
    assert_eq!(snapshot.typeahead_queries, vec!["b", "bl"]);
}

#[test]
fn store_logs_rebuilds() {
    let (state, _guard) = capture();
    let now = Instant::now();
    let mut listbox: SelectController = SelectController::new(SelectConfig::listbox(), Vec::new());
    listbox.notify_structure_changed(
        StructuralChange::Added {
            index: 0,
            option: OptionRecord::new("Apple"),
        },
        now,
    );
    assert!(state.lock().expect("select trace lock").messages.is_empty());

    listbox.tick(now + Duration::from_millis(5));
    let snapshot = state.lock().expect("select trace lock");
    assert_eq!(snapshot.messages, vec!["select.rebuild"]);
}
