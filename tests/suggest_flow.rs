//! A controlled input driving the suggestion dropdown over a fetched model list.

use provider_probe::models::parse_models_from_payload;
use provider_probe::suggest::{Effect, Key, Listener, ModelSuggest, OrdinalCollator, SuggestEvent};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

fn fetched_ids() -> Vec<String> {
    let payload = json!({
        "data": [
            {"id": "gpt-4o-mini"},
            {"id": "GPT-4o"},
            {"id": "claude-3-haiku"},
            {"id": "o1-preview"},
            {"id": "gpt-4o"}
        ]
    });
    parse_models_from_payload(payload)
        .unwrap()
        .into_iter()
        .map(|m| m.id)
        .collect()
}

#[test]
fn test_type_then_pick() {
    let committed = Rc::new(RefCell::new(String::new()));
    let sink = committed.clone();
    let mut widget = ModelSuggest::new(
        "",
        move |v: &str| *sink.borrow_mut() = v.to_string(),
        fetched_ids(),
    );

    // Typing reports the text; the owner echoes it back as the new value.
    let effects = widget.handle(SuggestEvent::InputChanged("gpt-4o".into()));
    assert_eq!(
        effects,
        vec![
            Effect::Subscribe(Listener::PointerDown),
            Effect::Subscribe(Listener::KeyDown)
        ]
    );
    let echoed = committed.borrow().clone();
    assert!(widget.set_value(echoed).is_empty());

    let view = widget.view();
    assert!(view.visible && view.toggle_expanded);
    let order: Vec<_> = view.items.iter().map(|i| i.value.as_str()).collect();
    assert_eq!(
        order,
        vec!["gpt-4o", "GPT-4o", "gpt-4o-mini", "claude-3-haiku", "o1-preview"]
    );
    assert_eq!(view.items[0].score, 3);
    assert_eq!(view.items[1].score, 3);
    assert_eq!(view.items[2].score, 2);
    assert!(view.items[3].muted);
    assert_eq!(view.items[2].highlight, Some(0..6));

    let effects = widget.handle(SuggestEvent::Selected("gpt-4o-mini".into()));
    assert_eq!(
        effects,
        vec![
            Effect::Unsubscribe(Listener::PointerDown),
            Effect::Unsubscribe(Listener::KeyDown),
            Effect::FocusInput
        ]
    );
    assert_eq!(*committed.borrow(), "gpt-4o-mini");
    assert!(!widget.is_open());
}

#[test]
fn test_dismissal_paths() {
    let mut widget = ModelSuggest::new("", |_: &str| {}, fetched_ids());

    widget.handle(SuggestEvent::Focused);
    assert!(widget.handle(SuggestEvent::PointerDown { inside: true }).is_empty());
    assert!(widget
        .handle(SuggestEvent::KeyDown(Key::Other("ArrowDown".into())))
        .is_empty());
    assert!(widget.is_visible());

    assert_eq!(widget.handle(SuggestEvent::KeyDown(Key::Escape)).len(), 2);
    assert!(!widget.is_open());

    widget.handle(SuggestEvent::TogglePressed);
    assert_eq!(
        widget.handle(SuggestEvent::PointerDown { inside: false }).len(),
        2
    );
    assert!(!widget.is_open());

    // Listeners are gone, so stray events change nothing.
    assert!(widget.handle(SuggestEvent::KeyDown(Key::Escape)).is_empty());
}

#[test]
fn test_ordinal_collator_puts_uppercase_first() {
    let widget = ModelSuggest::new("gpt-4o", |_: &str| {}, fetched_ids())
        .with_collator(Arc::new(OrdinalCollator));
    assert_eq!(widget.ranked()[0].value, "GPT-4o");
    assert_eq!(widget.ranked()[1].value, "gpt-4o");
}
