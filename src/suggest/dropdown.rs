//! Headless dropdown for [`ModelSuggest`].
//!
//! The text value is owned by the caller. The engine reports edits and
//! selections through the `on_change` callback and expects the caller to feed
//! the new value back with [`ModelSuggest::set_value`], the same way a
//! controlled input works.
//!
//! Global listeners (pointer-down for outside clicks, key-down for Escape)
//! exist only while the dropdown is visible. Entering and leaving that state
//! is reported as [`Effect::Subscribe`] / [`Effect::Unsubscribe`].

use super::collate::{Collator, EnUsCollator};
use super::{highlight, rank, ScoredCandidate};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    PointerDown,
    KeyDown,
}

const LISTENERS: [Listener; 2] = [Listener::PointerDown, Listener::KeyDown];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestEvent {
    /// The user edited the text field.
    InputChanged(String),
    /// The text field gained focus.
    Focused,
    /// The chevron toggle was pressed.
    TogglePressed,
    /// A rendered item was clicked.
    Selected(String),
    /// Pointer-down anywhere in the document.
    PointerDown { inside: bool },
    /// Key-down anywhere in the document.
    KeyDown(Key),
}

/// Side effects the host must perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Subscribe(Listener),
    Unsubscribe(Listener),
    FocusInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestItem {
    pub value: String,
    pub score: u8,
    pub muted: bool,
    /// Byte range of `value` to emphasize.
    pub highlight: Option<Range<usize>>,
}

/// Everything needed to render the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestView {
    pub visible: bool,
    /// The toggle control only exists when there is something to list.
    pub show_toggle: bool,
    pub toggle_expanded: bool,
    pub items: Vec<SuggestItem>,
}

pub struct ModelSuggest<F> {
    value: String,
    candidates: Vec<String>,
    on_change: F,
    collator: Arc<dyn Collator>,
    state: DropdownState,
    ranked: Vec<ScoredCandidate>,
    subscribed: bool,
}

impl<F> ModelSuggest<F>
where
    F: FnMut(&str),
{
    pub fn new(value: impl Into<String>, on_change: F, candidates: Vec<String>) -> Self {
        let mut this = Self {
            value: value.into(),
            candidates,
            on_change,
            collator: Arc::new(EnUsCollator),
            state: DropdownState::Closed,
            ranked: Vec::new(),
            subscribed: false,
        };
        this.rerank();
        this
    }

    pub fn with_collator(mut self, collator: Arc<dyn Collator>) -> Self {
        self.collator = collator;
        self.rerank();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DropdownState::Open
    }

    /// An open dropdown with nothing to list is not shown.
    pub fn is_visible(&self) -> bool {
        self.is_open() && !self.ranked.is_empty()
    }

    pub fn ranked(&self) -> &[ScoredCandidate] {
        &self.ranked
    }

    /// The caller's value changed.
    pub fn set_value(&mut self, value: impl Into<String>) -> Vec<Effect> {
        self.value = value.into();
        self.rerank();
        self.sync_listeners()
    }

    pub fn set_candidates(&mut self, candidates: Vec<String>) -> Vec<Effect> {
        self.candidates = candidates;
        self.rerank();
        self.sync_listeners()
    }

    pub fn handle(&mut self, event: SuggestEvent) -> Vec<Effect> {
        match event {
            SuggestEvent::InputChanged(text) => {
                (self.on_change)(&text);
                self.state = DropdownState::Open;
                self.sync_listeners()
            }
            SuggestEvent::Focused => {
                self.state = DropdownState::Open;
                self.sync_listeners()
            }
            SuggestEvent::TogglePressed => {
                if self.ranked.is_empty() {
                    return Vec::new();
                }
                self.state = match self.state {
                    DropdownState::Closed => DropdownState::Open,
                    DropdownState::Open => DropdownState::Closed,
                };
                self.sync_listeners()
            }
            SuggestEvent::Selected(item) => {
                if !self.is_visible() {
                    return Vec::new();
                }
                (self.on_change)(&item);
                self.state = DropdownState::Closed;
                let mut effects = self.sync_listeners();
                effects.push(Effect::FocusInput);
                effects
            }
            SuggestEvent::PointerDown { inside } => {
                if !self.subscribed || inside {
                    return Vec::new();
                }
                self.state = DropdownState::Closed;
                self.sync_listeners()
            }
            SuggestEvent::KeyDown(key) => {
                if !self.subscribed || key != Key::Escape {
                    return Vec::new();
                }
                self.state = DropdownState::Closed;
                self.sync_listeners()
            }
        }
    }

    pub fn view(&self) -> SuggestView {
        let visible = self.is_visible();
        let items = if visible {
            self.ranked
                .iter()
                .map(|c| SuggestItem {
                    value: c.value.clone(),
                    score: c.score,
                    muted: c.is_muted(),
                    highlight: highlight(&c.value, &self.value),
                })
                .collect()
        } else {
            Vec::new()
        };
        SuggestView {
            visible,
            show_toggle: !self.ranked.is_empty(),
            toggle_expanded: visible,
            items,
        }
    }

    fn rerank(&mut self) {
        self.ranked = rank(&self.candidates, &self.value, self.collator.as_ref());
    }

    fn sync_listeners(&mut self) -> Vec<Effect> {
        let visible = self.is_visible();
        if visible == self.subscribed {
            return Vec::new();
        }
        self.subscribed = visible;
        LISTENERS
            .iter()
            .map(|&l| {
                if visible {
                    Effect::Subscribe(l)
                } else {
                    Effect::Unsubscribe(l)
                }
            })
            .collect()
    }
}
