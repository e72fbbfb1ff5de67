use serde::Deserialize;

use crate::api::types::ScreenKind;

/// Input events the game understands.
/// The page translates clicks, drops and key presses into these.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// An item in a scene was clicked.
    ClickItem { name: String },
    /// A character in a scene was clicked.
    TalkTo { name: String },
    /// A minigame item was dropped onto a basket.
    DropItem { item: String, basket: String },
    /// A multiple-choice option was picked.
    PickChoice { index: usize },
    /// A key was pressed while a typed question is shown.
    /// `key` follows `KeyboardEvent.key` ("a", "Enter", "Backspace", ...).
    Key { key: String },
    /// A complete typed answer, submitted in one go.
    SubmitAnswer { text: String },
    /// Navigate to another screen.
    SwitchTo { screen: ScreenKind },
    /// Name entered on the intro screen.
    SetPlayerName { name: String },
    /// The active screen's reset/restart button.
    Reset,
}

impl InputEvent {
    /// Decode one event from the page's JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A queue of input events.
/// JS writes events into the queue; Rust drains them on the next tick.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    /// Push a new input event (called from JS via wasm-bindgen).
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
