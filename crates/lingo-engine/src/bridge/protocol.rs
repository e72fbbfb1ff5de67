//! Outbound event protocol.
//! Must stay in sync with the page's `protocol.ts`.
//!
//! Every drain produces one JSON document:
//! ```text
//! { "version": 1, "events": [ { "type": "...", ... }, ... ] }
//! ```
//! Events are ordered exactly as the game emitted them.

use serde::Serialize;

use crate::api::types::{SceneKind, ScreenKind};
use crate::content::item::Item;
use crate::core::progress::ProgressCounts;
use crate::core::state::Score;

/// Protocol version written into every batch.
pub const PROTOCOL_VERSION: u32 = 1;

/// Minimal view of a character for the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonView {
    pub name: String,
    pub role: String,
    pub image: Option<String>,
}

/// What the page shows for the active question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionView {
    Mc { prompt: String, options: Vec<String> },
    Typing { prompt: String, hint: Option<String> },
}

/// Session summary shown at the end of play.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub player_name: Option<String>,
    pub elapsed_secs: u64,
    pub words_learned: u32,
    pub minigame: Score,
    pub assessment: Score,
}

/// Events from Rust to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    ScreenChanged {
        screen: ScreenKind,
    },
    ProgressChanged {
        counts: ProgressCounts,
    },
    IntroShown {
        player_name: Option<String>,
    },
    PlayerNamed {
        name: String,
    },
    SceneShown {
        scene: SceneKind,
        items: Vec<Item>,
        person: Option<PersonView>,
    },
    /// The dock shows the selected item's translation.
    DockUpdated {
        item: Item,
        newly_found: bool,
    },
    DockCleared,
    /// A word was added to the player's dictionary.
    DictionaryUpdated {
        english: String,
        french: String,
    },
    DialogueOpened {
        person: PersonView,
        text: Option<String>,
    },
    MinigameShown {
        scene: SceneKind,
        items: Vec<Item>,
        baskets: Vec<String>,
    },
    ItemPlaced {
        item: String,
        basket: String,
        correct: bool,
        placed: usize,
        total: usize,
    },
    MinigameComplete {
        scene: SceneKind,
        correct: usize,
        total: usize,
    },
    QuestionShown {
        number: usize,
        total: usize,
        score: u32,
        question: QuestionView,
    },
    TypingChanged {
        text: String,
    },
    AnswerFeedback {
        correct: bool,
    },
    AssessmentFinished {
        scene: SceneKind,
        score: u32,
        total: usize,
        best: u32,
    },
    SessionShown {
        summary: SessionSummary,
    },
    Error {
        message: String,
    },
}

#[derive(Serialize)]
struct Batch<'a> {
    version: u32,
    events: &'a [OutboundEvent],
}

/// Encode a batch of events for the page.
pub fn encode_events(events: &[OutboundEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Batch {
        version: PROTOCOL_VERSION,
        events,
    })
}
