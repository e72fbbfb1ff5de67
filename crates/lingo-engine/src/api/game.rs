use std::cell::Cell;
use std::rc::Rc;

use crate::api::types::ScreenKind;
use crate::bridge::protocol::{OutboundEvent, SessionSummary};
use crate::core::progress::{ProgressCounts, ProgressTracker};
use crate::core::state::{Dictionary, SessionStats};
use crate::core::storage::{Storage, PLAYER_NAME_KEY};
use crate::core::time::SessionClock;
use crate::error::{GameError, GameResult};
use crate::input::queue::InputEvent;

/// Configuration for the game, provided by the host.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Stage width in pixels (default: 800).
    pub stage_width: f32,
    /// Stage height in pixels (default: 600).
    pub stage_height: f32,
    /// Questions drawn from the bank per assessment round (default: 7).
    pub assessment_size: usize,
    /// Seconds between answer feedback and the next question (default: 1.2).
    pub feedback_delay: f32,
    /// Seed for question shuffling.
    pub rng_seed: u64,
    /// Screen shown by `LingoGame::start`.
    pub start_screen: ScreenKind,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stage_width: 800.0,
            stage_height: 600.0,
            assessment_size: 7,
            feedback_delay: 1.2,
            rng_seed: 42,
            start_screen: ScreenKind::Intro,
        }
    }
}

/// One full-screen area of the game.
pub trait Screen {
    fn kind(&self) -> ScreenKind;

    /// Called every time the screen becomes active.
    fn enter(&mut self, ctx: &mut GameContext) -> GameResult<()>;

    /// Called when another screen replaces this one.
    fn leave(&mut self, _ctx: &mut GameContext) {}

    /// Handle one input event routed to the active screen.
    fn handle(&mut self, ctx: &mut GameContext, input: &InputEvent) -> GameResult<()>;

    /// Per-frame update for timers.
    fn tick(&mut self, _ctx: &mut GameContext, _dt: f32) -> GameResult<()> {
        Ok(())
    }
}

/// Application state shared by every screen, passed by `&mut` into each
/// handler. Holds the progress tracker, the player's dictionary and session
/// stats, persistent storage and the outbound event queue.
pub struct GameContext {
    config: GameConfig,
    tracker: ProgressTracker,
    dictionary: Dictionary,
    stats: SessionStats,
    clock: SessionClock,
    player_name: Option<String>,
    storage: Box<dyn Storage>,
    events: Vec<OutboundEvent>,
    progress_dirty: Rc<Cell<bool>>,
}

impl GameContext {
    pub fn new(config: GameConfig, storage: Box<dyn Storage>) -> Self {
        let mut tracker = ProgressTracker::new();
        let progress_dirty = Rc::new(Cell::new(false));
        let flag = progress_dirty.clone();
        tracker.on_change(move |_| flag.set(true));

        let player_name = storage.get(PLAYER_NAME_KEY).filter(|n| !n.trim().is_empty());

        Self {
            config,
            tracker,
            dictionary: Dictionary::new(),
            stats: SessionStats::new(),
            clock: SessionClock::new(),
            player_name,
            storage,
            events: Vec::new(),
            progress_dirty,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ProgressTracker {
        &mut self.tracker
    }

    pub fn progress(&self) -> ProgressCounts {
        self.tracker.counts()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Record a translation the player uncovered. New words are announced
    /// to the page.
    pub fn learn_word(&mut self, english: &str, french: &str) -> bool {
        let is_new = self.dictionary.insert(english, french);
        if is_new {
            self.events.push(OutboundEvent::DictionaryUpdated {
                english: english.to_string(),
                french: french.to_string(),
            });
        }
        is_new
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut SessionStats {
        &mut self.stats
    }

    pub fn advance_clock(&mut self, dt: f32) {
        self.clock.advance(dt);
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub fn player_name(&self) -> Option<&str> {
        self.player_name.as_deref()
    }

    /// Set and persist the player's name. Blank names are rejected.
    pub fn set_player_name(&mut self, name: &str) -> GameResult<&str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::BlankPlayerName);
        }
        self.storage.set(PLAYER_NAME_KEY, name)?;
        log::info!("player name set to {}", name);
        Ok(self.player_name.insert(name.to_string()).as_str())
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            player_name: self.player_name.clone(),
            elapsed_secs: self.clock.elapsed_secs(),
            words_learned: self.stats.words_learned(),
            minigame: self.stats.minigame(),
            assessment: self.stats.assessment(),
        }
    }

    /// Queue an event for the page.
    pub fn emit(&mut self, event: OutboundEvent) {
        self.events.push(event);
    }

    /// Queue a progress update if the tracker changed since the last flush.
    pub fn flush_progress(&mut self) {
        if self.progress_dirty.replace(false) {
            let counts = self.tracker.counts();
            self.events.push(OutboundEvent::ProgressChanged { counts });
        }
    }

    pub fn drain_events(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[OutboundEvent] {
        &self.events
    }
}
