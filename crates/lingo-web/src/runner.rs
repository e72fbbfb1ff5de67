use std::cell::RefCell;
use std::rc::Rc;

use lingo_engine::{
    encode_events, GameConfig, GameResult, InputEvent, InputQueue, LingoGame, ListenerId,
    OutboundEvent, SceneKind, Storage,
};

/// Progress updates waiting for delivery, as (subscription id, counts JSON).
type ProgressOutbox = Rc<RefCell<Vec<(u32, String)>>>;

/// Drives a [`LingoGame`] from the page.
///
/// The page pushes input events at any time; they are applied in order on
/// the next `tick`, together with timers. Outbound events accumulate until
/// the page drains them. Progress subscriptions queue their updates so the
/// page callbacks can run once the runner is no longer borrowed.
pub struct GameRunner {
    game: LingoGame,
    input: InputQueue,
    config: GameConfig,
    initialized: bool,
    progress_outbox: ProgressOutbox,
    subscriptions: Vec<(u32, ListenerId)>,
    next_subscription: u32,
}

impl GameRunner {
    pub fn new(config: GameConfig, storage: Box<dyn Storage>) -> Self {
        Self {
            game: LingoGame::new(config.clone(), storage),
            input: InputQueue::new(),
            config,
            initialized: false,
            progress_outbox: Rc::new(RefCell::new(Vec::new())),
            subscriptions: Vec::new(),
            next_subscription: 1,
        }
    }

    /// Show the start screen. Call once after content is loaded.
    pub fn init(&mut self) {
        let result = self.game.start();
        self.report(result);
        self.initialized = true;
    }

    pub fn load_scene(&mut self, scene: &str, json: &str) {
        let result = match SceneKind::from_name(scene) {
            Some(kind) => self.game.load_scene(kind, json),
            None => {
                self.game.report(format!("unknown scene `{}`", scene));
                return;
            }
        };
        self.report(result);
    }

    pub fn load_questions(&mut self, json: &str) {
        let result = self.game.load_questions(json);
        self.report(result);
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Push an input event in its JSON form.
    pub fn push_input_json(&mut self, json: &str) {
        match InputEvent::from_json(json) {
            Ok(event) => self.push_input(event),
            Err(e) => self.game.report(format!("bad input event: {}", e)),
        }
    }

    /// Apply queued input, then advance timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        for event in self.input.drain() {
            let result = self.game.handle(&event);
            self.report(result);
        }

        let result = self.game.tick(dt);
        self.report(result);
    }

    fn report(&mut self, result: GameResult<()>) {
        if let Err(e) = result {
            log::warn!("{}", e);
            self.game.report(e.to_string());
        }
    }

    /// Take pending outbound events as a JSON batch.
    pub fn drain_events_json(&mut self) -> String {
        let events = self.game.drain_events();
        encode_events(&events).unwrap_or_else(|e| {
            log::error!("failed to encode events: {}", e);
            let fallback = [OutboundEvent::Error { message: e.to_string() }];
            encode_events(&fallback).unwrap_or_default()
        })
    }

    pub fn progress_json(&self) -> String {
        serde_json::to_string(&self.game.progress()).unwrap_or_default()
    }

    /// Every word learned so far, as `[{ "english": .., "french": .. }]`.
    pub fn dictionary_json(&self) -> String {
        serde_json::to_string(self.game.context().dictionary()).unwrap_or_default()
    }

    /// Subscribe to progress changes. The current counts are queued at once,
    /// later changes as they happen; collect them with
    /// [`take_progress_updates`](Self::take_progress_updates).
    pub fn subscribe_progress(&mut self) -> u32 {
        let id = self.next_subscription;
        self.next_subscription += 1;
        let outbox = Rc::clone(&self.progress_outbox);
        let listener = self
            .game
            .context_mut()
            .tracker_mut()
            .on_change(move |counts| match serde_json::to_string(counts) {
                Ok(json) => outbox.borrow_mut().push((id, json)),
                Err(e) => log::error!("failed to encode progress: {}", e),
            });
        self.subscriptions.push((id, listener));
        id
    }

    /// Drop a subscription and any updates still queued for it.
    pub fn unsubscribe_progress(&mut self, id: u32) -> bool {
        let Some(pos) = self.subscriptions.iter().position(|(sub, _)| *sub == id) else {
            return false;
        };
        let (_, listener) = self.subscriptions.remove(pos);
        self.progress_outbox.borrow_mut().retain(|(sub, _)| *sub != id);
        self.game.context_mut().tracker_mut().unsubscribe(listener)
    }

    pub fn take_progress_updates(&mut self) -> Vec<(u32, String)> {
        std::mem::take(&mut *self.progress_outbox.borrow_mut())
    }

    pub fn game(&self) -> &LingoGame {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut LingoGame {
        &mut self.game
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stage_width(&self) -> f32 {
        self.config.stage_width
    }

    pub fn stage_height(&self) -> f32 {
        self.config.stage_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_engine::{Category, MemoryStorage, ScreenKind};

    const STORE: &str = r#"[
        { "name": "apple", "english": "apple", "french": "la pomme", "image": "a.png", "x": 0, "y": 0 }
    ]"#;

    fn runner() -> GameRunner {
        GameRunner::new(GameConfig::default(), Box::new(MemoryStorage::new()))
    }

    #[test]
    fn input_waits_for_tick() {
        let mut r = runner();
        r.load_scene("store", STORE);
        r.init();
        r.push_input(InputEvent::SwitchTo { screen: ScreenKind::Store });
        r.push_input_json(r#"{ "type": "click_item", "name": "apple" }"#);
        assert_eq!(r.game().progress().get(Category::Items).found, 0);

        r.tick(1.0 / 60.0);
        assert_eq!(r.game().progress().get(Category::Items).found, 1);
        assert_eq!(r.game().active(), Some(ScreenKind::Store));
    }

    #[test]
    fn tick_before_init_does_nothing() {
        let mut r = runner();
        r.load_scene("store", STORE);
        r.push_input(InputEvent::SwitchTo { screen: ScreenKind::Store });
        r.tick(1.0);
        assert!(r.game().active().is_none());
        assert!(!r.is_initialized());
    }

    #[test]
    fn errors_become_events() {
        let mut r = runner();
        r.load_scene("garden", STORE);
        r.load_scene("store", "not json");
        r.push_input_json(r#"{ "type": "fly" }"#);

        let batch: serde_json::Value = serde_json::from_str(&r.drain_events_json()).unwrap();
        let events = batch["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e["type"] == "error"));
        assert_eq!(events[0]["message"], "unknown scene `garden`");
    }

    #[test]
    fn progress_updates_wait_in_outbox() {
        let mut r = runner();
        r.load_scene("store", STORE);
        r.init();
        let id = r.subscribe_progress();

        let initial = r.take_progress_updates();
        assert_eq!(initial.len(), 1);
        assert_eq!(initial[0].0, id);

        r.push_input(InputEvent::SwitchTo { screen: ScreenKind::Store });
        r.push_input(InputEvent::ClickItem { name: "apple".into() });
        r.tick(0.0);

        let updates = r.take_progress_updates();
        let last: serde_json::Value = serde_json::from_str(&updates.last().unwrap().1).unwrap();
        assert_eq!(last["categories"]["items"]["found"], 1);
        assert!(r.take_progress_updates().is_empty());
    }

    #[test]
    fn unsubscribe_drops_queued_updates() {
        let mut r = runner();
        r.load_scene("store", STORE);
        r.init();
        let keep = r.subscribe_progress();
        let gone = r.subscribe_progress();
        assert!(r.unsubscribe_progress(gone));
        assert!(!r.unsubscribe_progress(gone));

        let ids: Vec<u32> = r.take_progress_updates().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![keep]);

        r.push_input(InputEvent::SwitchTo { screen: ScreenKind::Store });
        r.tick(0.0);
        assert!(r.take_progress_updates().iter().all(|(id, _)| *id == keep));
    }

    #[test]
    fn dictionary_json_lists_learned_words() {
        let mut r = runner();
        r.load_scene("store", STORE);
        r.init();
        r.push_input(InputEvent::SwitchTo { screen: ScreenKind::Store });
        r.push_input(InputEvent::ClickItem { name: "apple".into() });
        r.tick(0.0);
        let dict: serde_json::Value = serde_json::from_str(&r.dictionary_json()).unwrap();
        assert_eq!(dict, serde_json::json!([{ "english": "apple", "french": "la pomme" }]));
    }

    #[test]
    fn progress_json_has_totals() {
        let mut r = runner();
        r.load_scene("store", STORE);
        r.init();
        r.push_input(InputEvent::SwitchTo { screen: ScreenKind::Store });
        r.tick(0.0);
        let progress: serde_json::Value = serde_json::from_str(&r.progress_json()).unwrap();
        assert_eq!(progress["total"]["total"], 1);
    }
}
