//! Browser bridge for lingo-engine.
//!
//! The page fetches content JSON itself and passes the text in; input is
//! queued and applied on the next `game_tick`. Outbound events are read with
//! `game_drain_events`, a JSON batch (see `lingo_engine::bridge::protocol`).
//!
//! ```text
//! game_init();
//! game_load_scene("classroom", await (await fetch("/data/classroomScene.json")).text());
//! game_load_questions(await (await fetch("/ItemImage/Restaurant/questions.json")).text());
//! game_start();
//! requestAnimationFrame loop: game_tick(dt); render(JSON.parse(game_drain_events()));
//! ```

pub mod runner;
pub mod storage;

pub use runner::GameRunner;
pub use storage::LocalStorage;

use std::cell::RefCell;

use lingo_engine::{Category, GameConfig, InputEvent, MemoryStorage, ScreenKind, Storage};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<GameRunner>> = RefCell::new(None);
    static PROGRESS_CALLBACKS: RefCell<Vec<(u32, js_sys::Function)>> = RefCell::new(Vec::new());
}

fn with_runner<R>(f: impl FnOnce(&mut GameRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(runner) => Some(f(runner)),
            None => {
                log::warn!("game not initialized, call game_init() first");
                None
            }
        }
    })
}

/// Hand queued progress updates to the page callbacks. No borrow is held
/// while a callback runs, so callbacks may call back into the game.
fn deliver_progress() {
    let updates = RUNNER
        .with(|cell| cell.borrow_mut().as_mut().map(GameRunner::take_progress_updates))
        .unwrap_or_default();
    for (id, json) in updates {
        let callback = PROGRESS_CALLBACKS.with(|cbs| {
            cbs.borrow()
                .iter()
                .find(|(cid, _)| *cid == id)
                .map(|(_, f)| f.clone())
        });
        let Some(callback) = callback else {
            continue;
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log::warn!("progress listener threw: {:?}", e);
        }
    }
}

#[wasm_bindgen]
pub fn game_init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let storage: Box<dyn Storage> = match LocalStorage::open() {
        Some(local) => Box::new(local),
        None => {
            log::warn!("localStorage unavailable, progress will not persist");
            Box::new(MemoryStorage::new())
        }
    };
    let config = GameConfig {
        rng_seed: (js_sys::Math::random() * u64::MAX as f64) as u64,
        ..GameConfig::default()
    };

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(GameRunner::new(config, storage));
    });
    PROGRESS_CALLBACKS.with(|cbs| cbs.borrow_mut().clear());
    log::info!("lingo: initialized");
}

/// Show the start screen once content is loaded.
#[wasm_bindgen]
pub fn game_start() {
    with_runner(|r| r.init());
    deliver_progress();
}

#[wasm_bindgen]
pub fn game_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
    deliver_progress();
}

// ---- Content ----

/// `scene` is "classroom", "restaurant" or "store".
#[wasm_bindgen]
pub fn game_load_scene(scene: &str, json: &str) {
    with_runner(|r| r.load_scene(scene, json));
    deliver_progress();
}

#[wasm_bindgen]
pub fn game_load_questions(json: &str) {
    with_runner(|r| r.load_questions(json));
}

// ---- Input ----

#[wasm_bindgen]
pub fn game_click_item(name: &str) {
    with_runner(|r| r.push_input(InputEvent::ClickItem { name: name.to_string() }));
}

#[wasm_bindgen]
pub fn game_talk_to(name: &str) {
    with_runner(|r| r.push_input(InputEvent::TalkTo { name: name.to_string() }));
}

#[wasm_bindgen]
pub fn game_drop_item(item: &str, basket: &str) {
    with_runner(|r| {
        r.push_input(InputEvent::DropItem {
            item: item.to_string(),
            basket: basket.to_string(),
        })
    });
}

#[wasm_bindgen]
pub fn game_pick_choice(index: u32) {
    with_runner(|r| r.push_input(InputEvent::PickChoice { index: index as usize }));
}

/// `key` is `KeyboardEvent.key`.
#[wasm_bindgen]
pub fn game_key(key: &str) {
    with_runner(|r| r.push_input(InputEvent::Key { key: key.to_string() }));
}

#[wasm_bindgen]
pub fn game_submit_answer(text: &str) {
    with_runner(|r| r.push_input(InputEvent::SubmitAnswer { text: text.to_string() }));
}

#[wasm_bindgen]
pub fn game_switch_to(screen: &str) {
    with_runner(|r| match ScreenKind::from_name(screen) {
        Some(screen) => r.push_input(InputEvent::SwitchTo { screen }),
        None => log::warn!("unknown screen `{}`", screen),
    });
}

#[wasm_bindgen]
pub fn game_set_player_name(name: &str) {
    with_runner(|r| r.push_input(InputEvent::SetPlayerName { name: name.to_string() }));
}

#[wasm_bindgen]
pub fn game_reset() {
    with_runner(|r| r.push_input(InputEvent::Reset));
}

/// Any input event in its JSON form, e.g. `{"type":"click_item","name":"book"}`.
#[wasm_bindgen]
pub fn game_input(json: &str) {
    with_runner(|r| r.push_input_json(json));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn game_drain_events() -> String {
    with_runner(|r| r.drain_events_json()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn game_progress() -> String {
    with_runner(|r| r.progress_json()).unwrap_or_default()
}

/// Learned words as `[{ "english": .., "french": .. }]`, for the dictionary popup.
#[wasm_bindgen]
pub fn game_dictionary() -> String {
    with_runner(|r| r.dictionary_json()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn game_found(category: &str) -> u32 {
    Category::from_name(category)
        .and_then(|c| with_runner(|r| r.game().progress().get(c).found as u32))
        .unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_stage_width() -> f32 {
    with_runner(|r| r.stage_width()).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_stage_height() -> f32 {
    with_runner(|r| r.stage_height()).unwrap_or(0.0)
}

// ---- Progress subscription ----

/// Call `callback(countsJson)` now and after every progress change.
/// Returns an id for `game_off_progress`, or 0 before `game_init`.
#[wasm_bindgen]
pub fn game_on_progress(callback: js_sys::Function) -> u32 {
    let Some(id) = with_runner(|r| r.subscribe_progress()) else {
        return 0;
    };
    PROGRESS_CALLBACKS.with(|cbs| cbs.borrow_mut().push((id, callback)));
    deliver_progress();
    id
}

#[wasm_bindgen]
pub fn game_off_progress(id: u32) -> bool {
    PROGRESS_CALLBACKS.with(|cbs| cbs.borrow_mut().retain(|(cid, _)| *cid != id));
    with_runner(|r| r.unsubscribe_progress(id)).unwrap_or(false)
}
