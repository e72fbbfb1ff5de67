use crate::api::game::{GameConfig, GameContext, Screen};
use crate::api::types::{SceneKind, ScreenKind};
use crate::bridge::protocol::OutboundEvent;
use crate::content::item::ScenePayload;
use crate::content::question::parse_question_bank;
use crate::core::progress::ProgressCounts;
use crate::core::storage::Storage;
use crate::error::GameResult;
use crate::input::queue::InputEvent;
use crate::scenes::assessment::AssessmentScreen;
use crate::scenes::explore::ExploreScreen;
use crate::scenes::intro::IntroScreen;
use crate::scenes::minigame::MinigameScreen;
use crate::scenes::session::SessionScreen;

struct Screens {
    intro: IntroScreen,
    classroom: ExploreScreen,
    classroom_minigame: MinigameScreen,
    restaurant: ExploreScreen,
    restaurant_assessment: AssessmentScreen,
    store: ExploreScreen,
    session: SessionScreen,
}

impl Screens {
    fn new(config: &GameConfig) -> Self {
        Self {
            intro: IntroScreen::new(),
            classroom: ExploreScreen::new(SceneKind::Classroom, ScreenKind::Classroom),
            classroom_minigame: MinigameScreen::new(SceneKind::Classroom, ScreenKind::ClassroomMinigame),
            restaurant: ExploreScreen::new(SceneKind::Restaurant, ScreenKind::Restaurant),
            restaurant_assessment: AssessmentScreen::new(
                SceneKind::Restaurant,
                ScreenKind::RestaurantAssessment,
                config.rng_seed,
            ),
            store: ExploreScreen::new(SceneKind::Store, ScreenKind::Store),
            session: SessionScreen::new(),
        }
    }

    fn get_mut(&mut self, kind: ScreenKind) -> &mut dyn Screen {
        match kind {
            ScreenKind::Intro => &mut self.intro,
            ScreenKind::Classroom => &mut self.classroom,
            ScreenKind::ClassroomMinigame => &mut self.classroom_minigame,
            ScreenKind::Restaurant => &mut self.restaurant,
            ScreenKind::RestaurantAssessment => &mut self.restaurant_assessment,
            ScreenKind::Store => &mut self.store,
            ScreenKind::Session => &mut self.session,
        }
    }

    fn explore_mut(&mut self, scene: SceneKind) -> &mut ExploreScreen {
        match scene {
            SceneKind::Classroom => &mut self.classroom,
            SceneKind::Restaurant => &mut self.restaurant,
            SceneKind::Store => &mut self.store,
        }
    }
}

/// Owns every screen and the shared [`GameContext`], routes input to the
/// active screen and handles navigation between screens.
pub struct LingoGame {
    ctx: GameContext,
    screens: Screens,
    active: Option<ScreenKind>,
}

impl LingoGame {
    pub fn new(config: GameConfig, storage: Box<dyn Storage>) -> Self {
        let screens = Screens::new(&config);
        Self {
            ctx: GameContext::new(config, storage),
            screens,
            active: None,
        }
    }

    /// Load a scene's JSON (`classroomScene.json` or an `items.json`).
    /// The classroom's items also feed its matching minigame. Reloading the
    /// active scene re-enters it so new items are registered and shown.
    pub fn load_scene(&mut self, scene: SceneKind, json: &str) -> GameResult<()> {
        let payload = ScenePayload::from_json(json)?;
        if scene == SceneKind::Classroom {
            self.screens.classroom_minigame.load(payload.items.clone());
        }
        let screen = self.screens.explore_mut(scene);
        screen.load(payload);
        if self.active == Some(screen.kind()) {
            let result = screen.enter(&mut self.ctx);
            self.ctx.flush_progress();
            return result;
        }
        Ok(())
    }

    /// Load the restaurant's `questions.json`.
    pub fn load_questions(&mut self, json: &str) -> GameResult<()> {
        let bank = parse_question_bank(json)?;
        self.screens.restaurant_assessment.load(bank);
        Ok(())
    }

    /// Show the configured start screen.
    pub fn start(&mut self) -> GameResult<()> {
        let start = self.ctx.config().start_screen;
        self.switch_to(start)
    }

    pub fn active(&self) -> Option<ScreenKind> {
        self.active
    }

    /// Make `kind` the active screen. If the new screen cannot be entered
    /// the previous one stays active.
    pub fn switch_to(&mut self, kind: ScreenKind) -> GameResult<()> {
        let result = self.screens.get_mut(kind).enter(&mut self.ctx);
        if result.is_ok() {
            if let Some(prev) = self.active.filter(|p| *p != kind) {
                self.screens.get_mut(prev).leave(&mut self.ctx);
            }
            self.active = Some(kind);
            log::info!("screen: {}", kind.as_str());
            self.ctx.emit(OutboundEvent::ScreenChanged { screen: kind });
        }
        self.ctx.flush_progress();
        result
    }

    /// Route one input event. Navigation is handled here; everything else
    /// goes to the active screen.
    pub fn handle(&mut self, input: &InputEvent) -> GameResult<()> {
        let result = match (input, self.active) {
            (InputEvent::SwitchTo { screen }, _) => return self.switch_to(*screen),
            (_, Some(active)) => self.screens.get_mut(active).handle(&mut self.ctx, input),
            (_, None) => {
                log::debug!("no active screen, dropping {:?}", input);
                Ok(())
            }
        };
        self.ctx.flush_progress();
        result
    }

    /// Advance timers by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> GameResult<()> {
        self.ctx.advance_clock(dt);
        let result = match self.active {
            Some(active) => self.screens.get_mut(active).tick(&mut self.ctx, dt),
            None => Ok(()),
        };
        self.ctx.flush_progress();
        result
    }

    pub fn progress(&self) -> ProgressCounts {
        self.ctx.progress()
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    /// Report an error to the page as an event.
    pub fn report(&mut self, message: String) {
        self.ctx.emit(OutboundEvent::Error { message });
    }

    pub fn drain_events(&mut self) -> Vec<OutboundEvent> {
        self.ctx.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Category;
    use crate::core::storage::MemoryStorage;
    use crate::error::GameError;

    const CLASSROOM: &str = r#"{
        "items": [
            { "name": "pencil", "english": "pencil", "french": "crayon", "image": "p.png", "x": 0, "y": 0 },
            { "name": "book", "english": "book", "french": "livre", "image": "b.png", "x": 0, "y": 0 }
        ],
        "person": { "name": "Camille", "role": "teacher", "dialogue": ["Bonjour !"] }
    }"#;

    const STORE: &str = r#"[
        { "name": "apple", "english": "apple", "french": "la pomme", "image": "a.png", "x": 0, "y": 0 }
    ]"#;

    const QUESTIONS: &str = r#"[
        { "type": "mcq", "question": "Soup?", "options": ["la soupe", "le pain"], "answerIndex": 0 }
    ]"#;

    fn game() -> LingoGame {
        let mut game = LingoGame::new(GameConfig::default(), Box::new(MemoryStorage::new()));
        game.load_scene(SceneKind::Classroom, CLASSROOM).unwrap();
        game.load_scene(SceneKind::Store, STORE).unwrap();
        game.load_questions(QUESTIONS).unwrap();
        game
    }

    fn switch(screen: ScreenKind) -> InputEvent {
        InputEvent::SwitchTo { screen }
    }

    #[test]
    fn start_shows_intro() {
        let mut game = game();
        game.start().unwrap();
        assert_eq!(game.active(), Some(ScreenKind::Intro));
        let events = game.drain_events();
        assert!(events.contains(&OutboundEvent::ScreenChanged { screen: ScreenKind::Intro }));
    }

    #[test]
    fn unloaded_screen_keeps_previous_active() {
        let mut game = game();
        game.start().unwrap();
        let err = game.handle(&switch(ScreenKind::Restaurant)).unwrap_err();
        assert!(matches!(err, GameError::NotLoaded(ScreenKind::Restaurant)));
        assert_eq!(game.active(), Some(ScreenKind::Intro));
    }

    #[test]
    fn progress_is_shared_across_scenes() {
        let mut game = game();
        game.handle(&switch(ScreenKind::Classroom)).unwrap();
        game.handle(&InputEvent::ClickItem { name: "book".into() }).unwrap();
        game.handle(&switch(ScreenKind::Store)).unwrap();
        game.handle(&InputEvent::ClickItem { name: "apple".into() }).unwrap();

        let items = game.progress().get(Category::Items);
        assert_eq!(items.found, 2);
        assert_eq!(items.total, 3);
        assert_eq!(game.context().dictionary().len(), 2);

        let progress_events = game
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, OutboundEvent::ProgressChanged { .. }))
            .count();
        assert!(progress_events >= 2);
    }

    #[test]
    fn classroom_items_feed_the_minigame() {
        let mut game = game();
        game.handle(&switch(ScreenKind::ClassroomMinigame)).unwrap();
        for (item, basket) in [("pencil", "crayon"), ("book", "livre")] {
            game.handle(&InputEvent::DropItem {
                item: item.into(),
                basket: basket.into(),
            })
            .unwrap();
        }
        assert_eq!(game.progress().get(Category::Minigames).found, 1);
    }

    #[test]
    fn assessment_runs_through_ticks() {
        let mut game = game();
        game.handle(&switch(ScreenKind::RestaurantAssessment)).unwrap();
        game.handle(&InputEvent::PickChoice { index: 0 }).unwrap();
        game.tick(2.0).unwrap();

        assert_eq!(game.progress().get(Category::Assessments).found, 1);
        game.handle(&switch(ScreenKind::Session)).unwrap();
        let summary = game.drain_events().into_iter().find_map(|e| match e {
            OutboundEvent::SessionShown { summary } => Some(summary),
            _ => None,
        });
        let summary = summary.unwrap();
        assert_eq!(summary.assessment.score, 1);
        assert_eq!(summary.elapsed_secs, 2);
    }

    #[test]
    fn leaving_assessment_during_feedback_keeps_the_answer() {
        let mut game = game();
        game.handle(&switch(ScreenKind::RestaurantAssessment)).unwrap();
        game.handle(&InputEvent::PickChoice { index: 0 }).unwrap();
        game.tick(0.3).unwrap();
        game.handle(&switch(ScreenKind::Store)).unwrap();
        game.tick(5.0).unwrap();

        assert_eq!(game.progress().get(Category::Assessments).found, 1);
        assert_eq!(game.context().stats().assessment().score, 1);
        assert_eq!(
            game.context().storage().get(crate::core::storage::BEST_SCORE_KEY).as_deref(),
            Some("1")
        );
    }

    #[test]
    fn reloading_active_scene_registers_new_items() {
        let mut game = game();
        game.handle(&switch(ScreenKind::Store)).unwrap();
        let more = r#"[
            { "name": "apple", "english": "apple", "french": "la pomme", "image": "a.png", "x": 0, "y": 0 },
            { "name": "milk", "english": "milk", "french": "le lait", "image": "m.png", "x": 0, "y": 0 }
        ]"#;
        game.load_scene(SceneKind::Store, more).unwrap();
        game.handle(&InputEvent::ClickItem { name: "milk".into() }).unwrap();
        assert!(game.context().tracker().is_found("store:milk", Category::Items));
    }

    #[test]
    fn input_without_active_screen_is_dropped() {
        let mut game = game();
        game.handle(&InputEvent::PickChoice { index: 0 }).unwrap();
        assert!(game.active().is_none());
    }
}
