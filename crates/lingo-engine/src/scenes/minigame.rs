use std::collections::HashMap;

use crate::api::game::{GameContext, Screen};
use crate::api::types::{Category, SceneKind, ScreenKind};
use crate::bridge::protocol::OutboundEvent;
use crate::content::item::{Item, ItemCatalog};
use crate::error::{GameError, GameResult};
use crate::input::queue::InputEvent;

/// Minigame progression, derived from how many items have a basket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigamePhase {
    NotStarted,
    InProgress,
    Complete,
}

/// Drag-each-word-into-its-basket matching game.
///
/// A basket is correct for an item when its label equals the item's
/// french field. Dropping an item again moves it to the new basket.
pub struct MatchingMinigame {
    catalog: ItemCatalog,
    placements: HashMap<String, String>,
}

impl MatchingMinigame {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            catalog: ItemCatalog::new(items),
            placements: HashMap::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        self.catalog.items()
    }

    /// Put an item in a basket. Returns whether the basket is the right one.
    pub fn place_item_in_basket(&mut self, item_name: &str, basket: &str) -> GameResult<bool> {
        let item = self
            .catalog
            .get(item_name)
            .ok_or_else(|| GameError::UnknownItem(item_name.to_string()))?;
        let correct = item.french == basket;
        self.placements.insert(item_name.to_string(), basket.to_string());
        Ok(correct)
    }

    pub fn is_placed(&self, item_name: &str) -> bool {
        self.placements.contains_key(item_name)
    }

    /// Items currently in `basket`, in item order.
    pub fn basket_contents(&self, basket: &str) -> Vec<&Item> {
        self.items()
            .iter()
            .filter(|i| self.placements.get(&i.name).is_some_and(|b| b == basket))
            .collect()
    }

    /// Unique basket labels (the items' french words), in first-seen order.
    pub fn basket_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for item in self.items() {
            if !names.contains(&item.french) {
                names.push(item.french.clone());
            }
        }
        names
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn correct_count(&self) -> usize {
        self.items()
            .iter()
            .filter(|i| self.placements.get(&i.name) == Some(&i.french))
            .count()
    }

    /// True once every item has some basket, right or wrong.
    pub fn all_items_placed(&self) -> bool {
        self.items().iter().all(|i| self.is_placed(&i.name))
    }

    pub fn phase(&self) -> MinigamePhase {
        if self.placements.is_empty() {
            MinigamePhase::NotStarted
        } else if self.all_items_placed() {
            MinigamePhase::Complete
        } else {
            MinigamePhase::InProgress
        }
    }

    pub fn reset(&mut self) {
        self.placements.clear();
    }
}

/// Screen wrapper: reports placements and marks the minigame found in the
/// `Minigames` category when it completes.
pub struct MinigameScreen {
    scene: SceneKind,
    screen: ScreenKind,
    game: Option<MatchingMinigame>,
}

impl MinigameScreen {
    pub fn new(scene: SceneKind, screen: ScreenKind) -> Self {
        Self {
            scene,
            screen,
            game: None,
        }
    }

    pub fn load(&mut self, items: Vec<Item>) {
        self.game = Some(MatchingMinigame::new(items));
    }

    pub fn game(&self) -> Option<&MatchingMinigame> {
        self.game.as_ref()
    }

    fn game_mut(&mut self) -> GameResult<&mut MatchingMinigame> {
        self.game.as_mut().ok_or(GameError::NotLoaded(self.screen))
    }

    fn show(&self, ctx: &mut GameContext) -> GameResult<()> {
        let game = self.game.as_ref().ok_or(GameError::NotLoaded(self.screen))?;
        ctx.emit(OutboundEvent::MinigameShown {
            scene: self.scene,
            items: game.items().to_vec(),
            baskets: game.basket_names(),
        });
        Ok(())
    }

    fn drop_item(&mut self, ctx: &mut GameContext, item: &str, basket: &str) -> GameResult<()> {
        let scene = self.scene;
        let game = self.game_mut()?;
        let was_complete = game.phase() == MinigamePhase::Complete;
        let correct = game.place_item_in_basket(item, basket)?;
        let (placed, total) = (game.placed_count(), game.items().len());
        ctx.emit(OutboundEvent::ItemPlaced {
            item: item.to_string(),
            basket: basket.to_string(),
            correct,
            placed,
            total,
        });

        if !was_complete && game.phase() == MinigamePhase::Complete {
            let correct = game.correct_count();
            log::info!("{} minigame complete: {}/{}", scene.as_str(), correct, total);
            ctx.tracker_mut()
                .mark_found(&scene.minigame_id(), Category::Minigames)?;
            ctx.stats_mut().record_minigame(correct as u32, total as u32);
            ctx.emit(OutboundEvent::MinigameComplete { scene, correct, total });
        }
        Ok(())
    }
}

impl Screen for MinigameScreen {
    fn kind(&self) -> ScreenKind {
        self.screen
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        self.game.as_ref().ok_or(GameError::NotLoaded(self.screen))?;
        ctx.tracker_mut()
            .register_items([self.scene.minigame_id()], Category::Minigames);
        self.show(ctx)
    }

    fn handle(&mut self, ctx: &mut GameContext, input: &InputEvent) -> GameResult<()> {
        match input {
            InputEvent::DropItem { item, basket } => self.drop_item(ctx, item, basket),
            InputEvent::Reset => {
                self.game_mut()?.reset();
                self.show(ctx)
            }
            other => {
                log::debug!("minigame: ignoring {:?}", other);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::GameConfig;
    use crate::content::item::item;
    use crate::core::storage::MemoryStorage;

    fn items() -> Vec<Item> {
        vec![
            item("pencil", "pencil", "crayon"),
            item("book", "book", "livre"),
            item("eraser", "eraser", "gomme"),
        ]
    }

    #[test]
    fn basket_names_follow_french_labels() {
        let game = MatchingMinigame::new(items());
        assert_eq!(game.items().len(), 3);
        assert_eq!(game.basket_names(), vec!["crayon", "livre", "gomme"]);
    }

    #[test]
    fn placing_reports_correctness() {
        let mut game = MatchingMinigame::new(items());

        assert!(game.place_item_in_basket("pencil", "crayon").unwrap());
        assert!(game.is_placed("pencil"));
        assert_eq!(game.basket_contents("crayon")[0].name, "pencil");

        assert!(!game.place_item_in_basket("book", "gomme").unwrap());
        assert!(game.is_placed("book"));
        assert_eq!(game.basket_contents("gomme")[0].name, "book");
        assert_eq!(game.correct_count(), 1);
    }

    #[test]
    fn unknown_item_is_rejected() {
        let mut game = MatchingMinigame::new(items());
        assert!(matches!(
            game.place_item_in_basket("ruler", "crayon"),
            Err(GameError::UnknownItem(_))
        ));
        assert_eq!(game.phase(), MinigamePhase::NotStarted);
    }

    #[test]
    fn moving_an_item_leaves_the_old_basket() {
        let mut game = MatchingMinigame::new(items());
        game.place_item_in_basket("book", "gomme").unwrap();
        game.place_item_in_basket("book", "livre").unwrap();
        assert!(game.basket_contents("gomme").is_empty());
        assert_eq!(game.correct_count(), 1);
        assert_eq!(game.placed_count(), 1);
    }

    #[test]
    fn phases_and_completion_ignore_correctness() {
        let mut game = MatchingMinigame::new(items());
        assert_eq!(game.phase(), MinigamePhase::NotStarted);
        assert!(!game.all_items_placed());

        game.place_item_in_basket("pencil", "livre").unwrap();
        assert_eq!(game.phase(), MinigamePhase::InProgress);

        game.place_item_in_basket("book", "gomme").unwrap();
        game.place_item_in_basket("eraser", "crayon").unwrap();
        assert!(game.all_items_placed());
        assert_eq!(game.phase(), MinigamePhase::Complete);
        assert_eq!(game.correct_count(), 0);
    }

    #[test]
    fn reset_clears_placements() {
        let mut game = MatchingMinigame::new(items());
        game.place_item_in_basket("pencil", "crayon").unwrap();
        game.reset();
        assert!(!game.all_items_placed());
        assert!(game.basket_contents("crayon").is_empty());
    }

    #[test]
    fn screen_marks_minigame_found_on_completion() {
        let mut ctx = GameContext::new(GameConfig::default(), Box::new(MemoryStorage::new()));
        let mut screen = MinigameScreen::new(SceneKind::Classroom, ScreenKind::ClassroomMinigame);
        screen.load(items());
        screen.enter(&mut ctx).unwrap();
        assert_eq!(ctx.progress().get(Category::Minigames).total, 1);

        for (name, basket) in [("pencil", "crayon"), ("book", "livre"), ("eraser", "crayon")] {
            let drop = InputEvent::DropItem {
                item: name.into(),
                basket: basket.into(),
            };
            screen.handle(&mut ctx, &drop).unwrap();
        }

        assert!(ctx.tracker().is_found("classroom:minigame", Category::Minigames));
        assert_eq!(ctx.stats().minigame().score, 2);
        assert_eq!(ctx.stats().minigame().total, 3);
        let completions = ctx
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, OutboundEvent::MinigameComplete { .. }))
            .count();
        assert_eq!(completions, 1);
    }
}
