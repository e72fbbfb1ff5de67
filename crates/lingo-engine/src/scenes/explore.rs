use crate::api::game::{GameContext, Screen};
use crate::api::types::{Category, SceneKind, ScreenKind};
use crate::bridge::protocol::{OutboundEvent, PersonView};
use crate::content::dialogue::Dialogue;
use crate::content::item::{Item, ItemCatalog, Person, ScenePayload};
use crate::error::{GameError, GameResult};
use crate::input::queue::InputEvent;

/// Items of a scene plus the current selection shown in the dock.
pub struct ExploreModel {
    catalog: ItemCatalog,
    person: Option<Person>,
    selected: Option<usize>,
}

impl ExploreModel {
    pub fn new(payload: ScenePayload) -> Self {
        Self {
            catalog: ItemCatalog::new(payload.items),
            person: payload.person,
            selected: None,
        }
    }

    pub fn items(&self) -> &[Item] {
        self.catalog.items()
    }

    pub fn person(&self) -> Option<&Person> {
        self.person.as_ref()
    }

    /// Select an item by name. Unknown names clear the selection.
    pub fn select_item(&mut self, name: &str) -> Option<&Item> {
        self.selected = self.catalog.items().iter().position(|i| i.name == name);
        self.selected_item()
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.selected.map(|i| &self.catalog.items()[i])
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

fn person_view(person: &Person) -> PersonView {
    PersonView {
        name: person.name.clone(),
        role: person.role.clone(),
        image: person.image.clone(),
    }
}

fn opening_line(dialogue: &Dialogue) -> Option<String> {
    match dialogue {
        Dialogue::Linear(_) => dialogue.line(0).map(str::to_string),
        Dialogue::Branching { .. } => dialogue.start().map(|(_, node)| node.text.clone()),
    }
}

/// A clickable scene (classroom, restaurant or store main screen).
///
/// Clicking an item marks `<scene>:<item>` found in the `Items` category,
/// records its translation in the dictionary and updates the dock.
pub struct ExploreScreen {
    scene: SceneKind,
    screen: ScreenKind,
    model: Option<ExploreModel>,
}

impl ExploreScreen {
    pub fn new(scene: SceneKind, screen: ScreenKind) -> Self {
        Self {
            scene,
            screen,
            model: None,
        }
    }

    pub fn load(&mut self, payload: ScenePayload) {
        log::info!("{}: loaded {} items", self.scene.as_str(), payload.items.len());
        self.model = Some(ExploreModel::new(payload));
    }

    pub fn model(&self) -> Option<&ExploreModel> {
        self.model.as_ref()
    }

    fn model_mut(&mut self) -> GameResult<&mut ExploreModel> {
        self.model.as_mut().ok_or(GameError::NotLoaded(self.screen))
    }

    fn person_id(&self, person: &Person) -> String {
        self.scene.item_id(&person.name.to_lowercase())
    }

    fn click_item(&mut self, ctx: &mut GameContext, name: &str) -> GameResult<()> {
        let scene = self.scene;
        let model = self.model_mut()?;
        let Some(item) = model.catalog.get(name).cloned() else {
            model.clear_selection();
            return Err(GameError::UnknownItem(name.to_string()));
        };

        let newly_found = ctx
            .tracker_mut()
            .mark_found(&scene.item_id(&item.name), Category::Items)?;
        model.select_item(name);
        if newly_found {
            ctx.stats_mut().record_word();
        }
        ctx.learn_word(&item.english, &item.french);
        ctx.emit(OutboundEvent::DockUpdated { item, newly_found });
        Ok(())
    }

    fn talk_to(&mut self, ctx: &mut GameContext, name: &str) -> GameResult<()> {
        let person = self
            .model_mut()?
            .person()
            .filter(|p| p.name == name)
            .cloned()
            .ok_or_else(|| GameError::UnknownItem(name.to_string()))?;

        ctx.tracker_mut()
            .mark_found(&self.person_id(&person), Category::People)?;
        ctx.emit(OutboundEvent::DialogueOpened {
            person: person_view(&person),
            text: opening_line(&person.dialogue),
        });
        Ok(())
    }

    /// Forget this scene's discoveries, keeping progress made elsewhere.
    fn reset(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        self.model_mut()?.clear_selection();
        let prefix = format!("{}:", self.scene.as_str());
        let tracker = ctx.tracker_mut();
        tracker.reset_category_matching(Category::Items, |id| id.starts_with(&prefix));
        tracker.reset_category_matching(Category::People, |id| id.starts_with(&prefix));
        ctx.emit(OutboundEvent::DockCleared);
        Ok(())
    }
}

impl Screen for ExploreScreen {
    fn kind(&self) -> ScreenKind {
        self.screen
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let scene = self.scene;
        let model = self.model.as_ref().ok_or(GameError::NotLoaded(self.screen))?;

        let ids: Vec<String> = model.items().iter().map(|i| scene.item_id(&i.name)).collect();
        ctx.tracker_mut().register_items(ids, Category::Items);
        if let Some(person) = model.person() {
            ctx.tracker_mut()
                .register_items([self.person_id(person)], Category::People);
        }

        ctx.emit(OutboundEvent::SceneShown {
            scene,
            items: model.items().to_vec(),
            person: model.person().map(person_view),
        });
        if let Some(item) = model.selected_item() {
            ctx.emit(OutboundEvent::DockUpdated {
                item: item.clone(),
                newly_found: false,
            });
        }
        Ok(())
    }

    fn handle(&mut self, ctx: &mut GameContext, input: &InputEvent) -> GameResult<()> {
        match input {
            InputEvent::ClickItem { name } => self.click_item(ctx, name),
            InputEvent::TalkTo { name } => self.talk_to(ctx, name),
            InputEvent::Reset => self.reset(ctx),
            other => {
                log::debug!("{}: ignoring {:?}", self.scene.as_str(), other);
                Ok(())
            }
        }
    }
}
