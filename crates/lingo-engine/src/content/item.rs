use serde::{Deserialize, Serialize};

use crate::content::dialogue::Dialogue;
use crate::error::ContentError;

/// A vocabulary entry placed somewhere in a scene.
/// Loaded from JSON and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Lookup key, unique within a scene (e.g. "pencil").
    pub name: String,
    pub english: String,
    pub french: String,
    #[serde(default)]
    pub phonetic: String,
    /// Relative image path, resolved by the page.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Optional draw size; the page falls back to its default image size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f32>,
}

/// A character the player can talk to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub dialogue: Dialogue,
}

/// Payload of a full scene file such as `classroomScene.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenePayload {
    pub items: Vec<Item>,
    #[serde(default)]
    pub person: Option<Person>,
}

impl ScenePayload {
    /// Parse either a `{items, person}` object or a bare item array
    /// (the per-scene `items.json` files).
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Scene(ScenePayload),
            Items(Vec<Item>),
        }

        let payload = match serde_json::from_str::<Raw>(json) {
            Ok(Raw::Scene(scene)) => scene,
            Ok(Raw::Items(items)) => ScenePayload { items, person: None },
            // Re-parse strictly so the error names the real problem.
            Err(_) => serde_json::from_str::<ScenePayload>(json)?,
        };
        if payload.items.is_empty() {
            return Err(ContentError::Empty("scene"));
        }
        if let Some(person) = &payload.person {
            person.dialogue.validate()?;
        }
        Ok(payload)
    }
}

/// Items of one scene with name-based lookup.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Look up an item by name. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

#[cfg(test)]
pub(crate) fn item(name: &str, english: &str, french: &str) -> Item {
    Item {
        name: name.into(),
        english: english.into(),
        french: french.into(),
        phonetic: String::new(),
        image: format!("{}.png", name),
        x: 0.0,
        y: 0.0,
        w: None,
        h: None,
    }
}
