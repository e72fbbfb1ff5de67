use serde::{Deserialize, Serialize};
use std::fmt;

/// Tracker bucket. Ids are deduplicated independently within each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Items,
    People,
    Minigames,
    Assessments,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Items,
        Category::People,
        Category::Minigames,
        Category::Assessments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Items => "items",
            Category::People => "people",
            Category::Minigames => "minigames",
            Category::Assessments => "assessments",
        }
    }

    /// Parse a category name as used by the page (`"items"`, `"people"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three explorable locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    Classroom,
    Restaurant,
    Store,
}

impl SceneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SceneKind::Classroom => "classroom",
            SceneKind::Restaurant => "restaurant",
            SceneKind::Store => "store",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "classroom" => Some(SceneKind::Classroom),
            "restaurant" => Some(SceneKind::Restaurant),
            "store" => Some(SceneKind::Store),
            _ => None,
        }
    }

    /// Tracker id for an item in this scene, e.g. `store:apple`.
    pub fn item_id(self, item_name: &str) -> String {
        format!("{}:{}", self.as_str(), item_name)
    }

    /// Tracker id for this scene's minigame.
    pub fn minigame_id(self) -> String {
        format!("{}:minigame", self.as_str())
    }

    /// Tracker id for this scene's assessment.
    pub fn assessment_id(self) -> String {
        format!("{}:assessment", self.as_str())
    }
}

/// Every full-screen area the player can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScreenKind {
    Intro,
    Classroom,
    ClassroomMinigame,
    Restaurant,
    RestaurantAssessment,
    Store,
    Session,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 7] = [
        ScreenKind::Intro,
        ScreenKind::Classroom,
        ScreenKind::ClassroomMinigame,
        ScreenKind::Restaurant,
        ScreenKind::RestaurantAssessment,
        ScreenKind::Store,
        ScreenKind::Session,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScreenKind::Intro => "Intro",
            ScreenKind::Classroom => "Classroom",
            ScreenKind::ClassroomMinigame => "ClassroomMinigame",
            ScreenKind::Restaurant => "Restaurant",
            ScreenKind::RestaurantAssessment => "RestaurantAssessment",
            ScreenKind::Store => "Store",
            ScreenKind::Session => "Session",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}
