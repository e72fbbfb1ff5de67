pub mod api;
pub mod bridge;
pub mod content;
pub mod core;
pub mod error;
pub mod input;
pub mod scenes;

// Re-export key types at crate root for convenience
pub use api::game::{GameConfig, GameContext, Screen};
pub use api::types::{Category, SceneKind, ScreenKind};
pub use bridge::protocol::{encode_events, OutboundEvent, PROTOCOL_VERSION};
pub use content::dialogue::{Dialogue, DialogueNode, Reply};
pub use content::item::{Item, ItemCatalog, Person, ScenePayload};
pub use content::question::{parse_question_bank, McProblem, Question, TypingProblem};
pub use self::core::progress::{CategoryCount, ListenerId, ProgressCounts, ProgressTracker};
pub use self::core::rng::Rng;
pub use self::core::state::{Dictionary, DictionaryEntry, Score, SessionStats};
pub use self::core::storage::{MemoryStorage, Storage, BEST_SCORE_KEY, PLAYER_NAME_KEY};
pub use self::core::switcher::LingoGame;
pub use self::core::time::{Delay, SessionClock};
pub use error::{ContentError, GameError, GameResult, ProgressError};
pub use input::queue::{InputEvent, InputQueue};
pub use scenes::assessment::{Assessment, AssessmentScreen};
pub use scenes::explore::{ExploreModel, ExploreScreen};
pub use scenes::minigame::{MatchingMinigame, MinigamePhase, MinigameScreen};
