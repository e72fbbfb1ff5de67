use std::collections::HashMap;

use crate::error::GameError;

/// Key under which the player's name is stored.
pub const PLAYER_NAME_KEY: &str = "playerName";
/// Key under which the restaurant assessment best score is stored.
pub const BEST_SCORE_KEY: &str = "restaurantBestScore";

/// Plain string key/value persistence (browser `localStorage` on the web).
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError>;
    fn remove(&mut self, key: &str) -> Result<(), GameError>;
}

/// In-memory storage, used natively and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), GameError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut s = MemoryStorage::new();
        assert_eq!(s.get(BEST_SCORE_KEY), None);
        s.set(BEST_SCORE_KEY, "5").unwrap();
        assert_eq!(s.get(BEST_SCORE_KEY).as_deref(), Some("5"));
        s.remove(BEST_SCORE_KEY).unwrap();
        assert_eq!(s.get(BEST_SCORE_KEY), None);
    }
}
