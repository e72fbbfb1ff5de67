use serde::Serialize;

/// One uncovered translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryEntry {
    pub english: String,
    pub french: String,
}

/// Words the player has uncovered, english → french, in discovery order.
/// Serializes as a plain array of entries for the dictionary popup.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a translation. The first translation recorded for a word wins.
    /// Returns true if the word was new.
    pub fn insert(&mut self, english: &str, french: &str) -> bool {
        if self.get(english).is_some() {
            return false;
        }
        self.entries.push(DictionaryEntry {
            english: english.to_string(),
            french: french.to_string(),
        });
        true
    }

    pub fn get(&self, english: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.english == english)
            .map(|e| e.french.as_str())
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A score out of a total, e.g. 5/7 on an assessment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub score: u32,
    pub total: u32,
}

/// Per-session statistics shown on the session summary screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    words_learned: u32,
    minigame: Score,
    assessment: Score,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_word(&mut self) {
        self.words_learned += 1;
    }

    pub fn record_minigame(&mut self, score: u32, total: u32) {
        self.minigame = Score { score, total };
    }

    pub fn record_assessment(&mut self, score: u32, total: u32) {
        self.assessment = Score { score, total };
    }

    pub fn words_learned(&self) -> u32 {
        self.words_learned
    }

    pub fn minigame(&self) -> Score {
        self.minigame
    }

    pub fn assessment(&self) -> Score {
        self.assessment
    }
}
