use serde::Deserialize;

use crate::error::ContentError;

/// A multiple-choice problem.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McProblem {
    pub question: String,
    pub options: Vec<String>,
    pub answer_index: usize,
}

/// A free-text problem. Answers are compared trimmed and case-insensitively.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypingProblem {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub hint: Option<String>,
}

impl TypingProblem {
    pub fn accepts(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }
}

/// One assessment question, tagged by `"type"` in `questions.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "mcq")]
    Mc(McProblem),
    #[serde(rename = "type")]
    Typing(TypingProblem),
}

impl Question {
    pub fn prompt(&self) -> &str {
        match self {
            Question::Mc(p) => &p.question,
            Question::Typing(p) => &p.question,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Question::Mc(_) => "multiple-choice",
            Question::Typing(_) => "typed",
        }
    }
}

/// Parse a question bank. Multiple-choice entries whose answer index is out
/// of range are skipped with a warning rather than failing the whole bank.
pub fn parse_question_bank(json: &str) -> Result<Vec<Question>, ContentError> {
    let all: Vec<Question> = serde_json::from_str(json)?;
    let loaded = all.len();
    let questions: Vec<Question> = all
        .into_iter()
        .filter(|q| match q {
            Question::Mc(p) => p.answer_index < p.options.len(),
            Question::Typing(_) => true,
        })
        .collect();
    if questions.len() != loaded {
        log::warn!(
            "question bank: skipped {} question(s) with an invalid answer index",
            loaded - questions.len()
        );
    }
    if questions.is_empty() {
        return Err(ContentError::Empty("question bank"));
    }
    Ok(questions)
}

#[cfg(test)]
pub(crate) fn mc(question: &str, options: &[&str], answer_index: usize) -> Question {
    Question::Mc(McProblem {
        question: question.into(),
        options: options.iter().map(|o| o.to_string()).collect(),
        answer_index,
    })
}

#[cfg(test)]
pub(crate) fn typing(question: &str, answer: &str) -> Question {
    Question::Typing(TypingProblem {
        question: question.into(),
        answer: answer.into(),
        hint: None,
    })
}
