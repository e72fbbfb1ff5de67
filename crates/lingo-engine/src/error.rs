use thiserror::Error;

use crate::api::types::{Category, ScreenKind};

/// Errors raised while parsing scene content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dialogue node `{from}` points to missing node `{to}`")]
    DanglingDialogue { from: String, to: String },

    #[error("branching dialogue has no nodes")]
    EmptyDialogue,

    #[error("{0} contains no entries")]
    Empty(&'static str),
}

/// Errors raised by the progress tracker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgressError {
    #[error("id `{id}` was never registered in category `{category}`")]
    Unregistered { id: String, category: Category },
}

/// Errors raised by screens and the game switcher.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error("no item named `{0}`")]
    UnknownItem(String),

    #[error("screen {0:?} has no content loaded")]
    NotLoaded(ScreenKind),

    #[error("no question is waiting for an answer")]
    NoQuestion,

    #[error("current question expects a {expected} answer")]
    WrongAnswerKind { expected: &'static str },

    #[error("choice {choice} is out of range (question has {options} options)")]
    ChoiceOutOfRange { choice: usize, options: usize },

    #[error("Please enter a name")]
    BlankPlayerName,

    #[error("storage error: {0}")]
    Storage(String),
}

pub type GameResult<T> = Result<T, GameError>;
