pub mod dialogue;
pub mod item;
pub mod question;
