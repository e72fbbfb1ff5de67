pub mod assessment;
pub mod explore;
pub mod intro;
pub mod minigame;
pub mod session;
