pub mod progress;
pub mod rng;
pub mod state;
pub mod storage;
pub mod switcher;
pub mod time;
