use crate::api::game::{GameContext, Screen};
use crate::api::types::ScreenKind;
use crate::bridge::protocol::OutboundEvent;
use crate::error::GameResult;
use crate::input::queue::InputEvent;

/// End-of-play summary: time spent, words learned and scores.
/// Recomputed every time the screen is shown.
#[derive(Default)]
pub struct SessionScreen;

impl SessionScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for SessionScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Session
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let summary = ctx.summary();
        ctx.emit(OutboundEvent::SessionShown { summary });
        Ok(())
    }

    fn handle(&mut self, _ctx: &mut GameContext, _input: &InputEvent) -> GameResult<()> {
        Ok(())
    }
}
