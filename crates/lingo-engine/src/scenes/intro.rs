use crate::api::game::{GameContext, Screen};
use crate::api::types::ScreenKind;
use crate::bridge::protocol::OutboundEvent;
use crate::error::GameResult;
use crate::input::queue::InputEvent;

/// Title screen: asks for the player's name and offers the three scenes.
#[derive(Default)]
pub struct IntroScreen;

impl IntroScreen {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for IntroScreen {
    fn kind(&self) -> ScreenKind {
        ScreenKind::Intro
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let player_name = ctx.player_name().map(str::to_string);
        ctx.emit(OutboundEvent::IntroShown { player_name });
        Ok(())
    }

    fn handle(&mut self, ctx: &mut GameContext, input: &InputEvent) -> GameResult<()> {
        match input {
            InputEvent::SetPlayerName { name } => {
                let name = ctx.set_player_name(name)?.to_string();
                ctx.emit(OutboundEvent::PlayerNamed { name });
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
