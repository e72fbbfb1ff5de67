use crate::api::game::{GameContext, Screen};
use crate::api::types::{Category, SceneKind, ScreenKind};
use crate::bridge::protocol::{OutboundEvent, QuestionView};
use crate::content::question::Question;
use crate::core::rng::Rng;
use crate::core::storage::{Storage, BEST_SCORE_KEY};
use crate::core::time::Delay;
use crate::error::{GameError, GameResult};
use crate::input::queue::InputEvent;

/// One round of questions drawn from a bank.
pub struct Assessment {
    questions: Vec<Question>,
    index: usize,
    score: u32,
    answered: bool,
    best_score: u32,
}

impl Assessment {
    /// Shuffle the bank and keep the first `size` questions (at least one).
    pub fn new(mut bank: Vec<Question>, size: usize, rng: &mut Rng) -> Self {
        rng.shuffle(&mut bank);
        bank.truncate(size.max(1));
        Self::from_questions(bank)
    }

    /// Use the questions as given, in order.
    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self {
            questions,
            index: 0,
            score: 0,
            answered: false,
            best_score: 0,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    /// The current question, if it still accepts an answer.
    fn open_question(&self) -> GameResult<&Question> {
        if self.answered {
            return Err(GameError::NoQuestion);
        }
        self.current_question().ok_or(GameError::NoQuestion)
    }

    /// Answer a multiple-choice question. Returns whether it was correct.
    pub fn answer_mc(&mut self, choice: usize) -> GameResult<bool> {
        let correct = match self.open_question()? {
            Question::Mc(p) => {
                if choice >= p.options.len() {
                    return Err(GameError::ChoiceOutOfRange {
                        choice,
                        options: p.options.len(),
                    });
                }
                p.answer_index == choice
            }
            other => {
                return Err(GameError::WrongAnswerKind {
                    expected: other.kind_name(),
                })
            }
        };
        self.record(correct);
        Ok(correct)
    }

    /// Answer a typed question, trimmed and case-insensitive.
    pub fn answer_typing(&mut self, input: &str) -> GameResult<bool> {
        let correct = match self.open_question()? {
            Question::Typing(p) => p.accepts(input),
            other => {
                return Err(GameError::WrongAnswerKind {
                    expected: other.kind_name(),
                })
            }
        };
        self.record(correct);
        Ok(correct)
    }

    fn record(&mut self, correct: bool) {
        self.answered = true;
        if correct {
            self.score += 1;
        }
    }

    pub fn next(&mut self) {
        if self.index < self.questions.len() {
            self.index += 1;
        }
        self.answered = false;
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_count(&self) -> usize {
        self.questions.len()
    }

    /// 1-based number of the current question.
    pub fn current_index(&self) -> usize {
        self.index + 1
    }

    /// Persist the score if it beats the stored best. Returns true if it did.
    pub fn update_best_score(&mut self, storage: &mut dyn Storage) -> GameResult<bool> {
        if self.score <= self.best_score(storage) {
            return Ok(false);
        }
        self.best_score = self.score;
        storage.set(BEST_SCORE_KEY, &self.best_score.to_string())?;
        Ok(true)
    }

    /// Stored best score, falling back to the best seen this session.
    pub fn best_score(&self, storage: &dyn Storage) -> u32 {
        storage
            .get(BEST_SCORE_KEY)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.best_score)
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.score = 0;
        self.answered = false;
    }
}

/// Restaurant assessment screen.
///
/// After each answer the feedback stays up for `feedback_delay` seconds,
/// then the next question is shown. Typed questions collect key presses
/// into a buffer until Enter.
pub struct AssessmentScreen {
    scene: SceneKind,
    screen: ScreenKind,
    bank: Option<Vec<Question>>,
    round: Option<Assessment>,
    rng: Rng,
    typing: String,
    advance: Delay,
}

impl AssessmentScreen {
    pub fn new(scene: SceneKind, screen: ScreenKind, seed: u64) -> Self {
        Self {
            scene,
            screen,
            bank: None,
            round: None,
            rng: Rng::new(seed),
            typing: String::new(),
            advance: Delay::new(),
        }
    }

    pub fn load(&mut self, bank: Vec<Question>) {
        log::info!("{}: loaded {} questions", self.scene.as_str(), bank.len());
        self.bank = Some(bank);
        self.round = None;
    }

    pub fn round(&self) -> Option<&Assessment> {
        self.round.as_ref()
    }

    pub fn typing_buffer(&self) -> &str {
        &self.typing
    }

    fn round_mut(&mut self) -> GameResult<&mut Assessment> {
        self.round.as_mut().ok_or(GameError::NotLoaded(self.screen))
    }

    fn start_round(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let bank = self.bank.clone().ok_or(GameError::NotLoaded(self.screen))?;
        let best = self.round.as_ref().map_or(0, |r| r.best_score);
        let mut round = Assessment::new(bank, ctx.config().assessment_size, &mut self.rng);
        round.best_score = best;
        self.round = Some(round);
        self.typing.clear();
        self.advance.cancel();
        if self.round.as_ref().is_some_and(Assessment::is_finished) {
            return self.finish(ctx);
        }
        self.show_question(ctx)
    }

    fn show_question(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let round = self.round_mut()?;
        let Some(question) = round.current_question() else {
            return Ok(());
        };
        let view = match question {
            Question::Mc(p) => QuestionView::Mc {
                prompt: p.question.clone(),
                options: p.options.clone(),
            },
            Question::Typing(p) => QuestionView::Typing {
                prompt: p.question.clone(),
                hint: p.hint.clone(),
            },
        };
        let event = OutboundEvent::QuestionShown {
            number: round.current_index(),
            total: round.total_count(),
            score: round.score(),
            question: view,
        };
        self.typing.clear();
        ctx.emit(event);
        Ok(())
    }

    fn answered(&mut self, ctx: &mut GameContext, correct: bool) {
        ctx.emit(OutboundEvent::AnswerFeedback { correct });
        self.advance.start(ctx.config().feedback_delay);
    }

    fn pick_choice(&mut self, ctx: &mut GameContext, index: usize) -> GameResult<()> {
        let correct = self.round_mut()?.answer_mc(index)?;
        self.answered(ctx, correct);
        Ok(())
    }

    fn submit_typing(&mut self, ctx: &mut GameContext, text: &str) -> GameResult<()> {
        let correct = self.round_mut()?.answer_typing(text)?;
        self.answered(ctx, correct);
        Ok(())
    }

    fn key(&mut self, ctx: &mut GameContext, key: &str) -> GameResult<()> {
        let is_typing = matches!(
            self.round.as_ref().and_then(|r| r.current_question()),
            Some(Question::Typing(_))
        );
        if !is_typing || self.advance.is_pending() {
            return Ok(());
        }
        match key {
            "Enter" => {
                let text = std::mem::take(&mut self.typing);
                return self.submit_typing(ctx, &text);
            }
            "Backspace" => {
                self.typing.pop();
            }
            k if k.chars().count() == 1 => self.typing.push_str(k),
            _ => return Ok(()),
        }
        ctx.emit(OutboundEvent::TypingChanged {
            text: self.typing.clone(),
        });
        Ok(())
    }

    fn next_question(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let round = self.round_mut()?;
        round.next();
        if round.is_finished() {
            self.finish(ctx)
        } else {
            self.show_question(ctx)
        }
    }

    /// Save the best score, mark the assessment found and show the results.
    fn finish(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        let scene = self.scene;
        let round = self.round_mut()?;
        round.update_best_score(ctx.storage_mut())?;
        let (score, total) = (round.score(), round.total_count());
        let best = round.best_score(ctx.storage());
        log::info!("{} assessment finished: {}/{} (best {})", scene.as_str(), score, total, best);

        ctx.tracker_mut()
            .mark_found(&scene.assessment_id(), Category::Assessments)?;
        ctx.stats_mut().record_assessment(score, total as u32);
        ctx.emit(OutboundEvent::AssessmentFinished {
            scene,
            score,
            total,
            best,
        });
        Ok(())
    }
}

impl Screen for AssessmentScreen {
    fn kind(&self) -> ScreenKind {
        self.screen
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameResult<()> {
        if self.bank.is_none() {
            return Err(GameError::NotLoaded(self.screen));
        }
        ctx.tracker_mut()
            .register_items([self.scene.assessment_id()], Category::Assessments);
        self.start_round(ctx)
    }

    /// Leaving during the feedback pause still counts the answer. If it
    /// was the last question the round finishes here.
    fn leave(&mut self, ctx: &mut GameContext) {
        if !self.advance.is_pending() {
            return;
        }
        self.advance.cancel();
        let Some(round) = self.round.as_mut() else {
            return;
        };
        round.next();
        if round.is_finished() {
            if let Err(e) = self.finish(ctx) {
                log::warn!("assessment: could not finish round: {}", e);
            }
        }
    }

    fn handle(&mut self, ctx: &mut GameContext, input: &InputEvent) -> GameResult<()> {
        if self.advance.is_pending() && !matches!(input, InputEvent::Reset) {
            log::debug!("assessment: feedback showing, ignoring {:?}", input);
            return Ok(());
        }
        match input {
            InputEvent::PickChoice { index } => self.pick_choice(ctx, *index),
            InputEvent::Key { key } => self.key(ctx, key),
            InputEvent::SubmitAnswer { text } => self.submit_typing(ctx, text),
            InputEvent::Reset => self.start_round(ctx),
            other => {
                log::debug!("assessment: ignoring {:?}", other);
                Ok(())
            }
        }
    }

    fn tick(&mut self, ctx: &mut GameContext, dt: f32) -> GameResult<()> {
        if self.advance.tick(dt) {
            self.next_question(ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::game::GameConfig;
    use crate::content::question::{mc, typing};
    use crate::core::storage::MemoryStorage;

    fn bank() -> Vec<Question> {
        vec![
            mc("Soup?", &["la soupe", "le pain"], 0),
            typing("Type 'water'", "l'eau"),
        ]
    }

    #[test]
    fn answer_mc_scores_only_correct_choice() {
        let mut a = Assessment::from_questions(bank());
        assert!(a.answer_mc(0).unwrap());
        assert_eq!(a.score(), 1);
        // A question takes one answer only.
        assert!(matches!(a.answer_mc(0), Err(GameError::NoQuestion)));
        assert_eq!(a.score(), 1);

        let mut b = Assessment::from_questions(bank());
        assert!(!b.answer_mc(1).unwrap());
        assert_eq!(b.score(), 0);
    }

    #[test]
    fn answer_kind_must_match_question() {
        let mut a = Assessment::from_questions(bank());
        assert!(matches!(
            a.answer_typing("la soupe"),
            Err(GameError::WrongAnswerKind { expected: "multiple-choice" })
        ));
        assert!(matches!(
            a.answer_mc(5),
            Err(GameError::ChoiceOutOfRange { choice: 5, options: 2 })
        ));
        a.answer_mc(0).unwrap();
        a.next();
        assert!(a.answer_typing("  L'EAU ").unwrap());
        assert_eq!(a.score(), 2);
    }

    #[test]
    fn progression_and_finish() {
        let mut a = Assessment::from_questions(bank());
        assert_eq!(a.current_index(), 1);
        assert_eq!(a.total_count(), 2);
        a.next();
        a.next();
        assert!(a.is_finished());
        assert!(a.current_question().is_none());
        assert!(matches!(a.answer_mc(0), Err(GameError::NoQuestion)));
        a.next();
        assert_eq!(a.current_index(), 3);

        a.reset();
        assert!(!a.is_finished());
        assert_eq!(a.score(), 0);
    }

    #[test]
    fn new_slices_shuffled_bank() {
        let bank: Vec<Question> = (0..10).map(|i| typing(&format!("q{i}"), "a")).collect();
        let mut rng = Rng::new(9);
        let a = Assessment::new(bank, 7, &mut rng);
        assert_eq!(a.total_count(), 7);

        let short = Assessment::new(vec![typing("only", "a")], 7, &mut rng);
        assert_eq!(short.total_count(), 1);
    }

    #[test]
    fn best_score_persists_only_improvements() {
        let mut storage = MemoryStorage::new();
        let mut a = Assessment::from_questions(bank());
        a.answer_mc(0).unwrap();
        assert!(a.update_best_score(&mut storage).unwrap());
        assert_eq!(storage.get(BEST_SCORE_KEY).as_deref(), Some("1"));

        let mut b = Assessment::from_questions(bank());
        assert!(!b.update_best_score(&mut storage).unwrap());
        assert_eq!(b.best_score(&storage), 1);
    }

    fn screen_with_ctx() -> (AssessmentScreen, GameContext) {
        let ctx = GameContext::new(GameConfig::default(), Box::new(MemoryStorage::new()));
        let mut screen = AssessmentScreen::new(SceneKind::Restaurant, ScreenKind::RestaurantAssessment, 1);
        screen.load(vec![typing("Type 'water'", "eau")]);
        (screen, ctx)
    }

    #[test]
    fn typing_keys_build_answer_and_finish_after_delay() {
        let (mut screen, mut ctx) = screen_with_ctx();
        screen.enter(&mut ctx).unwrap();
        for key in ["e", "a", "x", "Backspace", "u", "Shift"] {
            screen.handle(&mut ctx, &InputEvent::Key { key: key.into() }).unwrap();
        }
        assert_eq!(screen.typing_buffer(), "eau");
        screen.handle(&mut ctx, &InputEvent::Key { key: "Enter".into() }).unwrap();
        assert_eq!(screen.round().unwrap().score(), 1);

        // Feedback is still showing: nothing advances yet.
        screen.tick(&mut ctx, 0.5).unwrap();
        assert!(!screen.round().unwrap().is_finished());

        screen.tick(&mut ctx, 1.0).unwrap();
        assert!(screen.round().unwrap().is_finished());
        assert!(ctx.tracker().is_found("restaurant:assessment", Category::Assessments));
        assert_eq!(ctx.stats().assessment().score, 1);
        assert_eq!(ctx.storage().get(BEST_SCORE_KEY).as_deref(), Some("1"));

        let finished = ctx.drain_events().into_iter().find_map(|e| match e {
            OutboundEvent::AssessmentFinished { score, total, best, .. } => Some((score, total, best)),
            _ => None,
        });
        assert_eq!(finished, Some((1, 1, 1)));
    }

    #[test]
    fn reset_starts_a_fresh_round() {
        let (mut screen, mut ctx) = screen_with_ctx();
        screen.enter(&mut ctx).unwrap();
        screen
            .handle(&mut ctx, &InputEvent::SubmitAnswer { text: "eau".into() })
            .unwrap();
        screen.handle(&mut ctx, &InputEvent::Reset).unwrap();
        let round = screen.round().unwrap();
        assert_eq!(round.score(), 0);
        assert_eq!(round.current_index(), 1);
        // The pending advance was cancelled with the old round.
        screen.tick(&mut ctx, 5.0).unwrap();
        assert!(!screen.round().unwrap().is_finished());
    }

    #[test]
    fn leaving_during_final_feedback_finishes_round() {
        let (mut screen, mut ctx) = screen_with_ctx();
        screen.enter(&mut ctx).unwrap();
        screen
            .handle(&mut ctx, &InputEvent::SubmitAnswer { text: "eau".into() })
            .unwrap();
        screen.tick(&mut ctx, 0.3).unwrap();
        screen.leave(&mut ctx);

        assert!(ctx.tracker().is_found("restaurant:assessment", Category::Assessments));
        assert_eq!(ctx.storage().get(BEST_SCORE_KEY).as_deref(), Some("1"));
        assert_eq!(ctx.stats().assessment().score, 1);

        // The cancelled pause does not fire a second time.
        screen.tick(&mut ctx, 5.0).unwrap();
        let finishes = ctx
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, OutboundEvent::AssessmentFinished { .. }))
            .count();
        assert_eq!(finishes, 1);
    }

    #[test]
    fn leaving_without_pending_answer_records_nothing() {
        let (mut screen, mut ctx) = screen_with_ctx();
        screen.enter(&mut ctx).unwrap();
        screen.leave(&mut ctx);
        assert!(!ctx.tracker().is_found("restaurant:assessment", Category::Assessments));
        assert_eq!(ctx.stats().assessment().total, 0);
    }

    #[test]
    fn zero_size_still_asks_one_question() {
        let mut ctx = GameContext::new(
            GameConfig {
                assessment_size: 0,
                ..GameConfig::default()
            },
            Box::new(MemoryStorage::new()),
        );
        let mut screen = AssessmentScreen::new(SceneKind::Restaurant, ScreenKind::RestaurantAssessment, 1);
        screen.load(bank());
        screen.enter(&mut ctx).unwrap();
        assert_eq!(screen.round().unwrap().total_count(), 1);
        assert!(ctx
            .drain_events()
            .iter()
            .any(|e| matches!(e, OutboundEvent::QuestionShown { number: 1, total: 1, .. })));
    }

    #[test]
    fn empty_bank_finishes_on_enter() {
        let mut ctx = GameContext::new(GameConfig::default(), Box::new(MemoryStorage::new()));
        let mut screen = AssessmentScreen::new(SceneKind::Restaurant, ScreenKind::RestaurantAssessment, 1);
        screen.load(Vec::new());
        screen.enter(&mut ctx).unwrap();
        assert!(ctx
            .drain_events()
            .iter()
            .any(|e| matches!(e, OutboundEvent::AssessmentFinished { score: 0, total: 0, .. })));
    }

    #[test]
    fn enter_without_bank_fails() {
        let mut ctx = GameContext::new(GameConfig::default(), Box::new(MemoryStorage::new()));
        let mut screen = AssessmentScreen::new(SceneKind::Restaurant, ScreenKind::RestaurantAssessment, 1);
        assert!(matches!(screen.enter(&mut ctx), Err(GameError::NotLoaded(_))));
    }
}
