use log::{debug, warn};

use crate::generator::GenerationError;
use crate::level::{self, GameMode, LEVELS, LevelConfig};
use crate::progress::Unlocks;
use crate::question::QuestionSet;
use crate::session::Tally;
use crate::session::choice::ChoiceSession;
use crate::session::cloze::ClozeSession;
use crate::session::result::LevelResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Loading,
    Playing,
    Result,
}

/// A question fetch the shell should run on the [`crate::fetch::Fetcher`].
/// The ticket identifies the selection that asked for it; a reply whose
/// ticket no longer matches is discarded on delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: u64,
    pub mode: GameMode,
    pub count: usize,
}

pub enum ActiveSession {
    Choice(ChoiceSession),
    Cloze(ClozeSession),
}

/// Progression controller: owns the unlock set, the selected level, the
/// active session, and the menu/loading/playing/result screen machine.
///
/// All mutation happens through its methods; out-of-order gestures from the
/// UI are ignored rather than panicking.
pub struct App {
    screen: Screen,
    unlocks: Unlocks,
    selected_level: u8,
    session: Option<ActiveSession>,
    last_result: Option<LevelResult>,
    notice: Option<String>,
    question_count: usize,
    // Fetch generation counter. Bumped on every selection (and on quitting
    // to the menu) so a slow reply for a superseded selection can never
    // populate stale question data.
    generation: u64,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::with_question_count(10)
    }

    pub fn with_question_count(question_count: usize) -> Self {
        Self {
            screen: Screen::Menu,
            unlocks: Unlocks::new(),
            selected_level: 1,
            session: None,
            last_result: None,
            notice: None,
            question_count,
            generation: 0,
        }
    }

    // --- view queries -----------------------------------------------------

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn selected_level(&self) -> &'static LevelConfig {
        level::level(self.selected_level).unwrap_or(&LEVELS[0])
    }

    /// Level descriptors with their unlock flags, in menu order.
    pub fn levels(&self) -> impl Iterator<Item = (&'static LevelConfig, bool)> + '_ {
        LEVELS.iter().map(|l| (l, self.unlocks.is_unlocked(l.id)))
    }

    pub fn is_unlocked(&self, id: u8) -> bool {
        self.unlocks.is_unlocked(id)
    }

    pub fn last_result(&self) -> Option<&LevelResult> {
        self.last_result.as_ref()
    }

    /// User-facing failure notice from the last fetch, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn choice_session(&self) -> Option<&ChoiceSession> {
        match self.session.as_ref()? {
            ActiveSession::Choice(s) => Some(s),
            ActiveSession::Cloze(_) => None,
        }
    }

    pub fn cloze_session(&self) -> Option<&ClozeSession> {
        match self.session.as_ref()? {
            ActiveSession::Cloze(s) => Some(s),
            ActiveSession::Choice(_) => None,
        }
    }

    // --- menu / loading ---------------------------------------------------

    /// Enter a level: bump the fetch generation, go to `Loading`, and hand
    /// the shell a request to run. Locked ids are rejected defensively even
    /// though the menu should not offer them.
    pub fn select_level(&mut self, id: u8) -> Option<FetchRequest> {
        if !self.unlocks.is_unlocked(id) {
            debug!("rejecting selection of locked level {id}");
            return None;
        }
        let config = level::level(id)?;
        self.selected_level = id;
        self.session = None;
        self.notice = None;
        self.generation += 1;
        self.screen = Screen::Loading;
        debug!("level {id} selected, fetch ticket {}", self.generation);
        Some(FetchRequest {
            ticket: self.generation,
            mode: config.mode,
            count: self.question_count,
        })
    }

    /// Hand a fetch result back to the controller. Replies for superseded
    /// tickets are discarded without any state change; a failure surfaces a
    /// notice and returns to the menu, leaving progression untouched.
    pub fn deliver(&mut self, ticket: u64, result: Result<QuestionSet, GenerationError>) {
        if ticket != self.generation {
            debug!("discarding stale fetch reply {ticket} (current {})", self.generation);
            return;
        }
        if self.screen != Screen::Loading {
            return;
        }
        match result {
            Ok(set) => match (self.selected_level().mode, set) {
                (
                    GameMode::WordMatch | GameMode::SentenceCompletion,
                    QuestionSet::Choice(questions),
                ) => {
                    if questions.is_empty() {
                        self.fail_to_menu("Question generation returned no items.");
                    } else {
                        self.session = Some(ActiveSession::Choice(ChoiceSession::new(questions)));
                        self.screen = Screen::Playing;
                    }
                }
                (GameMode::ClozeTest, QuestionSet::Cloze(passage)) => {
                    self.session = Some(ActiveSession::Cloze(ClozeSession::new(passage)));
                    self.screen = Screen::Playing;
                }
                _ => self.fail_to_menu("Generated questions did not match the level mode."),
            },
            Err(e) => {
                warn!("question generation failed: {e}");
                self.fail_to_menu(&format!("Failed to generate questions: {e}"));
            }
        }
    }

    /// Surface a fetch failure as a notice and return to the menu,
    /// leaving progression untouched.
    fn fail_to_menu(&mut self, message: &str) {
        self.session = None;
        self.notice = Some(message.to_string());
        self.screen = Screen::Menu;
    }

    /// Re-enter the current level. Content is always re-fetched, so a retry
    /// never replays the same questions in the same option order.
    pub fn retry(&mut self) -> Option<FetchRequest> {
        self.select_level(self.selected_level)
    }

    /// Back to the menu from any screen. Bumps the generation so a fetch
    /// still in flight is discarded when it eventually delivers.
    pub fn quit_to_menu(&mut self) {
        self.generation += 1;
        self.session = None;
        self.notice = None;
        self.screen = Screen::Menu;
    }

    // --- session operations (proxied from the UI) -------------------------

    /// Record the answer for the current word-match / sentence-completion
    /// item. No-op outside `Playing` or for a cloze session.
    pub fn select_option(&mut self, option: &str) {
        if self.screen != Screen::Playing {
            return;
        }
        if let Some(ActiveSession::Choice(s)) = self.session.as_mut() {
            s.select_option(option);
        }
    }

    /// Advance past an answered item; completes the level on the last one.
    pub fn advance(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        let tally = match self.session.as_mut() {
            Some(ActiveSession::Choice(s)) => s.advance(),
            _ => None,
        };
        if let Some(tally) = tally {
            self.complete_level(tally);
        }
    }

    /// Record the selection for one cloze blank.
    pub fn select_blank(&mut self, blank_id: &str, option: &str) {
        if self.screen != Screen::Playing {
            return;
        }
        if let Some(ActiveSession::Cloze(s)) = self.session.as_mut() {
            s.select_option(blank_id, option);
        }
    }

    /// Submit the cloze passage for grading. Returns whether the session is
    /// now submitted; false while blanks remain unanswered.
    pub fn submit(&mut self) -> bool {
        if self.screen != Screen::Playing {
            return false;
        }
        match self.session.as_mut() {
            Some(ActiveSession::Cloze(s)) => s.submit(),
            _ => false,
        }
    }

    /// Leave the graded cloze view; completes the level.
    pub fn finish(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        let tally = match self.session.as_mut() {
            Some(ActiveSession::Cloze(s)) => s.finish(),
            _ => None,
        };
        if let Some(tally) = tally {
            self.complete_level(tally);
        }
    }

    // --- completion -------------------------------------------------------

    /// The sole mutator of the unlock set. Unlocking is a bounded, idempotent
    /// union: a later failed retry never removes anything.
    fn complete_level(&mut self, tally: Tally) {
        let config = self.selected_level();
        let percentage = crate::session::result::percentage(tally.score, tally.total);
        let newly_unlocked = if percentage >= config.passing_score {
            let next = config.id + 1;
            self.unlocks.unlock(next).then_some(next)
        } else {
            None
        };
        debug!(
            "level {} complete: {}/{} ({percentage}%), newly unlocked: {newly_unlocked:?}",
            config.id, tally.score, tally.total
        );
        self.last_result = Some(LevelResult::new(config, tally, newly_unlocked));
        self.session = None;
        self.screen = Screen::Result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::*;

    fn questions(n: usize) -> Vec<ChoiceQuestion> {
        (0..n)
            .map(|i| ChoiceQuestion {
                id: next_id("test"),
                prompt: ChoicePrompt::Word(format!("word{i}")),
                options: vec![
                    "right".to_string(),
                    "wrong-a".to_string(),
                    "wrong-b".to_string(),
                    "wrong-c".to_string(),
                ],
                answer: "right".to_string(),
            })
            .collect()
    }

    fn passage(blanks: usize) -> ClozePassage {
        ClozePassage {
            title: "t".to_string(),
            segments: (0..=blanks).map(|i| format!("seg{i} ")).collect(),
            blanks: (0..blanks)
                .map(|i| ClozeBlank {
                    id: format!("b{i}"),
                    options: vec![
                        "right".to_string(),
                        "wrong-a".to_string(),
                        "wrong-b".to_string(),
                        "wrong-c".to_string(),
                    ],
                    answer: "right".to_string(),
                })
                .collect(),
        }
    }

    /// Enter `id` and play its 10-question choice session, answering
    /// `correct` of them right.
    fn play_choice_level(app: &mut App, id: u8, correct: usize) {
        let req = app.select_level(id).expect("level should be unlocked");
        app.deliver(req.ticket, Ok(QuestionSet::Choice(questions(req.count))));
        assert_eq!(app.screen(), Screen::Playing);
        for i in 0..req.count {
            app.select_option(if i < correct { "right" } else { "wrong-a" });
            app.advance();
        }
    }

    #[test]
    fn test_locked_level_selection_is_rejected() {
        let mut app = App::new();
        assert!(app.select_level(2).is_none());
        assert_eq!(app.screen(), Screen::Menu);
        assert!(app.select_level(1).is_some());
    }

    #[test]
    fn test_delivery_enters_playing() {
        let mut app = App::new();
        let req = app.select_level(1).unwrap();
        assert_eq!(app.screen(), Screen::Loading);
        app.deliver(req.ticket, Ok(QuestionSet::Choice(questions(10))));
        assert_eq!(app.screen(), Screen::Playing);
        assert!(app.choice_session().is_some());
    }

    #[test]
    fn test_stale_reply_is_discarded() {
        let mut app = App::new();
        let first = app.select_level(1).unwrap();
        let second = app.select_level(1).unwrap();
        assert_ne!(first.ticket, second.ticket);

        app.deliver(first.ticket, Ok(QuestionSet::Choice(questions(10))));
        assert_eq!(app.screen(), Screen::Loading);
        assert!(app.choice_session().is_none());

        app.deliver(second.ticket, Ok(QuestionSet::Choice(questions(10))));
        assert_eq!(app.screen(), Screen::Playing);
    }

    #[test]
    fn test_fetch_failure_returns_to_menu_with_notice() {
        let mut app = App::new();
        let req = app.select_level(1).unwrap();
        app.deliver(req.ticket, Err(GenerationError::Empty));
        assert_eq!(app.screen(), Screen::Menu);
        assert!(app.notice().is_some());
        // Progression untouched.
        assert!(app.is_unlocked(1));
        assert!(!app.is_unlocked(2));
        assert!(app.last_result().is_none());
    }

    #[test]
    fn test_mode_mismatch_is_treated_as_failure() {
        let mut app = App::new();
        let req = app.select_level(1).unwrap();
        app.deliver(req.ticket, Ok(QuestionSet::Cloze(passage(5))));
        assert_eq!(app.screen(), Screen::Menu);
        assert!(app.notice().is_some());
    }

    #[test]
    fn test_quit_to_menu_supersedes_pending_fetch() {
        let mut app = App::new();
        let req = app.select_level(1).unwrap();
        app.quit_to_menu();
        app.deliver(req.ticket, Ok(QuestionSet::Choice(questions(10))));
        assert_eq!(app.screen(), Screen::Menu);
        assert!(app.choice_session().is_none());
    }

    #[test]
    fn test_exact_threshold_pass_unlocks_next_level() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 9); // 9/10 = 90%, threshold 90
        assert_eq!(app.screen(), Screen::Result);
        let result = app.last_result().unwrap();
        assert_eq!(result.percentage, 90);
        assert!(result.passed);
        assert_eq!(result.newly_unlocked, Some(2));
        assert!(app.is_unlocked(2));
    }

    #[test]
    fn test_below_threshold_fails_without_unlock() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 8); // 8/10 = 80%
        let result = app.last_result().unwrap();
        assert_eq!(result.percentage, 80);
        assert!(!result.passed);
        assert_eq!(result.newly_unlocked, None);
        assert!(!app.is_unlocked(2));
    }

    #[test]
    fn test_failed_retry_never_relocks() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 9);
        assert!(app.is_unlocked(2));

        play_choice_level(&mut app, 1, 5); // failing retry
        assert!(!app.last_result().unwrap().passed);
        assert!(app.is_unlocked(2));
    }

    #[test]
    fn test_repeat_pass_reports_no_new_unlock() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 10);
        assert_eq!(app.last_result().unwrap().newly_unlocked, Some(2));
        play_choice_level(&mut app, 1, 10);
        assert_eq!(app.last_result().unwrap().newly_unlocked, None);
    }

    #[test]
    fn test_passing_last_level_unlocks_nothing() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 10);
        play_choice_level(&mut app, 2, 10);

        let req = app.select_level(3).unwrap();
        app.deliver(req.ticket, Ok(QuestionSet::Cloze(passage(5))));
        for i in 0..5 {
            app.select_blank(&format!("b{i}"), "right");
        }
        assert!(app.submit());
        app.finish();

        let result = app.last_result().unwrap();
        assert!(result.passed);
        assert_eq!(result.newly_unlocked, None);
        assert_eq!(result.level_id, 3);
    }

    #[test]
    fn test_cloze_submit_gating_through_controller() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 10);
        play_choice_level(&mut app, 2, 10);
        let req = app.select_level(3).unwrap();
        app.deliver(req.ticket, Ok(QuestionSet::Cloze(passage(2))));

        assert!(!app.submit());
        app.select_blank("b0", "right");
        app.select_blank("b1", "wrong-a");
        assert!(app.submit());
        app.finish();

        let result = app.last_result().unwrap();
        assert_eq!((result.score, result.total), (1, 2));
        assert_eq!(result.percentage, 50);
        assert!(!result.passed);
    }

    #[test]
    fn test_retry_refetches_under_a_new_ticket() {
        let mut app = App::new();
        play_choice_level(&mut app, 1, 9);
        let first_ticket = app.select_level(1).unwrap().ticket;
        app.quit_to_menu();
        let retry = app.retry().unwrap();
        assert!(retry.ticket > first_ticket);
        assert_eq!(app.screen(), Screen::Loading);
    }

    #[test]
    fn test_session_operations_are_ignored_outside_playing() {
        let mut app = App::new();
        app.select_option("right");
        app.advance();
        app.select_blank("b0", "right");
        assert!(!app.submit());
        app.finish();
        assert_eq!(app.screen(), Screen::Menu);
        assert!(app.last_result().is_none());
    }
}
