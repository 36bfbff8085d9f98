use crate::question::ChoiceQuestion;
use crate::session::Tally;

/// One playthrough of a word-match or sentence-completion level: an ordered
/// question list answered one at a time.
///
/// Per item the flow is awaiting-answer -> answered -> next item (or done).
/// The score is always derived from the per-item answer record, never from a
/// transient "last selected" variable, so re-renders and repeated calls can
/// never double-count.
pub struct ChoiceSession {
    questions: Vec<ChoiceQuestion>,
    answers: Vec<Option<String>>,
    current: usize,
    complete: bool,
}

impl ChoiceSession {
    pub fn new(questions: Vec<ChoiceQuestion>) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            questions,
            answers,
            current: 0,
            complete: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn current_question(&self) -> Option<&ChoiceQuestion> {
        if self.complete {
            return None;
        }
        self.questions.get(self.current)
    }

    /// The option recorded for the current item, if any.
    pub fn selected(&self) -> Option<&str> {
        self.answers.get(self.current)?.as_deref()
    }

    pub fn is_answered(&self) -> bool {
        self.selected().is_some()
    }

    /// Record `option` for the current item. Silent no-op once the item is
    /// answered or the session is complete, so a double-submission from the
    /// UI cannot change the recorded answer (and thus the score).
    pub fn select_option(&mut self, option: &str) {
        if self.complete || self.current >= self.questions.len() {
            return;
        }
        if self.answers[self.current].is_some() {
            return;
        }
        self.answers[self.current] = Some(option.to_string());
    }

    /// Move past the current item. No-op unless the item has been answered.
    /// Returns the final tally exactly once, on the transition past the last
    /// item; `None` in every other state (including after completion).
    pub fn advance(&mut self) -> Option<Tally> {
        if self.complete || !self.is_answered() {
            return None;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            None
        } else {
            self.complete = true;
            Some(self.tally())
        }
    }

    /// Count of recorded answers equal to their question's correct answer.
    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.as_deref() == Some(q.answer.as_str()))
            .count()
    }

    fn tally(&self) -> Tally {
        Tally {
            score: self.correct_count(),
            total: self.questions.len(),
        }
    }
}
