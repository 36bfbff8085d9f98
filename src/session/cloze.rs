use std::collections::HashMap;

use crate::question::{ClozeBlank, ClozePassage};
use crate::session::Tally;

/// One playthrough of a cloze level: all blanks of a single passage are
/// filled in any order, then submitted at once.
///
/// Unlike [`super::choice::ChoiceSession`], selections may be changed freely
/// until submission. After `submit` the selections are frozen and `finish`
/// grades them against the blanks' correct answers.
pub struct ClozeSession {
    passage: ClozePassage,
    selections: HashMap<String, String>,
    submitted: bool,
    finished: bool,
}

impl ClozeSession {
    pub fn new(passage: ClozePassage) -> Self {
        // A passage with no blanks is vacuously submitted on entry.
        let submitted = passage.blanks.is_empty();
        Self {
            passage,
            selections: HashMap::new(),
            submitted,
            finished: false,
        }
    }

    pub fn passage(&self) -> &ClozePassage {
        &self.passage
    }

    pub fn total_blanks(&self) -> usize {
        self.passage.blanks.len()
    }

    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn selection(&self, blank_id: &str) -> Option<&str> {
        self.selections.get(blank_id).map(String::as_str)
    }

    /// Whether the selection for `blank_id` matches its answer. Only
    /// meaningful after submission, `None` before it.
    pub fn is_correct(&self, blank_id: &str) -> Option<bool> {
        if !self.submitted {
            return None;
        }
        let blank = self.blank(blank_id)?;
        Some(self.selection(blank_id) == Some(blank.answer.as_str()))
    }

    /// Record (or overwrite) the selection for one blank. Ignored after
    /// submission and for unknown blank ids.
    pub fn select_option(&mut self, blank_id: &str, option: &str) {
        if self.submitted || self.blank(blank_id).is_none() {
            return;
        }
        self.selections
            .insert(blank_id.to_string(), option.to_string());
    }

    /// Freeze selections for grading. Rejected (returns false, no state
    /// change) while any blank is unanswered; idempotent afterwards.
    pub fn submit(&mut self) -> bool {
        if self.submitted {
            return true;
        }
        if self.answered_count() < self.total_blanks() {
            return false;
        }
        self.submitted = true;
        true
    }

    /// Grade the submitted selections. Requires `submit` first; yields the
    /// tally exactly once. A zero-blank passage finishes at (0, 0).
    pub fn finish(&mut self) -> Option<Tally> {
        if !self.submitted || self.finished {
            return None;
        }
        self.finished = true;
        let score = self
            .passage
            .blanks
            .iter()
            .filter(|b| self.selections.get(&b.id).map(String::as_str) == Some(b.answer.as_str()))
            .count();
        Some(Tally {
            score,
            total: self.passage.blanks.len(),
        })
    }

    fn blank(&self, blank_id: &str) -> Option<&ClozeBlank> {
        self.passage.blanks.iter().find(|b| b.id == blank_id)
    }
}
