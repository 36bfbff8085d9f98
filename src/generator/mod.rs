pub mod genai;
pub mod vocabulary;

use thiserror::Error;

use crate::level::GameMode;
use crate::question::{ChoiceQuestion, ClozePassage, QuestionSet};

/// Failure modes of question generation. None of these are retried
/// automatically; the controller surfaces them and returns to the menu.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network request failed: {0}")]
    Transport(String),
    #[error("generation service returned HTTP status {0}")]
    Service(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("generation service returned no questions")]
    Empty,
    #[error("no API key configured (set api_key in config.toml or GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("built without the network feature")]
    NetworkDisabled,
}

/// Produces question content for the three level modes. The production
/// implementation is [`genai::GenAiClient`]; tests script their own.
pub trait QuestionSource {
    fn word_match(&mut self, count: usize) -> Result<Vec<ChoiceQuestion>, GenerationError>;

    fn sentence_completion(&mut self, count: usize)
    -> Result<Vec<ChoiceQuestion>, GenerationError>;

    fn cloze_passage(&mut self) -> Result<ClozePassage, GenerationError>;

    fn fetch(&mut self, mode: GameMode, count: usize) -> Result<QuestionSet, GenerationError> {
        match mode {
            GameMode::WordMatch => self.word_match(count).map(QuestionSet::Choice),
            GameMode::SentenceCompletion => {
                self.sentence_completion(count).map(QuestionSet::Choice)
            }
            GameMode::ClozeTest => self.cloze_passage().map(QuestionSet::Cloze),
        }
    }
}
