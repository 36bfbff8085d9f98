use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

const VOCABULARY_JSON: &str = include_str!("../../assets/vocabulary.json");

/// One entry of the fixed study list: the English word, its Traditional
/// Chinese definition (with part-of-speech tag), and one example sentence.
#[derive(Clone, Debug, Deserialize)]
pub struct VocabEntry {
    pub word: String,
    pub definition: String,
    pub example: String,
}

/// The embedded ~80-word study corpus that seeds every generation request.
pub struct Vocabulary {
    entries: Vec<VocabEntry>,
}

impl Vocabulary {
    pub fn load() -> Self {
        let entries: Vec<VocabEntry> = serde_json::from_str(VOCABULARY_JSON).unwrap_or_default();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VocabEntry] {
        &self.entries
    }

    /// Uniform random subset of `count` distinct words: Fisher-Yates shuffle
    /// of the full list, then take a prefix. No duplicates by construction.
    pub fn sample<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<String> {
        let mut words: Vec<&str> = self.entries.iter().map(|e| e.word.as_str()).collect();
        words.shuffle(rng);
        words.truncate(count.min(self.entries.len()));
        words.into_iter().map(str::to_string).collect()
    }

    /// The numbered word/definition/example block appended to every prompt so
    /// the service sticks to the study material's definitions and register.
    pub fn context_block(&self) -> String {
        let mut out = String::new();
        for (i, e) in self.entries.iter().enumerate() {
            out.push_str(&format!("{}. {}\n{}\n {}\n", i + 1, e.word, e.definition, e.example));
        }
        out
    }
}
