//! Gemini `generateContent` client: builds per-mode prompts and response
//! schemas, validates what comes back, and post-processes it into the crate's
//! question types (shuffled options, fresh ids, NFC-normalized text).

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::Config;
use crate::generator::vocabulary::Vocabulary;
use crate::generator::{GenerationError, QuestionSource};
use crate::question::{ChoicePrompt, ChoiceQuestion, ClozeBlank, ClozePassage, next_id};

/// A cloze request always asks for this many blanks.
pub const CLOZE_BLANK_COUNT: usize = 5;

const OPTIONS_PER_QUESTION: usize = 4;
const DISTRACTORS_PER_QUESTION: usize = 3;

// Low temperature for definitions so the service sticks to the corpus;
// higher for the free-text modes.
const TEMPERATURE_WORD_MATCH: f64 = 0.2;
const TEMPERATURE_SENTENCE: f64 = 0.5;
const TEMPERATURE_CLOZE: f64 = 0.7;

pub struct GenAiClient {
    config: Config,
    vocabulary: Vocabulary,
    rng: SmallRng,
}

impl GenAiClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            vocabulary: Vocabulary::load(),
            rng: SmallRng::from_entropy(),
        }
    }

    #[cfg(feature = "network")]
    fn call(&self, prompt: &str, schema: Value, temperature: f64) -> Result<String, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerationError::MissingApiKey)?;
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        let body = json!({
            "contents": [{"parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": temperature,
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.request_timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        let response = client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GenerationError::Service(response.status().as_u16()));
        }
        let raw = response
            .text()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        candidate_text(&raw)
    }

    #[cfg(not(feature = "network"))]
    fn call(
        &self,
        _prompt: &str,
        _schema: Value,
        _temperature: f64,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::NetworkDisabled)
    }
}

impl QuestionSource for GenAiClient {
    fn word_match(&mut self, count: usize) -> Result<Vec<ChoiceQuestion>, GenerationError> {
        let words = self.vocabulary.sample(&mut self.rng, count);
        let prompt = word_match_prompt(&words, &self.vocabulary.context_block());
        let payload = self.call(&prompt, word_match_schema(), TEMPERATURE_WORD_MATCH)?;
        build_word_match(&payload, &mut self.rng)
    }

    fn sentence_completion(
        &mut self,
        count: usize,
    ) -> Result<Vec<ChoiceQuestion>, GenerationError> {
        let words = self.vocabulary.sample(&mut self.rng, count);
        let prompt = sentence_prompt(&words, &self.vocabulary.context_block());
        let payload = self.call(&prompt, sentence_schema(), TEMPERATURE_SENTENCE)?;
        build_sentence(&payload, &mut self.rng)
    }

    fn cloze_passage(&mut self) -> Result<ClozePassage, GenerationError> {
        let words = self.vocabulary.sample(&mut self.rng, CLOZE_BLANK_COUNT);
        let prompt = cloze_prompt(&words, &self.vocabulary.context_block());
        let payload = self.call(&prompt, cloze_schema(), TEMPERATURE_CLOZE)?;
        build_cloze(&payload, &mut self.rng)
    }
}

// --- wire format ---------------------------------------------------------

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Pull the JSON payload text out of the first candidate's parts.
fn candidate_text(raw: &str) -> Result<String, GenerationError> {
    let response: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    let candidate = response.candidates.into_iter().next().ok_or(GenerationError::Empty)?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(text)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WordMatchItem {
    word: String,
    correct_chinese: String,
    distractors: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentenceItem {
    sentence_pre: String,
    sentence_post: String,
    correct_word: String,
    distractors: Vec<String>,
}

#[derive(Deserialize)]
struct ClozePayload {
    title: String,
    segments: Vec<String>,
    blanks: Vec<ClozeBlankItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClozeBlankItem {
    correct_word: String,
    distractors: Vec<String>,
}

// --- payload -> question types -------------------------------------------

fn build_word_match<R: Rng>(
    payload: &str,
    rng: &mut R,
) -> Result<Vec<ChoiceQuestion>, GenerationError> {
    let items: Vec<WordMatchItem> =
        serde_json::from_str(payload).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    if items.is_empty() {
        return Err(GenerationError::Empty);
    }
    items
        .into_iter()
        .map(|item| {
            let answer = nfc(&item.correct_chinese);
            let options = assemble_options(&answer, &item.distractors, rng)?;
            Ok(ChoiceQuestion {
                id: next_id("lvl1"),
                prompt: ChoicePrompt::Word(nfc(&item.word)),
                options,
                answer,
            })
        })
        .collect()
}

fn build_sentence<R: Rng>(
    payload: &str,
    rng: &mut R,
) -> Result<Vec<ChoiceQuestion>, GenerationError> {
    let items: Vec<SentenceItem> =
        serde_json::from_str(payload).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    if items.is_empty() {
        return Err(GenerationError::Empty);
    }
    items
        .into_iter()
        .map(|item| {
            let answer = nfc(&item.correct_word);
            let options = assemble_options(&answer, &item.distractors, rng)?;
            Ok(ChoiceQuestion {
                id: next_id("lvl2"),
                prompt: ChoicePrompt::Sentence {
                    pre: nfc(&item.sentence_pre),
                    post: nfc(&item.sentence_post),
                },
                options,
                answer,
            })
        })
        .collect()
}

fn build_cloze<R: Rng>(payload: &str, rng: &mut R) -> Result<ClozePassage, GenerationError> {
    let item: ClozePayload =
        serde_json::from_str(payload).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    if item.blanks.is_empty() {
        return Err(GenerationError::Empty);
    }
    if item.segments.len() != item.blanks.len() + 1 {
        return Err(GenerationError::Malformed(format!(
            "{} blanks require {} segments, got {}",
            item.blanks.len(),
            item.blanks.len() + 1,
            item.segments.len()
        )));
    }
    let blanks = item
        .blanks
        .into_iter()
        .map(|b| {
            let answer = nfc(&b.correct_word);
            let options = assemble_options(&answer, &b.distractors, rng)?;
            Ok(ClozeBlank {
                id: next_id("blank"),
                options,
                answer,
            })
        })
        .collect::<Result<Vec<_>, GenerationError>>()?;
    Ok(ClozePassage {
        title: nfc(&item.title),
        segments: item.segments.iter().map(|s| nfc(s)).collect(),
        blanks,
    })
}

/// Shuffle `[correct, distractors...]` into the public option order so the
/// answer's position is unpredictable. Rejects a wrong distractor count and
/// duplicated options (including the answer appearing among the distractors).
fn assemble_options<R: Rng>(
    correct: &str,
    distractors: &[String],
    rng: &mut R,
) -> Result<Vec<String>, GenerationError> {
    if distractors.len() != DISTRACTORS_PER_QUESTION {
        return Err(GenerationError::Malformed(format!(
            "expected {} distractors, got {}",
            DISTRACTORS_PER_QUESTION,
            distractors.len()
        )));
    }
    let mut options: Vec<String> = Vec::with_capacity(OPTIONS_PER_QUESTION);
    options.push(correct.to_string());
    options.extend(distractors.iter().map(|d| nfc(d)));
    let unique: HashSet<&str> = options.iter().map(String::as_str).collect();
    if unique.len() != OPTIONS_PER_QUESTION {
        return Err(GenerationError::Malformed(
            "duplicate answer options".to_string(),
        ));
    }
    options.shuffle(rng);
    Ok(options)
}

/// NFC-normalize service text at ingestion so session grading is plain
/// string equality, even for CJK definitions.
fn nfc(s: &str) -> String {
    icu_normalizer::ComposingNormalizerBorrowed::new_nfc()
        .normalize(s)
        .into_owned()
}

// --- prompts and response schemas ----------------------------------------

fn words_json(words: &[String]) -> String {
    serde_json::to_string(words).unwrap_or_default()
}

fn word_match_prompt(words: &[String], context: &str) -> String {
    format!(
        "Generate {count} vocabulary questions.\n\n\
         CRITICAL INSTRUCTION: You MUST use the following specific words for the questions:\n\
         {words}\n\n\
         CRITICAL INSTRUCTION: Refer to the provided VOCAB_CONTEXT below for the preferred Chinese definitions.\n\
         If the word exists in the VOCAB_CONTEXT, use the exact Chinese definition provided there.\n\n\
         VOCAB_CONTEXT:\n{context}\n\n\
         For each word:\n\
         1. Provide the English Word.\n\
         2. Provide the correct definition in Traditional Chinese (繁體中文) based on the context.\n\
         3. Provide 3 incorrect definitions in Traditional Chinese (distractors).",
        count = words.len(),
        words = words_json(words),
    )
}

fn sentence_prompt(words: &[String], context: &str) -> String {
    format!(
        "Generate {count} sentence completion questions.\n\n\
         CRITICAL INSTRUCTION: You MUST use the following specific words as the CORRECT ANSWERS:\n\
         {words}\n\n\
         CRITICAL INSTRUCTION: Refer to the provided VOCAB_CONTEXT below.\n\
         You may use the example sentences found in the context or create similar ones that fit the meaning.\n\n\
         VOCAB_CONTEXT:\n{context}\n\n\
         For each word:\n\
         1. Create a clear context sentence using the word.\n\
         2. Split the sentence into two parts (pre and post) around that word.\n\
         3. Provide 3 distractors that are plausible but incorrect (same part of speech).",
        count = words.len(),
        words = words_json(words),
    )
}

fn cloze_prompt(words: &[String], context: &str) -> String {
    format!(
        "Generate a cohesive paragraph (Story or Article) for a cloze test.\n\n\
         CRITICAL INSTRUCTION: The paragraph MUST use exactly these {count} words as the blanks:\n\
         {words}\n\n\
         VOCAB_CONTEXT (For reference on usage):\n{context}\n\n\
         Requirements:\n\
         1. Write a coherent text incorporating these words naturally.\n\
         2. The style should be literary or academic (B2/C1 level).\n\
         3. Provide the text split into segments around these blanks.\n\
         4. For each blank, provide the correct word (from the list above) and 3 distractors.",
        count = words.len(),
        words = words_json(words),
    )
}

fn word_match_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "word": {"type": "STRING", "description": "The English vocabulary word"},
                "correctChinese": {
                    "type": "STRING",
                    "description": "The correct Traditional Chinese definition (繁體中文)"
                },
                "distractors": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "3 incorrect Traditional Chinese definitions"
                },
            },
            "required": ["word", "correctChinese", "distractors"],
        },
    })
}

fn sentence_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "sentencePre": {"type": "STRING", "description": "Part of sentence before the blank"},
                "sentencePost": {"type": "STRING", "description": "Part of sentence after the blank"},
                "correctWord": {
                    "type": "STRING",
                    "description": "The correct English word to fill the blank"
                },
                "distractors": {
                    "type": "ARRAY",
                    "items": {"type": "STRING"},
                    "description": "3 incorrect English words"
                },
            },
            "required": ["sentencePre", "sentencePost", "correctWord", "distractors"],
        },
    })
}

fn cloze_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {"type": "STRING"},
            "segments": {
                "type": "ARRAY",
                "items": {"type": "STRING"},
                "description": "The text segments surrounding the blanks. If there are N blanks, there should be N+1 segments."
            },
            "blanks": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "correctWord": {"type": "STRING"},
                        "distractors": {"type": "ARRAY", "items": {"type": "STRING"}},
                    },
                    "required": ["correctWord", "distractors"],
                },
            },
        },
        "required": ["title", "segments", "blanks"],
    })
}
