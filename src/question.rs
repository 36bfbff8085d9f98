use std::sync::atomic::{AtomicU64, Ordering};

/// Fresh process-wide unique id with a mode prefix, e.g. `lvl1-7`.
/// Every generated question and blank gets one at ingestion.
pub fn next_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{n}")
}

/// What the learner is shown above the option list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChoicePrompt {
    /// An English word; the options are Chinese definitions.
    Word(String),
    /// A sentence split around one blank; the options are English words.
    Sentence { pre: String, post: String },
}

/// One single-answer question for the word-match and sentence-completion
/// levels. Invariants (enforced at ingestion by the generator client):
/// exactly 4 options, no duplicates, `answer` is one of them.
#[derive(Clone, Debug)]
pub struct ChoiceQuestion {
    pub id: String,
    pub prompt: ChoicePrompt,
    pub options: Vec<String>,
    pub answer: String,
}

#[derive(Clone, Debug)]
pub struct ClozeBlank {
    pub id: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// A passage with N blanks and N+1 surrounding text segments.
/// `segments[i]` precedes `blanks[i]`; the final segment closes the text.
#[derive(Clone, Debug)]
pub struct ClozePassage {
    pub title: String,
    pub segments: Vec<String>,
    pub blanks: Vec<ClozeBlank>,
}

impl ClozePassage {
    /// Reconstruct the passage text, substituting `fill(blank)` for each
    /// blank. Used by the UI for display and text-to-speech assembly.
    pub fn render_with<F>(&self, fill: F) -> String
    where
        F: Fn(&ClozeBlank) -> String,
    {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            out.push_str(seg);
            if let Some(blank) = self.blanks.get(i) {
                out.push_str(&fill(blank));
            }
        }
        out
    }
}

/// A delivered batch of questions for one level playthrough.
#[derive(Clone, Debug)]
pub enum QuestionSet {
    Choice(Vec<ChoiceQuestion>),
    Cloze(ClozePassage),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(id: &str, answer: &str) -> ClozeBlank {
        ClozeBlank {
            id: id.to_string(),
            options: vec![answer.to_string()],
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_next_id_is_unique() {
        let a = next_id("q");
        let b = next_id("q");
        assert_ne!(a, b);
        assert!(a.starts_with("q-"));
    }

    #[test]
    fn test_render_interleaves_segments_and_blanks() {
        let passage = ClozePassage {
            title: "t".to_string(),
            segments: vec!["a ".into(), " b ".into(), " c ".into(), " d".into()],
            blanks: vec![blank("b0", "x"), blank("b1", "y"), blank("b2", "z")],
        };
        let text = passage.render_with(|b| format!("[{}]", b.answer));
        assert_eq!(text, "a [x] b [y] c [z] d");
    }

    #[test]
    fn test_render_with_no_blanks_is_the_single_segment() {
        let passage = ClozePassage {
            title: String::new(),
            segments: vec!["whole text".into()],
            blanks: vec![],
        };
        assert_eq!(passage.render_with(|_| "?".into()), "whole text");
    }
}
