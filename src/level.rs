#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    WordMatch,
    SentenceCompletion,
    ClozeTest,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::WordMatch => "word-match",
            GameMode::SentenceCompletion => "sentence-completion",
            GameMode::ClozeTest => "cloze-test",
        }
    }
}

/// Static configuration for one level. Exactly three exist, ordered by id;
/// level N+1 is only reachable after passing level N.
#[derive(Clone, Copy, Debug)]
pub struct LevelConfig {
    pub id: u8,
    pub mode: GameMode,
    pub title: &'static str,
    pub description: &'static str,
    /// Percentage required to unlock the next level.
    pub passing_score: u8,
    /// Accent color key for the UI layer. Data only, never inspected here.
    pub accent: &'static str,
}

pub const MAX_LEVEL_ID: u8 = 3;

pub const LEVELS: [LevelConfig; 3] = [
    LevelConfig {
        id: 1,
        mode: GameMode::WordMatch,
        title: "Vocab Definitions",
        description: "Select the correct Traditional Chinese meaning for the English word.",
        passing_score: 90,
        accent: "indigo",
    },
    LevelConfig {
        id: 2,
        mode: GameMode::SentenceCompletion,
        title: "Sentence Builder",
        description: "Choose the correct word to complete the sentence context.",
        passing_score: 90,
        accent: "blue",
    },
    LevelConfig {
        id: 3,
        mode: GameMode::ClozeTest,
        title: "Cloze Master",
        description: "Fill in multiple blanks within a complete paragraph.",
        passing_score: 90,
        accent: "purple",
    },
];

pub fn level(id: u8) -> Option<&'static LevelConfig> {
    LEVELS.iter().find(|l| l.id == id)
}
