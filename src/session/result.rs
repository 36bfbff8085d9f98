use chrono::{DateTime, Utc};

use crate::level::LevelConfig;
use crate::session::Tally;

/// Outcome of one completed level, captured in the same transition that
/// applies the unlock rule. `newly_unlocked` is recorded here rather than
/// recomputed later from the (already mutated) unlock set.
#[derive(Clone, Debug)]
pub struct LevelResult {
    pub level_id: u8,
    pub score: usize,
    pub total: usize,
    pub percentage: u8,
    pub passed: bool,
    pub newly_unlocked: Option<u8>,
    pub finished_at: DateTime<Utc>,
}

impl LevelResult {
    pub fn new(level: &LevelConfig, tally: Tally, newly_unlocked: Option<u8>) -> Self {
        let percentage = percentage(tally.score, tally.total);
        Self {
            level_id: level.id,
            score: tally.score,
            total: tally.total,
            percentage,
            passed: percentage >= level.passing_score,
            newly_unlocked,
            finished_at: Utc::now(),
        }
    }
}

/// Rounded percentage score. An empty session grades as 0%, never a
/// division error.
pub fn percentage(score: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (score as f64 / total as f64 * 100.0).round() as u8
}
