pub mod choice;
pub mod cloze;
pub mod result;

/// Final score of one completed level playthrough.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tally {
    pub score: usize,
    pub total: usize,
}
