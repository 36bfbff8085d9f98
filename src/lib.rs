//! Core engine for a three-stage vocabulary quiz game: word-definition
//! matching, sentence completion, and multi-blank cloze passages, gated by a
//! 90%-accuracy unlock rule.
//!
//! The crate deliberately contains no rendering. A UI shell owns an
//! [`app::App`] (the progression controller), forwards user gestures to it,
//! and reads view state back out. Question content comes from a
//! [`generator::QuestionSource`], normally the Gemini-backed
//! [`generator::genai::GenAiClient`] running on a [`fetch::Fetcher`] worker
//! thread so the shell never blocks on the network.

pub mod app;
pub mod config;
pub mod fetch;
pub mod generator;
pub mod level;
pub mod progress;
pub mod question;
pub mod session;
