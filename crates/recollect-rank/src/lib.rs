//! Relevance ranking over stored entries

mod ranker;
mod service;

pub use ranker::{keywords, Mode, Ranked, Ranker, ScoreBreakdown, Weights};
pub use service::{search, why, why_keywords};
