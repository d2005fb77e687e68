//! Pattern-based knowledge extraction from transcript messages

pub mod matchers;
pub mod scoring;
pub mod sentence;
pub mod strategy;

pub use matchers::{Candidate, MatchContext, MatcherKind};
pub use scoring::{Scorer, Signal, StaticTiers};
pub use strategy::{ExtractError, ExtractionStrategy, PatternStrategy};
