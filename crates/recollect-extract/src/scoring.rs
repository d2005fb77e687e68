//! Confidence scoring for extraction candidates

use crate::matchers::Candidate;

/// Strength of the evidence behind a candidate, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Header-delimited section or an explicit tool error flag
    Structured,
    /// Explicit phrasing with its reason attached
    Explicit,
    /// Explicit phrasing without supporting context
    Strong,
    /// Generic keyword hit
    Keyword,
}

/// Assigns a confidence in [0, 1] to a candidate
pub trait Scorer: Send + Sync {
    fn score(&self, candidate: &Candidate) -> f64;
}

/// Fixed confidence per signal tier
#[derive(Debug, Clone, PartialEq)]
pub struct StaticTiers {
    pub structured: f64,
    pub explicit: f64,
    pub strong: f64,
    pub keyword: f64,
}

impl Default for StaticTiers {
    fn default() -> Self {
        Self {
            structured: 0.9,
            explicit: 0.8,
            strong: 0.7,
            keyword: 0.6,
        }
    }
}

impl Scorer for StaticTiers {
    fn score(&self, candidate: &Candidate) -> f64 {
        let tier = match candidate.signal {
            Signal::Structured => self.structured,
            Signal::Explicit => self.explicit,
            Signal::Strong => self.strong,
            Signal::Keyword => self.keyword,
        };
        tier.clamp(0.0, 1.0)
    }
}
