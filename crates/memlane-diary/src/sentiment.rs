//! Bag-of-words sentiment.
//!
//! Each listed word counts at most once, matched as a case-insensitive
//! substring. The label compares the two tallies; the score is
//! `0.1 × (positive − negative)` clamped to `[-1, 1]`.

use memlane_contracts::diary::Sentiment;

pub const POSITIVE_WORDS: [&str; 9] = [
    "breakthrough",
    "success",
    "positive",
    "great",
    "excellent",
    "good",
    "gain",
    "profit",
    "up",
];

pub const NEGATIVE_WORDS: [&str; 9] = [
    "loss",
    "negative",
    "bad",
    "failure",
    "poor",
    "down",
    "volatility",
    "decrease",
    "adjust",
];

const SCORE_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
}

impl SentimentTally {
    pub fn of(text: &str) -> Self {
        let lower = text.to_lowercase();
        let hits = |words: &[&str]| words.iter().filter(|w| lower.contains(*w)).count();
        Self {
            positive: hits(&POSITIVE_WORDS),
            negative: hits(&NEGATIVE_WORDS),
        }
    }

    pub fn label(&self) -> Sentiment {
        match self.positive.cmp(&self.negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    pub fn score(&self) -> f64 {
        let diff = self.positive as f64 - self.negative as f64;
        (SCORE_STEP * diff).clamp(-1.0, 1.0)
    }
}

pub fn classify(text: &str) -> Sentiment {
    SentimentTally::of(text).label()
}
