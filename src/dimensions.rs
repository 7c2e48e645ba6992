// src/dimensions.rs
//! Four-dimension scoring (trust, fact density, emotional balance,
//! consistency) from lexicon statistics over a text. Pure and testable;
//! each score defaults to 5.0 when the signal is indeterminate.

use serde::{Deserialize, Serialize};

use crate::bias::split_sentences;
use crate::lexicon::{tokenize, SentimentLexicon};

/// Normalized 0-10 scores: trustworthiness, fact density, emotional balance,
/// consistency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub ts: f64,
    pub fd: f64,
    pub eb: f64,
    pub cs: f64,
}

impl Default for DimensionScores {
    fn default() -> Self {
        Self {
            ts: 5.0,
            fd: 5.0,
            eb: 5.0,
            cs: 5.0,
        }
    }
}

impl DimensionScores {
    pub fn zero() -> Self {
        Self {
            ts: 0.0,
            fd: 0.0,
            eb: 0.0,
            cs: 0.0,
        }
    }
}

/// Score `text` against the lexicon. An unloaded lexicon or a text without
/// recognizable tokens yields the all-5.0 default.
pub fn score(text: &str, lexicon: Option<&SentimentLexicon>) -> DimensionScores {
    let Some(lex) = lexicon.filter(|l| !l.is_empty()) else {
        return DimensionScores::default();
    };
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return DimensionScores::default();
    }

    let emotional: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| lex.lookup(t).is_some())
        .collect();

    DimensionScores {
        ts: trust_score(&emotional, lex),
        fd: fact_density(tokens.len(), emotional.len()),
        eb: emotional_balance(&tokens, lex),
        cs: consistency(text, lex),
    }
}

/// Average lexicon intensity over emotional tokens; plain factual text with
/// no emotional words scores 8, deliberately above the neutral 5.
fn trust_score(emotional: &[&str], lex: &SentimentLexicon) -> f64 {
    if emotional.is_empty() {
        return 8.0;
    }
    let sum: f64 = emotional
        .iter()
        .filter_map(|t| lex.lookup(t))
        .map(|e| e.intensity)
        .sum();
    let avg = sum / emotional.len() as f64;
    (10.0 - avg).max(1.0)
}

/// Non-emotional token fraction, scaled to 0-10.
fn fact_density(total: usize, emotional: usize) -> f64 {
    (total - emotional) as f64 / total as f64 * 10.0
}

/// 1 - |pos-neg|/(pos+neg), scaled x10; no polarized words is perfect balance.
fn emotional_balance(tokens: &[String], lex: &SentimentLexicon) -> f64 {
    let (pos, neg) = lex.polarity_counts(tokens);
    let total = pos + neg;
    if total == 0 {
        return 10.0;
    }
    (1.0 - pos.abs_diff(neg) as f64 / total as f64) * 10.0
}

/// Population variance of per-sentence signed polarity ratios, inverted onto
/// the 0-10 scale. Fewer than 2 scorable sentences is insufficient signal.
fn consistency(text: &str, lex: &SentimentLexicon) -> f64 {
    let ratios: Vec<f64> = split_sentences(text)
        .iter()
        .filter_map(|sentence| {
            let tokens = tokenize(sentence);
            let (pos, neg) = lex.polarity_counts(&tokens);
            let total = pos + neg;
            if total == 0 {
                None
            } else {
                Some((pos as f64 - neg as f64) / total as f64)
            }
        })
        .collect();

    if ratios.len() < 2 {
        return 5.0;
    }
    let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
    let variance =
        ratios.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / ratios.len() as f64;
    (10.0 - variance * 50.0).max(1.0)
}
