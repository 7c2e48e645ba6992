// src/analyze/extractor.rs
//! Sentence-level fact/opinion classification used when the model reply
//! carries no usable structure. Keyword-cue driven; every sentence lands in
//! exactly one bucket.

use crate::bias::split_sentences;
use crate::report::ExtractedClaim;

pub const FACT_CONFIDENCE: f64 = 0.8;
pub const OPINION_CONFIDENCE: f64 = 0.7;
pub const WEAK_FACT_CONFIDENCE: f64 = 0.6;
pub const WEAK_OPINION_CONFIDENCE: f64 = 0.5;

/// Reporting-verb and attribution cues that mark a checkable statement.
const FACT_CUES: &[&str] = &[
    "will",
    "according to",
    "announced",
    "reported",
    "stated",
    "confirmed",
    "shows",
    "found",
    "revealed",
    "measured",
];

/// Stance and hedging cues. Any hit wins over ambiguous fact signals.
const OPINION_CUES: &[&str] = &[
    "believe",
    "think",
    "feel",
    "opinion",
    "view",
    "seems",
    "appears",
    "should",
    "ought",
    "probably",
    "perhaps",
    "argue",
];

/// Secondary evidence markers for the neither-cue case.
const EVIDENCE_CUES: &[&str] = &["percent", "study", "data"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassifiedClaims {
    pub facts: Vec<ExtractedClaim>,
    pub opinions: Vec<ExtractedClaim>,
}

impl ClassifiedClaims {
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.opinions.is_empty()
    }
}

/// Classify each sentence of `text` as fact or opinion.
///
/// Tie-break policy: an opinion cue always wins; fact cues without opinion
/// cues make a fact; otherwise a digit or evidence marker makes a weak fact,
/// and everything else a weak opinion. No sentence is dropped.
pub fn classify_sentences(text: &str) -> ClassifiedClaims {
    let mut out = ClassifiedClaims::default();
    for sentence in split_sentences(text) {
        let lower = sentence.to_lowercase();
        let has_opinion_cue = OPINION_CUES.iter().any(|c| lower.contains(c));
        let has_fact_cue = FACT_CUES.iter().any(|c| lower.contains(c));

        if has_opinion_cue {
            out.opinions
                .push(ExtractedClaim::new(sentence, OPINION_CONFIDENCE));
        } else if has_fact_cue {
            out.facts.push(ExtractedClaim::new(sentence, FACT_CONFIDENCE));
        } else if lower.chars().any(|c| c.is_ascii_digit())
            || EVIDENCE_CUES.iter().any(|c| lower.contains(c))
        {
            out.facts
                .push(ExtractedClaim::new(sentence, WEAK_FACT_CONFIDENCE));
        } else {
            out.opinions
                .push(ExtractedClaim::new(sentence, WEAK_OPINION_CONFIDENCE));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committee_vote_scenario_buckets() {
        let c = classify_sentences("The committee will vote tomorrow. I believe this is a mistake.");
        assert_eq!(c.facts.len(), 1);
        assert_eq!(c.facts[0].content, "The committee will vote tomorrow");
        assert_eq!(c.facts[0].confidence, FACT_CONFIDENCE);
        assert_eq!(c.opinions.len(), 1);
        assert_eq!(c.opinions[0].content, "I believe this is a mistake");
        assert_eq!(c.opinions[0].confidence, OPINION_CONFIDENCE);
    }

    #[test]
    fn opinion_cue_beats_fact_cue() {
        let c = classify_sentences("The report stated what we should do.");
        assert!(c.facts.is_empty());
        assert_eq!(c.opinions[0].confidence, OPINION_CONFIDENCE);
    }

    #[test]
    fn digits_make_a_weak_fact() {
        let c = classify_sentences("Turnout rose by 12 points.");
        assert_eq!(c.facts[0].confidence, WEAK_FACT_CONFIDENCE);
    }

    #[test]
    fn evidence_words_make_a_weak_fact() {
        let c = classify_sentences("The study covered three regions.");
        assert_eq!(c.facts[0].confidence, WEAK_FACT_CONFIDENCE);
    }

    #[test]
    fn plain_prose_defaults_to_weak_opinion() {
        let c = classify_sentences("What a strange day.");
        assert!(c.facts.is_empty());
        assert_eq!(c.opinions[0].confidence, WEAK_OPINION_CONFIDENCE);
    }

    #[test]
    fn every_sentence_is_classified() {
        let c = classify_sentences("One will pass. Two seems off! Three? Four had 5 votes.");
        assert_eq!(c.facts.len() + c.opinions.len(), 4);
    }
}
