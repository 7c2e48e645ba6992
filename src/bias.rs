// src/bias.rs
//! Lexicon-driven bias and fallacy detector. Runs independently of the model
//! and never fails: without a loaded lexicon it returns an all-zero, neutral
//! report.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::lexicon::{tokenize, SentimentLexicon};

/// Minimum dominance ratio before a stance stops being "neutral".
const STANCE_THRESHOLD: f64 = 0.1;

/// Counts of bias signals over a whole text, plus the aggregate stance label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasReport {
    pub emotional_words: usize,
    pub binary_opposition: usize,
    pub mind_reading: usize,
    pub logical_fallacy: usize,
    pub overall_stance: String,
}

impl BiasReport {
    pub fn neutral() -> Self {
        Self {
            emotional_words: 0,
            binary_opposition: 0,
            mind_reading: 0,
            logical_fallacy: 0,
            overall_stance: "neutral".to_string(),
        }
    }

    /// Display strings for the report's bias list (UI contract: only non-zero
    /// counts are listed, the stance line always is).
    pub fn render_findings(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.emotional_words > 0 {
            out.push(format!("Emotional words: {} detected", self.emotional_words));
        }
        if self.binary_opposition > 0 {
            out.push(format!(
                "Binary opposition: {} detected",
                self.binary_opposition
            ));
        }
        if self.mind_reading > 0 {
            out.push(format!("Mind-reading: {} detected", self.mind_reading));
        }
        if self.logical_fallacy > 0 {
            out.push(format!("Logical fallacy: {} detected", self.logical_fallacy));
        }
        out.push(format!("Overall stance: {}", self.overall_stance));
        out
    }
}

/// Sentence split on `.`, `!`, `?`; whitespace-only fragments discarded.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Subject cue followed anywhere later in the sentence by an intent verb.
/// Non-anchored; any text may separate the two.
static MIND_READING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(they|he|she|the government|people|someone|anyone)\b.*\b(think|believe|feel|assume|presume|imagine|guess|suppose|wonder|doubt|suspect|expect|anticipate|predict|foresee)\b",
    )
    .expect("mind-reading regex")
});

struct FallacyPattern {
    kind: &'static str,
    re: Regex,
}

static FALLACY_PATTERNS: Lazy<Vec<FallacyPattern>> = Lazy::new(|| {
    let table: [(&str, &str); 7] = [
        (
            "slippery slope",
            r"(?i)\b(will lead to|inevitably lead|eventually result in|start down the path|begin the trend)\b",
        ),
        (
            "ad hominem",
            r"(?i)\b(idiot|liar|fool|stupid|moron|jerk|foolish|ignorant)\b",
        ),
        (
            "straw man",
            r"(?i)\b(they claim|they say|they argue)\s+.*\b(extreme|ridiculous|absurd|unreasonable)\b",
        ),
        (
            "false dilemma",
            r"(?i)\b(either.*or|only two options|black and white|no middle ground)\b",
        ),
        (
            "appeal to authority",
            r"(?i)\b(expert says|famous person said|authority figure claims)\b",
        ),
        (
            "hasty generalization",
            r"(?i)\b(all.*are|every.*is|never.*not|always.*will)\b",
        ),
        (
            "correlation implies causation",
            r"(?i)\b(therefore|so|caused by|because of)\b",
        ),
    ];
    table
        .into_iter()
        .map(|(kind, pat)| FallacyPattern {
            kind,
            re: Regex::new(pat).unwrap_or_else(|e| panic!("fallacy regex `{kind}`: {e}")),
        })
        .collect()
});

/// Scan `text` for bias signals. `lexicon: None` (not yet loaded, or load
/// failed) yields the neutral report.
pub fn detect(text: &str, lexicon: Option<&SentimentLexicon>) -> BiasReport {
    let Some(lex) = lexicon.filter(|l| !l.is_empty()) else {
        return BiasReport::neutral();
    };

    let sentences = split_sentences(text);
    let (positive_words, negative_words) = lex.polarity_partition();

    let mut report = BiasReport::neutral();
    let mut pos_total = 0usize;
    let mut neg_total = 0usize;

    for sentence in &sentences {
        let tokens = tokenize(sentence);
        report.emotional_words += tokens.iter().filter(|t| lex.lookup(t).is_some()).count();

        let (pos, neg) = lex.polarity_counts(&tokens);
        pos_total += pos;
        neg_total += neg;

        // Substring co-occurrence against the polarity word lists. Partial-word
        // hits ("us" inside "versus") are a known imprecision kept as-observed.
        let lower = sentence.to_lowercase();
        let has_positive = positive_words.iter().any(|w| lower.contains(w.as_str()));
        let has_negative = negative_words.iter().any(|w| lower.contains(w.as_str()));
        if has_positive && has_negative {
            report.binary_opposition += 1;
        }

        if MIND_READING_RE.is_match(sentence) {
            report.mind_reading += 1;
        }

        for pattern in FALLACY_PATTERNS.iter() {
            report.logical_fallacy += pattern.re.find_iter(sentence).count();
        }
    }

    report.overall_stance = stance_label(pos_total, neg_total);
    report
}

/// Named fallacy kinds in table order, for diagnostics.
pub fn fallacy_kinds() -> Vec<&'static str> {
    FALLACY_PATTERNS.iter().map(|p| p.kind).collect()
}

fn stance_label(pos: usize, neg: usize) -> String {
    let total = pos + neg;
    if total == 0 {
        return "neutral".to_string();
    }
    let diff = pos.abs_diff(neg) as f64;
    if diff / (total as f64) < STANCE_THRESHOLD {
        return "neutral".to_string();
    }
    let dominant = pos.max(neg) as f64;
    let pct = (100.0 * dominant / total as f64).round() as u32;
    if pos > neg {
        format!("leaning positive {pct}%")
    } else {
        format!("leaning negative {pct}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{LexiconEntry, Polarity};

    fn fixture_lexicon() -> SentimentLexicon {
        let entries = vec![
            ("hero", 2.0, Polarity::Positive),
            ("brilliant", 3.0, Polarity::Positive),
            ("villain", 3.0, Polarity::Negative),
            ("disaster", 4.0, Polarity::Negative),
            ("terrible", 3.0, Polarity::Negative),
        ];
        SentimentLexicon::from_entries(
            entries
                .into_iter()
                .map(|(w, i, p)| LexiconEntry {
                    word: w.to_string(),
                    intensity: i,
                    polarity: p,
                })
                .collect(),
        )
    }

    #[test]
    fn no_lexicon_yields_all_zero_neutral() {
        let r = detect("They think everything is terrible! A disaster either way or worse.", None);
        assert_eq!(r, BiasReport::neutral());
    }

    #[test]
    fn counts_emotional_words_across_sentences() {
        let lex = fixture_lexicon();
        let r = detect("A hero appeared. What a disaster followed.", Some(&lex));
        assert_eq!(r.emotional_words, 2);
    }

    #[test]
    fn hero_and_villain_in_one_sentence_is_one_opposition() {
        let lex = fixture_lexicon();
        let r = detect("The hero fought the villain.", Some(&lex));
        assert_eq!(r.binary_opposition, 1);
    }

    #[test]
    fn opposition_requires_both_polarities() {
        let lex = fixture_lexicon();
        let r = detect("The hero was brilliant.", Some(&lex));
        assert_eq!(r.binary_opposition, 0);
    }

    #[test]
    fn mind_reading_matches_subject_then_intent_verb() {
        let lex = fixture_lexicon();
        let r = detect(
            "They secretly believe the plan is doomed. She went home.",
            Some(&lex),
        );
        assert_eq!(r.mind_reading, 1);
    }

    #[test]
    fn mind_reading_requires_whole_verb() {
        let lex = fixture_lexicon();
        // "thinking" must not satisfy the intent-verb word boundary.
        let r = detect("People were thinking out loud", Some(&lex));
        assert_eq!(r.mind_reading, 0);
    }

    #[test]
    fn fallacies_count_every_match_per_type() {
        let lex = fixture_lexicon();
        // "therefore" and "because of" both hit correlation-implies-causation;
        // "idiot" hits ad hominem.
        let r = detect("Therefore the idiot lost because of luck", Some(&lex));
        assert_eq!(r.logical_fallacy, 3);
    }

    #[test]
    fn stance_is_neutral_when_balanced() {
        let lex = fixture_lexicon();
        let r = detect("A hero and a villain.", Some(&lex));
        assert_eq!(r.overall_stance, "neutral");
    }

    #[test]
    fn stance_leans_with_dominant_polarity() {
        let lex = fixture_lexicon();
        let r = detect("Terrible disaster. Only one hero.", Some(&lex));
        assert_eq!(r.overall_stance, "leaning negative 67%");
    }

    #[test]
    fn stance_threshold_is_a_ratio_of_polarized_words() {
        // 1/11 is below the 0.1 dominance cutoff; 2/10 is above it.
        assert_eq!(stance_label(5, 6), "neutral");
        assert_eq!(stance_label(4, 6), "leaning negative 60%");
    }

    #[test]
    fn rendered_findings_always_include_stance() {
        let r = BiasReport::neutral();
        assert_eq!(r.render_findings(), vec!["Overall stance: neutral"]);
    }

    #[test]
    fn fallacy_table_is_complete() {
        assert_eq!(fallacy_kinds().len(), 7);
    }
}
