// src/analyze/parser.rs
//! Turns a raw model reply into a normalized `AnalysisReport`.
//!
//! Two strategies, selected by a single documented predicate: the structured
//! branch extracts the line-oriented template fields the prompt asks for
//! (see `ai_adapter::build_prompt`), the free-form branch falls back to
//! keyword heuristics. Each field is extracted by its own pure function and
//! every field is independently optional. Nothing in here can fail past the
//! `parse_report` boundary.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyze::extractor;
use crate::bias;
use crate::dimensions::{self, DimensionScores};
use crate::lexicon::SentimentLexicon;
use crate::report::{AnalysisReport, ExtractedClaim};

pub const FALLBACK_SUMMARY: &str = "Analysis completed based on provided text.";
pub const EMPTY_REPLY_REASON: &str = "Empty completion reply - no analysis available.";

/// Default confidences for free-form line extraction (not model-derived).
const FREEFORM_FACT_CONFIDENCE: f64 = 0.6;
const FREEFORM_OPINION_CONFIDENCE: f64 = 0.7;

/// Structured iff the reply carries the credibility field and at least one
/// tagged claim.
pub fn is_structured(text: &str) -> bool {
    text.contains("Credibility:") && (text.contains("<fact>") || text.contains("<opinion>"))
}

/// Parse `raw` into a report. Pure: identical input yields identical output.
/// An empty/whitespace reply degrades to an error-flagged report with a
/// synthesized summary instead of failing.
pub fn parse_report(raw: &str, lexicon: Option<&SentimentLexicon>) -> AnalysisReport {
    if raw.trim().is_empty() {
        return AnalysisReport::degraded(EMPTY_REPLY_REASON);
    }
    let mut report = if is_structured(raw) {
        parse_structured(raw)
    } else {
        parse_freeform(raw)
    };

    // Bias is always recomputed by the deterministic detector; the model's
    // own Bias: line is superseded. Without an extracted summary the detector
    // and scorer see the whole reply, not the synthesized placeholder.
    let bias_input = if report.summary.is_empty() {
        raw
    } else {
        report.summary.as_str()
    };
    report.bias = bias::detect(bias_input, lexicon).render_findings();
    report.dimensions = resolve_dimensions(raw, bias_input, lexicon);
    if report.summary.is_empty() {
        report.summary = FALLBACK_SUMMARY.to_string();
    }
    report
}

fn parse_structured(raw: &str) -> AnalysisReport {
    let summary = extract_summary_structured(raw).unwrap_or_default();
    AnalysisReport {
        credibility: extract_credibility(raw).unwrap_or(0.0),
        facts: extract_tagged_claims(raw, &FACT_RE, "fact"),
        opinions: extract_tagged_claims(raw, &OPINION_RE, "opinion"),
        bias: Vec::new(),
        publisher_advice: extract_line_field(&PUB_RE, raw).unwrap_or_default(),
        pr_reply: extract_line_field(&PR_RE, raw).unwrap_or_default(),
        summary,
        dimensions: DimensionScores::default(),
    }
}

fn parse_freeform(raw: &str) -> AnalysisReport {
    let lines: Vec<&str> = raw.lines().collect();
    let (mut facts, mut opinions) = freeform_claims(&lines);
    if facts.is_empty() && opinions.is_empty() {
        // Line keywords found nothing; classify sentence by sentence so the
        // reply is never silently dropped.
        let classified = extractor::classify_sentences(raw);
        facts = classified.facts;
        opinions = classified.opinions;
    }
    AnalysisReport {
        credibility: freeform_credibility(raw, &lines),
        facts,
        opinions,
        bias: Vec::new(),
        publisher_advice: String::new(),
        pr_reply: String::new(),
        summary: freeform_summary(&lines),
        dimensions: DimensionScores::default(),
    }
}

/* ----------------------------
Structured field extraction
---------------------------- */

static CREDIBILITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Credibility:\s*(\d+(?:\.\d+)?)\s*/\s*10").expect("credibility regex"));

static FACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\d+\.?\d*\.conf:\s*(\d+\.?\d*)\s*<fact>(.*?)</fact>").expect("fact regex")
});

static OPINION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\d+\.?\d*\.conf:\s*(\d+\.?\d*)\s*<opinion>(.*?)</opinion>")
        .expect("opinion regex")
});

static SUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bSum:\s*([^\n]*)").expect("summary regex"));

static TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bText:\s*(.+)").expect("text-line regex"));

static WORD_LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\((?:≤|<=)\s*\d+\s*w\)").expect("word-limit regex"));

static PUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)\bPub:\s*([^\n]*?)\s*(?:\bPR:|\bSum:|$)").expect("pub regex"));

static PR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)\bPR:\s*([^\n]*?)\s*(?:\bSum:|$)").expect("pr regex"));

fn extract_credibility(text: &str) -> Option<f64> {
    CREDIBILITY_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Repeated `<n>.conf:<float> <tag>content</tag>` matches, in order of
/// appearance. Confidence parses to 0 when absent; content falls back to a
/// tag-stripped whole match when the interior capture is empty.
fn extract_tagged_claims(text: &str, re: &Regex, tag: &str) -> Vec<ExtractedClaim> {
    re.captures_iter(text)
        .map(|caps| {
            let confidence = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            let interior = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            let content = if interior.is_empty() {
                strip_tags(caps.get(0).map(|m| m.as_str()).unwrap_or(""), tag)
            } else {
                interior.to_string()
            };
            ExtractedClaim::new(content, confidence)
        })
        .collect()
}

fn strip_tags(text: &str, tag: &str) -> String {
    text.replace(&format!("<{tag}>"), "")
        .replace(&format!("</{tag}>"), "")
        .trim()
        .to_string()
}

fn extract_summary_structured(text: &str) -> Option<String> {
    if let Some(m) = SUM_RE.captures(text).and_then(|c| c.get(1)) {
        let cleaned = WORD_LIMIT_RE.replace_all(m.as_str(), "").trim().to_string();
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }
    TEXT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_line_field(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| WORD_LIMIT_RE.replace_all(m.as_str(), "").trim().to_string())
        .filter(|s| !s.is_empty())
}

/* ----------------------------
Free-form heuristics
---------------------------- */

const CREDIBILITY_PHRASES: &[&str] = &["credibility", "credibility score", "credibility might be"];
const FACT_KEYWORDS: &[&str] = &["fact", "claim", "states", "indicates", "shows", "demonstrates"];
const OPINION_KEYWORDS: &[&str] = &["opinion", "view", "believe", "think", "appears", "seems"];
const SUMMARY_PHRASES: &[&str] = &[
    "based on this analysis",
    "in summary",
    "conclusion",
    "important to approach",
];
const BOILERPLATE_MARKERS: &[&str] = &["structured format", "provided", "given"];

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("number regex"));

/// Markdown/list prefixes stripped off free-form claim lines.
static LINE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*|\*\*.*?\*\*:\s*").expect("line-prefix regex"));

fn freeform_credibility(raw: &str, lines: &[&str]) -> f64 {
    for line in lines {
        let lower = line.to_lowercase();
        if CREDIBILITY_PHRASES.iter().any(|p| lower.contains(p)) {
            if let Some(n) = NUMBER_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
            {
                return n;
            }
        }
    }
    let lower = raw.to_lowercase();
    if lower.contains("low") || lower.contains("skepticism") || lower.contains("lacking evidence") {
        3.0
    } else if lower.contains("high") || lower.contains("well") {
        7.0
    } else {
        5.0
    }
}

fn freeform_claims(lines: &[&str]) -> (Vec<ExtractedClaim>, Vec<ExtractedClaim>) {
    let mut facts = Vec::new();
    let mut opinions = Vec::new();
    for line in lines {
        let lower = line.to_lowercase();
        let cleaned = LINE_PREFIX_RE.replace_all(line, "").trim().to_string();
        if cleaned.len() <= 10 {
            continue;
        }
        // Fact lines are vetoed only by the literal word "opinion", not the
        // full opinion-keyword set. A known imprecision kept as-observed.
        if FACT_KEYWORDS.iter().any(|k| lower.contains(k)) && !lower.contains("opinion") {
            facts.push(ExtractedClaim::new(cleaned.clone(), FREEFORM_FACT_CONFIDENCE));
        }
        if OPINION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            opinions.push(ExtractedClaim::new(cleaned, FREEFORM_OPINION_CONFIDENCE));
        }
    }
    (facts, opinions)
}

fn freeform_summary(lines: &[&str]) -> String {
    for line in lines {
        let lower = line.to_lowercase();
        if SUMMARY_PHRASES.iter().any(|p| lower.contains(p)) {
            let cleaned = LINE_PREFIX_RE.replace_all(line, "").trim().to_string();
            if !cleaned.is_empty() {
                return cleaned;
            }
        }
    }
    let meaningful: Vec<&&str> = lines
        .iter()
        .filter(|line| {
            let lower = line.to_lowercase();
            line.len() > 50 && !BOILERPLATE_MARKERS.iter().any(|m| lower.contains(m))
        })
        .collect();
    if let Some(last) = meaningful.last() {
        let mut s: String = last.chars().take(150).collect();
        s.push_str("...");
        return s;
    }
    FALLBACK_SUMMARY.to_string()
}

/* ----------------------------
Dimensions
---------------------------- */

static DIM_TS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Source Credibility:\s*(\d+(?:\.\d+)?)").expect("ts regex"));
static DIM_FD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Fact Density:\s*(\d+(?:\.\d+)?)").expect("fd regex"));
static DIM_EB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Emotional (?:Neutrality|Balance):\s*(\d+(?:\.\d+)?)").expect("eb regex")
});
static DIM_CS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bConsistency:\s*(\d+(?:\.\d+)?)").expect("cs regex"));

fn dim_field(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Model-emitted dimension fields when present, each independently optional;
/// anything missing is filled by the deterministic scorer over the summary
/// (whole reply when there is none).
fn resolve_dimensions(
    raw: &str,
    scored_text: &str,
    lexicon: Option<&SentimentLexicon>,
) -> DimensionScores {
    let computed = dimensions::score(scored_text, lexicon);
    DimensionScores {
        ts: dim_field(&DIM_TS_RE, raw).unwrap_or(computed.ts),
        fd: dim_field(&DIM_FD_RE, raw).unwrap_or(computed.fd),
        eb: dim_field(&DIM_EB_RE, raw).unwrap_or(computed.eb),
        cs: dim_field(&DIM_CS_RE, raw).unwrap_or(computed.cs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_predicate_needs_credibility_and_a_tag() {
        assert!(is_structured("Credibility:8/10 <fact>x</fact>"));
        assert!(is_structured("Credibility:8/10 <opinion>x</opinion>"));
        assert!(!is_structured("Credibility:8/10 nothing tagged"));
        assert!(!is_structured("<fact>x</fact> but no score"));
    }

    #[test]
    fn credibility_parses_fractional_scores() {
        assert_eq!(extract_credibility("Credibility: 7.5/10"), Some(7.5));
        assert_eq!(extract_credibility("credibility:3/10"), Some(3.0));
        assert_eq!(extract_credibility("Credibility: high"), None);
    }

    #[test]
    fn tagged_claims_keep_order_and_confidence() {
        let text = "Facts:1.conf:0.90 <fact>First</fact>\n2.conf:0.40 <fact>Second</fact>";
        let claims = extract_tagged_claims(text, &FACT_RE, "fact");
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].content, "First");
        assert_eq!(claims[0].confidence, 0.9);
        assert_eq!(claims[1].content, "Second");
        assert_eq!(claims[1].confidence, 0.4);
    }

    #[test]
    fn summary_strips_word_limit_annotation() {
        let s = extract_summary_structured("Sum: Vote happens tomorrow (≤8w)").unwrap();
        assert_eq!(s, "Vote happens tomorrow");
    }

    #[test]
    fn summary_falls_back_to_text_line() {
        let s = extract_summary_structured("Text: Original body here").unwrap();
        assert_eq!(s, "Original body here");
    }

    #[test]
    fn pub_and_pr_split_a_shared_line() {
        let raw = "Pub:verify sourcing(≤15w) PR:we are reviewing(≤8w) Sum:short";
        assert_eq!(
            extract_line_field(&PUB_RE, raw).as_deref(),
            Some("verify sourcing")
        );
        assert_eq!(
            extract_line_field(&PR_RE, raw).as_deref(),
            Some("we are reviewing")
        );
    }

    #[test]
    fn freeform_credibility_keyword_fallbacks() {
        assert_eq!(freeform_credibility("evidence is lacking, low trust", &[]), 3.0);
        assert_eq!(freeform_credibility("the piece is well sourced", &[]), 7.0);
        assert_eq!(freeform_credibility("nothing to say", &[]), 5.0);
    }

    #[test]
    fn freeform_credibility_prefers_explicit_number() {
        let lines = vec!["The credibility score is around 6 out of ten."];
        assert_eq!(freeform_credibility(lines[0], &lines), 6.0);
    }

    #[test]
    fn freeform_summary_picks_conclusion_cue_first() {
        let lines = vec![
            "Some long meandering line that is definitely over fifty characters in length.",
            "In summary, treat the article with care.",
        ];
        assert_eq!(freeform_summary(&lines), "In summary, treat the article with care.");
    }

    #[test]
    fn freeform_summary_excludes_boilerplate_lines() {
        let lines = vec![
            "The response could not follow the structured format that was expected of it here.",
            "A closing thought that runs past the fifty character threshold easily enough.",
        ];
        let s = freeform_summary(&lines);
        assert!(s.starts_with("A closing thought"));
        assert!(s.ends_with("..."));
    }

    #[test]
    fn freeform_summary_canned_fallback() {
        assert_eq!(freeform_summary(&["short line"]), FALLBACK_SUMMARY);
    }

    #[test]
    fn model_dimension_fields_override_computed() {
        let raw = "Source Credibility: 9\nFact Density: 4.5\nplain text";
        let d = resolve_dimensions(raw, "plain text", None);
        assert_eq!(d.ts, 9.0);
        assert_eq!(d.fd, 4.5);
        // eb/cs missing: filled from the scorer (no lexicon -> defaults).
        assert_eq!(d.eb, 5.0);
        assert_eq!(d.cs, 5.0);
    }

    #[test]
    fn empty_reply_degrades_without_panic() {
        let r = parse_report("   \n ", None);
        assert_eq!(r.credibility, 0.0);
        assert!(!r.summary.is_empty());
        assert_eq!(r.summary, EMPTY_REPLY_REASON);
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = "Credibility:8/10\nFacts:1.conf:0.90<fact>X</fact>\nSum:Z";
        assert_eq!(parse_report(raw, None), parse_report(raw, None));
    }
}
