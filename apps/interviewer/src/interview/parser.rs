//! Response Parser: tolerant extraction from free-text completions.
//!
//! Model output is uncontrolled, so every extractor is a pure function that
//! degrades to an empty/default value instead of failing. Layers are exposed
//! individually so each can be tested on its own.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::interview::evaluator::{Decision, EvaluationResult};

/// Score used when the SCORE section is missing or carries no number.
pub const DEFAULT_SCORE: u32 = 50;

static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]*(.+)$").expect("numbered pattern"));
static Q_PREFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*Q\d*[ \t]*[:.)][ \t]*(.+)$").expect("Q pattern"));
static BULLETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-•*][ \t]+(.+)$").expect("bullet pattern"));
static FOLLOW_UP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)follow[- ]?up question[ \t]*:").expect("follow-up marker"));
static NEW_QUESTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)new question[ \t]*:").expect("new question marker"));
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^[ \t#*]*(?:\d+[.)][ \t]*)?(SCORE|DECISION|DETAILED FEEDBACK|STRENGTHS|AREAS FOR IMPROVEMENT|WEAKNESSES)[ \t*]*:[ \t*]*",
    )
    .expect("heading pattern")
});
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("number pattern"));

const FIT_WORDS: [&str; 5] = ["fit", "qualified", "yes", "hire", "pass"];
const NEGATORS: [&str; 6] = ["not", "no", "non", "cannot", "never", "don"];
/// A negator only counts this many words before an affirmative word.
const NEGATION_REACH: usize = 3;
const REJECTION_WORDS: [&str; 4] = ["unfit", "unqualified", "reject", "rejected"];

// ────────────────────────────────────────────────────────────────────────────
// Question lists
// ────────────────────────────────────────────────────────────────────────────

/// `1. Question` / `2) Question` lines.
pub fn numbered_items(text: &str) -> Vec<String> {
    capture_items(&NUMBERED, text)
}

/// `Q: Question` / `Q3: Question` lines.
pub fn q_prefixed_items(text: &str) -> Vec<String> {
    capture_items(&Q_PREFIXED, text)
}

/// `- Question`, `• Question`, `* Question` lines.
pub fn bulleted_items(text: &str) -> Vec<String> {
    capture_items(&BULLETED, text)
}

/// Any line ending in `?`.
pub fn question_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(clean_item)
        .filter(|line| line.ends_with('?'))
        .collect()
}

/// Questions from a list-shaped response.
///
/// The three list layers are not exclusive: models mix formats, so every
/// layer that matches contributes, in layer order, without duplicates. Only
/// when none match do we fall back to `?`-terminated lines. An empty result
/// means the caller must use its own defaults.
pub fn extract_questions(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let layers = [numbered_items(text), q_prefixed_items(text), bulleted_items(text)];
    let mut questions: Vec<String> = layers
        .into_iter()
        .flatten()
        .filter(|q| seen.insert(q.clone()))
        .collect();

    if questions.is_empty() {
        questions = question_lines(text);
    }
    questions
}

// ────────────────────────────────────────────────────────────────────────────
// Follow-up decision and single questions
// ────────────────────────────────────────────────────────────────────────────

/// True when `YES` appears anywhere in the response, in any case.
///
/// Deliberately low precision: "yesterday" or a quoted "yes" also count. The
/// follow-up prompt asks for a bare YES/NO and tightening this would change
/// which answers get probed.
pub fn wants_follow_up(text: &str) -> bool {
    text.to_uppercase().contains("YES")
}

/// The follow-up question in a completion. Text after a
/// `FOLLOW-UP QUESTION:` marker wins; otherwise the first line ending in `?`,
/// otherwise the first line that is not a bare YES/NO.
pub fn extract_follow_up_question(text: &str) -> Option<String> {
    single_question(after_marker(&FOLLOW_UP_MARKER, text).unwrap_or(text))
}

/// A freshly generated question: the first list/`?` question in the text
/// (after any `New Question:` label), else the first meaningful line.
pub fn extract_generated_question(text: &str) -> Option<String> {
    let body = after_marker(&NEW_QUESTION_MARKER, text).unwrap_or(text);
    extract_questions(body)
        .into_iter()
        .next()
        .or_else(|| single_question(body))
}

fn single_question(text: &str) -> Option<String> {
    let lines: Vec<String> = text
        .lines()
        .map(clean_item)
        .filter(|line| !line.is_empty() && !is_bare_decision(line))
        .collect();
    lines
        .iter()
        .find(|line| line.ends_with('?'))
        .or_else(|| lines.first())
        .cloned()
}

fn after_marker<'a>(marker: &Regex, text: &'a str) -> Option<&'a str> {
    marker.find(text).map(|m| &text[m.end()..])
}

fn is_bare_decision(line: &str) -> bool {
    let word = line.trim_matches(|c: char| !c.is_alphanumeric());
    word.eq_ignore_ascii_case("yes") || word.eq_ignore_ascii_case("no")
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Splits an evaluation response into its headed sections. Headings are
/// recognised at line start in any case, optionally numbered or wrapped in
/// markdown emphasis. `WEAKNESSES` is filed under `AREAS FOR IMPROVEMENT`.
/// The first occurrence of a heading wins.
pub fn evaluation_sections(text: &str) -> HashMap<&'static str, &str> {
    let matches: Vec<(usize, usize, &'static str)> = HEADING
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = canonical_heading(&caps[1])?;
            Some((whole.start(), whole.end(), name))
        })
        .collect();

    let mut sections = HashMap::new();
    for (i, (_, body_start, name)) in matches.iter().enumerate() {
        let body_end = matches.get(i + 1).map(|next| next.0).unwrap_or(text.len());
        sections
            .entry(*name)
            .or_insert_with(|| text[*body_start..body_end].trim());
    }
    sections
}

fn canonical_heading(raw: &str) -> Option<&'static str> {
    match raw.to_uppercase().as_str() {
        "SCORE" => Some("SCORE"),
        "DECISION" => Some("DECISION"),
        "DETAILED FEEDBACK" => Some("DETAILED FEEDBACK"),
        "STRENGTHS" => Some("STRENGTHS"),
        "AREAS FOR IMPROVEMENT" | "WEAKNESSES" => Some("AREAS FOR IMPROVEMENT"),
        _ => None,
    }
}

/// First number in the SCORE section, rounded and clamped to 0..=100.
pub fn parse_score(section: Option<&str>) -> u32 {
    section
        .and_then(|body| NUMBER.find(body))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|score| score.clamp(0.0, 100.0).round() as u32)
        .unwrap_or(DEFAULT_SCORE)
}

/// Classifies the first line of the DECISION section. "Not Fit", "not a
/// fit" and "no hire" read as Not Fit, as does any outright rejection word.
/// A negation elsewhere on the line ("Fit - no concerns") does not count.
pub fn classify_decision(section: Option<&str>) -> Decision {
    let line = match section.and_then(|body| body.lines().next()) {
        Some(line) => line.to_lowercase(),
        None => return Decision::NotFit,
    };
    let words: Vec<&str> = line
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();

    if words.iter().any(|word| REJECTION_WORDS.contains(word)) {
        return Decision::NotFit;
    }

    let mut affirmed = false;
    for (i, word) in words.iter().enumerate() {
        if !FIT_WORDS.iter().any(|fit| word.starts_with(fit)) {
            continue;
        }
        let reach = &words[i.saturating_sub(NEGATION_REACH)..i];
        if reach.iter().any(|before| NEGATORS.contains(before)) {
            return Decision::NotFit;
        }
        affirmed = true;
    }

    if affirmed {
        Decision::Fit
    } else {
        Decision::NotFit
    }
}

/// Bullet lines (`-`, `•`, `*`) of a section, markers stripped.
pub fn bullet_list(section: Option<&str>) -> Vec<String> {
    let Some(body) = section else {
        return Vec::new();
    };
    body.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with("**"))
        .filter_map(|line| {
            line.strip_prefix('-')
                .or_else(|| line.strip_prefix('•'))
                .or_else(|| line.strip_prefix('*'))
        })
        .map(clean_item)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parses an evaluation response. Total: any input yields a result, with
/// missing sections falling back to score 50, Not Fit and empty text/lists.
pub fn parse_evaluation(text: &str) -> EvaluationResult {
    let sections = evaluation_sections(text);
    EvaluationResult {
        score: parse_score(sections.get("SCORE").copied()),
        decision: classify_decision(sections.get("DECISION").copied()),
        feedback: sections
            .get("DETAILED FEEDBACK")
            .map(|s| s.to_string())
            .unwrap_or_default(),
        strengths: bullet_list(sections.get("STRENGTHS").copied()),
        weaknesses: bullet_list(sections.get("AREAS FOR IMPROVEMENT").copied()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn capture_items(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .map(|caps| clean_item(&caps[1]))
        .filter(|item| !item.is_empty())
        .collect()
}

/// Trims whitespace, markdown emphasis and wrapping quotes.
fn clean_item(raw: &str) -> String {
    raw.trim()
        .trim_matches('*')
        .trim()
        .trim_matches('"')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list_extracted() {
        let text = "Here are your questions:\n1. What is ownership?\n2) How does borrowing work?\n";
        assert_eq!(
            extract_questions(text),
            vec!["What is ownership?", "How does borrowing work?"]
        );
    }

    #[test]
    fn test_q_prefixed_extracted() {
        let text = "Q: Describe your last project.\nQ2: What went wrong?";
        assert_eq!(
            q_prefixed_items(text),
            vec!["Describe your last project.", "What went wrong?"]
        );
    }

    #[test]
    fn test_bullets_extracted_with_any_marker() {
        let text = "- First?\n• Second?\n* Third?\n**Bold heading**";
        assert_eq!(bulleted_items(text), vec!["First?", "Second?", "Third?"]);
    }

    #[test]
    fn test_mixed_formats_accumulate_in_layer_order() {
        let text = "1. Numbered one?\nQ: Prefixed one?\n- Bulleted one?";
        assert_eq!(
            extract_questions(text),
            vec!["Numbered one?", "Prefixed one?", "Bulleted one?"]
        );
    }

    #[test]
    fn test_question_mark_fallback_when_no_list() {
        let text = "Let me think.\nWhat motivates you?\nThanks.";
        assert_eq!(extract_questions(text), vec!["What motivates you?"]);
    }

    #[test]
    fn test_nothing_recognisable_yields_empty() {
        assert!(extract_questions("No questions here.").is_empty());
        assert!(extract_questions("").is_empty());
    }

    #[test]
    fn test_follow_up_decision_is_substring_yes() {
        assert!(wants_follow_up("YES"));
        assert!(wants_follow_up("yes, the answer was vague"));
        // Known false positive, kept on purpose
        assert!(wants_follow_up("Yesterday they said enough."));
        assert!(!wants_follow_up("NO"));
        assert!(!wants_follow_up(""));
    }

    #[test]
    fn test_follow_up_question_after_marker() {
        assert_eq!(
            extract_follow_up_question("YES\nFOLLOW-UP QUESTION: Can you elaborate?").as_deref(),
            Some("Can you elaborate?")
        );
        assert_eq!(
            extract_follow_up_question("Follow-up question:\n\"Which index did you add?\"")
                .as_deref(),
            Some("Which index did you add?")
        );
    }

    #[test]
    fn test_follow_up_question_without_marker() {
        assert_eq!(
            extract_follow_up_question("Sure, here is one:\nHow did you measure the gain?")
                .as_deref(),
            Some("How did you measure the gain?")
        );
        assert_eq!(
            extract_follow_up_question("YES\nTell me more about the rollout.").as_deref(),
            Some("Tell me more about the rollout.")
        );
        assert!(extract_follow_up_question("YES").is_none());
        assert!(extract_follow_up_question("   ").is_none());
    }

    #[test]
    fn test_generated_question_strips_label() {
        assert_eq!(
            extract_generated_question("New Question: How do you approach on-call?").as_deref(),
            Some("How do you approach on-call?")
        );
        assert_eq!(
            extract_generated_question("1. What would you automate first?\n2. Why?").as_deref(),
            Some("What would you automate first?")
        );
        assert_eq!(
            extract_generated_question("Describe your ideal code review.").as_deref(),
            Some("Describe your ideal code review.")
        );
        assert!(extract_generated_question("").is_none());
    }

    const FULL_EVALUATION: &str = "SCORE: 82\nDECISION: Fit\n\nDETAILED FEEDBACK:\nStrong SQL depth.\nClear communicator.\n\nSTRENGTHS:\n- Query tuning\n• Clear explanations\n* Ownership\n\nAREAS FOR IMPROVEMENT:\n- System design breadth\n- Testing discipline\n";

    #[test]
    fn test_full_evaluation_parsed() {
        let result = parse_evaluation(FULL_EVALUATION);
        assert_eq!(result.score, 82);
        assert_eq!(result.decision, Decision::Fit);
        assert_eq!(result.feedback, "Strong SQL depth.\nClear communicator.");
        assert_eq!(
            result.strengths,
            vec!["Query tuning", "Clear explanations", "Ownership"]
        );
        assert_eq!(
            result.weaknesses,
            vec!["System design breadth", "Testing discipline"]
        );
    }

    #[test]
    fn test_not_fit_is_not_misread_as_fit() {
        let result = parse_evaluation("SCORE: 30\nDECISION: Not Fit\n");
        assert_eq!(result.decision, Decision::NotFit);
        assert_eq!(
            classify_decision(Some("Unqualified for this level")),
            Decision::NotFit
        );
        assert_eq!(classify_decision(Some("No hire")), Decision::NotFit);
        assert_eq!(classify_decision(Some("Not a good fit")), Decision::NotFit);
        assert_eq!(classify_decision(Some("Non-fit")), Decision::NotFit);
    }

    #[test]
    fn test_negation_elsewhere_on_line_keeps_fit() {
        assert_eq!(classify_decision(Some("Fit - no concerns")), Decision::Fit);
        assert_eq!(
            classify_decision(Some("Hire, nothing that cannot be coached")),
            Decision::Fit
        );
        let result = parse_evaluation("SCORE: 88\nDECISION: Fit - no major concerns\n");
        assert_eq!(result.decision, Decision::Fit);
    }

    #[test]
    fn test_affirmative_decision_words() {
        for word in ["Fit", "Qualified", "Yes", "Strong hire", "Pass"] {
            assert_eq!(classify_decision(Some(word)), Decision::Fit, "{word}");
        }
        assert_eq!(classify_decision(Some("Undecided")), Decision::NotFit);
    }

    #[test]
    fn test_markdown_and_lowercase_headings() {
        let text = "**Score:** 91/100\n## Decision: fit\ndetailed feedback: Great.\nWeaknesses:\n- Rushed answers";
        let result = parse_evaluation(text);
        assert_eq!(result.score, 91);
        assert_eq!(result.decision, Decision::Fit);
        assert_eq!(result.feedback, "Great.");
        assert_eq!(result.weaknesses, vec!["Rushed answers"]);
    }

    #[test]
    fn test_score_clamped_and_rounded() {
        assert_eq!(parse_score(Some("140")), 100);
        assert_eq!(parse_score(Some("72.6")), 73);
        assert_eq!(parse_score(Some("-5")), 0);
        assert_eq!(parse_score(Some("-0.4 out of 100")), 0);
        assert_eq!(parse_score(Some("[not given]")), DEFAULT_SCORE);
        assert_eq!(parse_score(None), DEFAULT_SCORE);
    }

    #[test]
    fn test_evaluation_parser_is_total() {
        for text in [
            "",
            "The candidate was fine.",
            "SCORE:",
            "DECISION:",
            "STRENGTHS:\n\nAREAS FOR IMPROVEMENT:",
            "SCORE: 99999999999999999999999",
            "SCORE: -5\nDECISION: ✓✓✓",
            FULL_EVALUATION,
        ] {
            let result = parse_evaluation(text);
            assert!(result.score <= 100, "{text}");
            assert!(matches!(result.decision, Decision::Fit | Decision::NotFit));
        }
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let result = parse_evaluation("Nothing structured at all.");
        assert_eq!(result.score, DEFAULT_SCORE);
        assert_eq!(result.decision, Decision::NotFit);
        assert!(result.feedback.is_empty());
        assert!(result.strengths.is_empty());
        assert!(result.weaknesses.is_empty());
    }

    #[test]
    fn test_first_heading_occurrence_wins() {
        let sections = evaluation_sections("SCORE: 10\nSCORE: 90\n");
        assert_eq!(sections.get("SCORE").copied(), Some("10"));
    }
}
