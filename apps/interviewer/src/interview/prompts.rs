//! Prompt templates for the interview engine and strict placeholder substitution.
//!
//! Placeholders are `{lower_snake}` names. `render_template` refuses to run if
//! any placeholder in the template has no value, so a prompt can never reach
//! the model with literal `{job_role}` text in it. Substitution is a single
//! pass: values that happen to contain braces are inserted verbatim.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("template placeholder '{{{0}}}' has no value")]
    MissingPlaceholder(String),
}

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// Placeholder names in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Fills every `{name}` in `template` from `vars`.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|name| !vars.iter().any(|(key, _)| *key == name.as_str()))
    {
        return Err(TemplateError::MissingPlaceholder(missing));
    }

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        vars.iter()
            .find(|(key, _)| *key == &caps[1])
            .map(|(_, value)| value.to_string())
            .unwrap_or_default()
    });
    Ok(rendered.into_owned())
}

/// Initial question-set prompt (HR preview).
/// Replace: {job_role}, {job_description}, {candidate_skills}, {difficulty}
pub const QUESTION_SET_PROMPT: &str = r#"You are conducting a job interview for the position of {job_role}.

Job Description:
{job_description}

Candidate's Skills:
{candidate_skills}

Based on the job description and candidate's skills, generate 10 relevant interview questions.
The difficulty level should be: {difficulty}

Remember to:
1. Include technical questions relevant to the job role
2. Ask about specific skills mentioned in the job description
3. Include behavioral questions to assess soft skills
4. Adjust the complexity based on the specified difficulty level
5. Format each question clearly and concisely

Return ONLY the questions as a numbered list, one per line, without any additional text."#;

/// Follow-up judgment prompt. The parser only looks for YES.
/// Replace: {job_role}, {job_description}, {question}, {answer}
pub const FOLLOW_UP_CHECK_PROMPT: &str = r#"Analyze this interview exchange and determine if a follow-up question is needed.

Job Role: {job_role}
Job Description: {job_description}

Question: {question}
Answer: {answer}

Should we ask a follow-up question? (YES/NO)
If YES, briefly explain why."#;

/// Follow-up generation prompt.
/// Replace: {job_role}, {job_description}, {question}, {answer}, {plain_text_instruction}
pub const FOLLOW_UP_QUESTION_PROMPT: &str = r#"Based on this interview exchange, generate one relevant follow-up question.

Job Role: {job_role}
Job Description: {job_description}

Original Question: {question}
Candidate's Answer: {answer}

Generate a follow-up question that:
1. Digs deeper into the candidate's response
2. Explores related aspects not covered
3. Is relevant to the job requirements

{plain_text_instruction}

Follow-up Question:"#;

/// Fresh question prompt used once the bank is exhausted.
/// Replace: {job_role}, {job_description}, {asked_questions}, {conversation}, {plain_text_instruction}
pub const NEW_QUESTION_PROMPT: &str = r#"Generate one new interview question based on:
- Job requirements for {job_role}
- The conversation so far
- Ensuring it's different from previous questions

Job Description: {job_description}

Questions already asked:
{asked_questions}

Conversation History:
{conversation}

The question should:
1. Cover a new aspect not discussed yet
2. Be relevant to the position
3. Be open-ended to encourage detailed response

{plain_text_instruction}

New Question:"#;

/// Post-interview evaluation prompt.
/// Replace: {job_role}, {job_description}, {transcript_json}
pub const EVALUATION_PROMPT: &str = r#"Evaluate this job interview for the position of {job_role}.

Job Description: {job_description}

Interview Transcript:
{transcript_json}

Please provide:
1. A score from 0-100 where 100 is perfect
2. A decision: "Fit" or "Not Fit"
3. Detailed feedback with specific strengths and areas for improvement
4. List of 3-5 specific strengths
5. List of 3-5 specific areas for improvement

Format your response like this:
SCORE: [0-100]
DECISION: [Fit/Not Fit]

DETAILED FEEDBACK:
[Your comprehensive evaluation]

STRENGTHS:
- [Strength 1]
- [Strength 2]
- [Strength 3]

AREAS FOR IMPROVEMENT:
- [Area 1]
- [Area 2]
- [Area 3]"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let out = render_template(
            "Role: {job_role}. Again: {job_role}. Level: {difficulty}",
            &[("job_role", "Backend Engineer"), ("difficulty", "Hard")],
        )
        .unwrap();
        assert_eq!(out, "Role: Backend Engineer. Again: Backend Engineer. Level: Hard");
    }

    #[test]
    fn test_render_fails_loudly_on_missing_placeholder() {
        let err = render_template(
            "Role: {job_role}, skills: {candidate_skills}",
            &[("job_role", "Backend Engineer")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingPlaceholder("candidate_skills".to_string())
        );
    }

    #[test]
    fn test_render_does_not_resubstitute_values() {
        // A candidate answer containing placeholder-looking text stays literal
        let out = render_template(
            "Q: {question}\nA: {answer}",
            &[("question", "Explain {answer}"), ("answer", "fn main() {}")],
        )
        .unwrap();
        assert_eq!(out, "Q: Explain {answer}\nA: fn main() {}");
    }

    #[test]
    fn test_placeholders_listed_once_in_order() {
        assert_eq!(
            placeholders(FOLLOW_UP_CHECK_PROMPT),
            vec!["job_role", "job_description", "question", "answer"]
        );
    }

    #[test]
    fn test_every_template_renders_with_its_documented_values() {
        let cases: [(&str, &[&str]); 5] = [
            (
                QUESTION_SET_PROMPT,
                &["job_role", "job_description", "candidate_skills", "difficulty"],
            ),
            (
                FOLLOW_UP_CHECK_PROMPT,
                &["job_role", "job_description", "question", "answer"],
            ),
            (
                FOLLOW_UP_QUESTION_PROMPT,
                &[
                    "job_role",
                    "job_description",
                    "question",
                    "answer",
                    "plain_text_instruction",
                ],
            ),
            (
                NEW_QUESTION_PROMPT,
                &[
                    "job_role",
                    "job_description",
                    "asked_questions",
                    "conversation",
                    "plain_text_instruction",
                ],
            ),
            (
                EVALUATION_PROMPT,
                &["job_role", "job_description", "transcript_json"],
            ),
        ];

        for (template, names) in cases {
            let vars: Vec<(&str, &str)> = names.iter().map(|n| (*n, "x")).collect();
            let rendered = render_template(template, &vars).unwrap();
            assert!(placeholders(&rendered).is_empty(), "leftover in {rendered}");
        }
    }
}
