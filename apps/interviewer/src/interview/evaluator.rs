//! Evaluator: one completion call over the whole transcript.
//!
//! Total by construction: a failed or timed-out call yields the fallback
//! result, and the parser turns any text into a result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::interview::context::InterviewContext;
use crate::interview::parser::parse_evaluation;
use crate::interview::prompts::{render_template, EVALUATION_PROMPT};
use crate::llm_client::{complete_within, CompletionClient};
use crate::models::result::TranscriptEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "Fit")]
    Fit,
    #[serde(rename = "Not Fit")]
    NotFit,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Fit => "Fit",
            Decision::NotFit => "Not Fit",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// 0..=100
    pub score: u32,
    pub decision: Decision,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl EvaluationResult {
    /// Returned when the model could not be reached at all.
    pub fn fallback() -> Self {
        Self {
            score: 50,
            decision: Decision::NotFit,
            feedback: "Automatic evaluation was unavailable; please review the transcript manually."
                .to_string(),
            strengths: vec!["Completed the interview".to_string()],
            weaknesses: vec!["Could not be assessed automatically".to_string()],
        }
    }

    /// Recorded for an interview that ended before any answer was given.
    pub fn no_responses() -> Self {
        Self {
            score: 0,
            decision: Decision::NotFit,
            feedback: "No responses were recorded for this interview.".to_string(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
        }
    }
}

/// Wire shape of one transcript entry inside the evaluation prompt.
#[derive(Serialize)]
struct PromptEntry<'a> {
    #[serde(rename = "Q")]
    question: &'a str,
    #[serde(rename = "A")]
    answer: &'a str,
    follow_up: bool,
}

pub struct Evaluator {
    llm: Arc<dyn CompletionClient>,
    timeout: Duration,
}

impl Evaluator {
    pub fn new(llm: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn evaluate(
        &self,
        context: &InterviewContext,
        transcript: &[TranscriptEntry],
    ) -> EvaluationResult {
        let Some(prompt) = build_evaluation_prompt(context, transcript) else {
            return EvaluationResult::fallback();
        };

        match complete_within(self.llm.as_ref(), &prompt, self.timeout).await {
            Ok(text) => {
                let result = parse_evaluation(&text);
                info!(
                    "Evaluation parsed: score={}, decision={}, {} strengths, {} weaknesses",
                    result.score,
                    result.decision,
                    result.strengths.len(),
                    result.weaknesses.len()
                );
                result
            }
            Err(e) => {
                warn!("Evaluation call failed, using fallback result: {e}");
                EvaluationResult::fallback()
            }
        }
    }
}

fn build_evaluation_prompt(
    context: &InterviewContext,
    transcript: &[TranscriptEntry],
) -> Option<String> {
    let entries: Vec<PromptEntry> = transcript
        .iter()
        .map(|entry| PromptEntry {
            question: &entry.question,
            answer: &entry.answer,
            follow_up: entry.is_follow_up,
        })
        .collect();

    let transcript_json = match serde_json::to_string_pretty(&entries) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize transcript: {e}");
            return None;
        }
    };

    match render_template(
        EVALUATION_PROMPT,
        &[
            ("job_role", context.job_role.as_str()),
            ("job_description", context.job_description.as_str()),
            ("transcript_json", transcript_json.as_str()),
        ],
    ) {
        Ok(prompt) => Some(prompt),
        Err(e) => {
            warn!("Failed to render evaluation prompt: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::stub::StubCompletion;
    use crate::models::interview::Difficulty;

    fn context() -> InterviewContext {
        InterviewContext {
            job_role: "Data Engineer".to_string(),
            job_description: "Own the warehouse.".to_string(),
            difficulty: Difficulty::Hard,
            custom_questions: vec![],
            skills: vec![],
        }
    }

    fn transcript() -> Vec<TranscriptEntry> {
        vec![
            TranscriptEntry {
                question: "How do you model slowly changing dimensions?".to_string(),
                answer: "Type 2 with validity ranges.".to_string(),
                is_follow_up: false,
            },
            TranscriptEntry {
                question: "Why not type 1?".to_string(),
                answer: "We need history.".to_string(),
                is_follow_up: true,
            },
        ]
    }

    #[tokio::test]
    async fn test_evaluate_parses_model_output() {
        let stub = Arc::new(StubCompletion::always(
            "SCORE: 77\nDECISION: Fit\nDETAILED FEEDBACK:\nSolid.\nSTRENGTHS:\n- Modelling\nAREAS FOR IMPROVEMENT:\n- Cost awareness",
        ));
        let evaluator = Evaluator::new(stub.clone(), Duration::from_secs(5));

        let result = evaluator.evaluate(&context(), &transcript()).await;
        assert_eq!(result.score, 77);
        assert_eq!(result.decision, Decision::Fit);
        assert_eq!(result.feedback, "Solid.");
        assert_eq!(result.strengths, vec!["Modelling"]);
        assert_eq!(result.weaknesses, vec!["Cost awareness"]);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_transcript_as_json() {
        let stub = Arc::new(StubCompletion::always("SCORE: 60"));
        let evaluator = Evaluator::new(stub.clone(), Duration::from_secs(5));
        evaluator.evaluate(&context(), &transcript()).await;

        let prompt = &stub.prompts()[0];
        assert!(prompt.contains("position of Data Engineer"));
        assert!(prompt.contains(r#""Q": "Why not type 1?""#));
        assert!(prompt.contains(r#""A": "We need history.""#));
        assert!(prompt.contains(r#""follow_up": true"#));
    }

    #[tokio::test]
    async fn test_failure_returns_fallback() {
        let evaluator = Evaluator::new(Arc::new(StubCompletion::failing()), Duration::from_secs(5));
        let result = evaluator.evaluate(&context(), &transcript()).await;
        assert_eq!(result, EvaluationResult::fallback());
        assert_eq!(result.strengths.len(), 1);
        assert_eq!(result.weaknesses.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_returns_fallback() {
        let evaluator =
            Evaluator::new(Arc::new(StubCompletion::hanging()), Duration::from_secs(30));
        let result = evaluator.evaluate(&context(), &transcript()).await;
        assert_eq!(result.score, 50);
        assert_eq!(result.decision, Decision::NotFit);
    }

    #[tokio::test]
    async fn test_unstructured_output_uses_parser_defaults() {
        let evaluator = Evaluator::new(
            Arc::new(StubCompletion::always("I think they did okay.")),
            Duration::from_secs(5),
        );
        let result = evaluator.evaluate(&context(), &transcript()).await;
        assert_eq!(result.score, 50);
        assert_eq!(result.decision, Decision::NotFit);
        assert!(result.feedback.is_empty());
    }

    #[test]
    fn test_decision_serializes_with_space() {
        assert_eq!(serde_json::to_string(&Decision::NotFit).unwrap(), r#""Not Fit""#);
    }
}
