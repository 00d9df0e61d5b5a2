//! Question Orchestrator: decides what the candidate is asked next.
//!
//! `next_question` is the only entry point that mutates a `SessionState`.
//! Step order per call:
//!   1. Ingest the previous answer (staged, committed with the outcome);
//!      a blank answer counts as no answer
//!   2. Follow-up check → maybe return `n.1` without touching the bank
//!   3. Build the bank on first use
//!   4. Compute the next primary id, enforce the cap
//!   5. Draw from an unused category first, then the custom HR questions,
//!      then any non-empty category
//!   6. A generated question once the bank is empty
//!
//! All completion calls happen before any state is written, so a call
//! abandoned at an await point leaves the session exactly as it was. Every
//! downstream failure is absorbed here with a fallback; callers always get a
//! record back.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::interview::context::InterviewContext;
use crate::interview::parser::{
    extract_follow_up_question, extract_generated_question, extract_questions, wants_follow_up,
};
use crate::interview::prompts::{
    render_template, TemplateError, FOLLOW_UP_CHECK_PROMPT, FOLLOW_UP_QUESTION_PROMPT,
    NEW_QUESTION_PROMPT, QUESTION_SET_PROMPT,
};
use crate::interview::question_bank::{build_question_bank, QuestionBank, QuestionCategory};
use crate::interview::question_id::QuestionId;
use crate::interview::session::SessionState;
use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;
use crate::llm_client::{complete_within, CompletionClient, LlmError};

/// Absolute ceiling on primary questions per interview.
pub const DEFAULT_MAX_PRIMARY_QUESTIONS: u32 = 50;

pub const CLOSING_STATEMENT: &str =
    "Thank you for your time. That concludes the interview; we will be in touch soon.";

/// Generic questions used when the model gives us nothing usable.
pub const DEFAULT_QUESTIONS: [&str; 5] = [
    "Tell me about your background and experience relevant to this role.",
    "What are your key strengths and how do they apply to this position?",
    "Describe a challenging project you worked on and how you handled it.",
    "How do you keep your skills current in this field?",
    "Where would you like to grow professionally over the next few years?",
];

const LAST_RESORT_QUESTION: &str =
    "Is there anything else about your experience you would like us to know?";

/// One issued question, as handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub question: String,
    pub is_follow_up: bool,
    pub follow_up_to: Option<QuestionId>,
    pub category: Option<QuestionCategory>,
    /// Set only on the terminal record; the caller must stop asking.
    pub interview_complete: bool,
}

impl QuestionRecord {
    pub fn primary(id: u32, question: String, category: Option<QuestionCategory>) -> Self {
        Self {
            id: QuestionId::Primary(id),
            question,
            is_follow_up: false,
            follow_up_to: None,
            category,
            interview_complete: false,
        }
    }

    pub fn follow_up(id: QuestionId, parent: QuestionId, question: String) -> Self {
        Self {
            id,
            question,
            is_follow_up: true,
            follow_up_to: Some(parent),
            category: None,
            interview_complete: false,
        }
    }

    pub fn terminal(id: u32) -> Self {
        Self {
            id: QuestionId::Primary(id),
            question: CLOSING_STATEMENT.to_string(),
            is_follow_up: false,
            follow_up_to: None,
            category: None,
            interview_complete: true,
        }
    }
}

/// Where the next primary question comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Draw {
    Bank(QuestionCategory),
    Custom,
    Generate,
}

/// First non-empty bank category not yet used, in `QuestionCategory::BANK` order.
pub fn unused_category(
    bank: &QuestionBank,
    used: &HashSet<QuestionCategory>,
) -> Option<QuestionCategory> {
    bank.available_categories()
        .into_iter()
        .find(|category| !used.contains(category))
}

/// Picks a bank category: the first one not yet used; once every available
/// category has been used, any of them at random. `None` when the bank has
/// nothing left.
pub fn select_category<R: Rng + ?Sized>(
    bank: &QuestionBank,
    used: &HashSet<QuestionCategory>,
    rng: &mut R,
) -> Option<QuestionCategory> {
    unused_category(bank, used).or_else(|| bank.available_categories().choose(rng).copied())
}

/// Unused categories first, then the custom HR questions, then any category.
/// Serving custom questions right after the first pass keeps the cap from
/// crowding them out behind a large technical pool.
fn plan_draw<R: Rng + ?Sized>(
    bank: &QuestionBank,
    used: &HashSet<QuestionCategory>,
    rng: &mut R,
) -> Draw {
    if let Some(category) = unused_category(bank, used) {
        return Draw::Bank(category);
    }
    if bank.custom_remaining() > 0 {
        return Draw::Custom;
    }
    match select_category(bank, used, rng) {
        Some(category) => Draw::Bank(category),
        None => Draw::Generate,
    }
}

pub struct QuestionOrchestrator {
    llm: Arc<dyn CompletionClient>,
    timeout: Duration,
    max_primary: u32,
}

impl QuestionOrchestrator {
    pub fn new(llm: Arc<dyn CompletionClient>, timeout: Duration, max_primary: u32) -> Self {
        Self {
            llm,
            timeout,
            max_primary,
        }
    }

    /// Runs one step of the interview. Never fails: completion errors fall back
    /// to "no follow-up" or a generic question, and the cap yields a terminal
    /// record which is then replayed on every later call.
    pub async fn next_question(
        &self,
        interview_id: Uuid,
        context: &InterviewContext,
        state: &mut SessionState,
        previous: Option<QuestionId>,
        answer: Option<&str>,
    ) -> QuestionRecord {
        if let Some(closing) = &state.closing {
            debug!("Interview {interview_id} already complete, replaying closing record");
            return closing.clone();
        }

        // Step 1: staged until the outcome is known
        let ingested = match (previous, answer) {
            (Some(id), Some(answer)) if !answer.trim().is_empty() => {
                Some((id, answer.to_string()))
            }
            _ => None,
        };

        // Step 2
        if let Some((prev_id, answer)) = &ingested {
            if let Some(record) = self
                .try_follow_up(interview_id, context, state, *prev_id, answer)
                .await
            {
                state.memory.push((prev_id.label(), answer.clone()));
                state.issued.push((record.id, record.question.clone()));
                info!("Interview {interview_id}: follow-up {} issued", record.id);
                return record;
            }
        }

        // Step 3: built into a local, installed on commit
        let mut fresh_bank = None;
        let bank = match &state.bank {
            Some(bank) => bank,
            None => &*fresh_bank.insert(build_bank(interview_id, context, &mut state.rng)),
        };

        // Step 4: an id past u32 is past any cap
        let next_id = match QuestionId::next_primary(previous) {
            Some(id) if id <= self.max_primary => id,
            past_cap => {
                let record = QuestionRecord::terminal(past_cap.unwrap_or(u32::MAX));
                commit_answer(state, ingested);
                if let Some(bank) = fresh_bank {
                    state.bank = Some(bank);
                }
                state.closing = Some(record.clone());
                info!(
                    "Interview {interview_id}: question cap {} reached, interview complete",
                    self.max_primary
                );
                return record;
            }
        };

        // Step 5
        let draw = plan_draw(bank, &state.used_categories, &mut state.rng);

        // Step 6: the only await on the primary path
        let generated = match draw {
            Draw::Generate => {
                self.generate_question(interview_id, context, state, ingested.as_ref())
                    .await
            }
            _ => None,
        };

        commit_answer(state, ingested);
        if let Some(bank) = fresh_bank {
            state.bank = Some(bank);
        }

        let record = match draw {
            Draw::Bank(category) => {
                let question = state
                    .bank
                    .as_mut()
                    .and_then(|bank| bank.pop(category))
                    .unwrap_or_else(|| fallback_question(state));
                state.used_categories.insert(category);
                QuestionRecord::primary(next_id, question, Some(category))
            }
            Draw::Custom => {
                let question = state
                    .bank
                    .as_mut()
                    .and_then(QuestionBank::pop_custom)
                    .unwrap_or_else(|| fallback_question(state));
                QuestionRecord::primary(next_id, question, None)
            }
            Draw::Generate => {
                let question = generated.unwrap_or_else(|| fallback_question(state));
                QuestionRecord::primary(next_id, question, Some(QuestionCategory::Generated))
            }
        };

        state.issued.push((record.id, record.question.clone()));
        debug!(
            "Interview {interview_id}: question {} from {:?}",
            record.id, record.category
        );
        record
    }

    /// Asks whether the last answer deserves a follow-up and, if so, for the
    /// follow-up itself. Any failure means "no follow-up".
    async fn try_follow_up(
        &self,
        interview_id: Uuid,
        context: &InterviewContext,
        state: &SessionState,
        prev_id: QuestionId,
        answer: &str,
    ) -> Option<QuestionRecord> {
        let Some(follow_up_id) = prev_id.follow_up() else {
            debug!("Interview {interview_id}: {prev_id} is at maximum follow-up depth");
            return None;
        };

        let label = prev_id.label();
        let question = state.issued_text(prev_id).unwrap_or(&label);

        let check_prompt = self.render(
            FOLLOW_UP_CHECK_PROMPT,
            &[
                ("job_role", context.job_role.as_str()),
                ("job_description", context.job_description.as_str()),
                ("question", question),
                ("answer", answer),
            ],
        )?;
        let verdict = match self.complete(&check_prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Interview {interview_id}: follow-up check failed, skipping follow-up: {e}");
                return None;
            }
        };
        if !wants_follow_up(&verdict) {
            return None;
        }

        let question_prompt = self.render(
            FOLLOW_UP_QUESTION_PROMPT,
            &[
                ("job_role", context.job_role.as_str()),
                ("job_description", context.job_description.as_str()),
                ("question", question),
                ("answer", answer),
                ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
            ],
        )?;
        let text = match self.complete(&question_prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Interview {interview_id}: follow-up generation failed, skipping follow-up: {e}"
                );
                return None;
            }
        };

        match extract_follow_up_question(&text) {
            Some(follow_up) => Some(QuestionRecord::follow_up(follow_up_id, prev_id, follow_up)),
            None => {
                warn!("Interview {interview_id}: follow-up response had no usable question");
                None
            }
        }
    }

    /// A fresh question once the bank and custom queue are exhausted. Returns
    /// `None` when the model output is unusable or repeats an issued question.
    async fn generate_question(
        &self,
        interview_id: Uuid,
        context: &InterviewContext,
        state: &SessionState,
        pending: Option<&(QuestionId, String)>,
    ) -> Option<String> {
        let asked = if state.issued.is_empty() {
            "None".to_string()
        } else {
            state
                .issued
                .iter()
                .map(|(id, text)| format!("- {text} ({})", id.label()))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let conversation = state
            .memory
            .iter()
            .map(|(label, answer)| (label.clone(), answer.as_str()))
            .chain(pending.map(|(id, answer)| (id.label(), answer.as_str())))
            .map(|(label, answer)| format!("{label}: {answer}"))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = self.render(
            NEW_QUESTION_PROMPT,
            &[
                ("job_role", context.job_role.as_str()),
                ("job_description", context.job_description.as_str()),
                ("asked_questions", asked.as_str()),
                ("conversation", conversation.as_str()),
                ("plain_text_instruction", PLAIN_TEXT_INSTRUCTION),
            ],
        )?;

        let text = match self.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Interview {interview_id}: question generation failed, using fallback: {e}");
                return None;
            }
        };

        match extract_generated_question(&text) {
            Some(question) if state.was_issued(&question) => {
                warn!(
                    "Interview {interview_id}: generated question repeats an earlier one, \
                     using fallback"
                );
                None
            }
            Some(question) => Some(question),
            None => {
                warn!("Interview {interview_id}: generated response was empty, using fallback");
                None
            }
        }
    }

    /// Initial question set for HR preview. One completion call; the default set
    /// stands in on failure or when nothing can be extracted. Custom questions
    /// are appended once.
    pub async fn prepare_questions(&self, context: &InterviewContext) -> Vec<String> {
        let skills = context.skills_summary();
        let mut questions = match self.render(
            QUESTION_SET_PROMPT,
            &[
                ("job_role", context.job_role.as_str()),
                ("job_description", context.job_description.as_str()),
                ("candidate_skills", skills.as_str()),
                ("difficulty", context.difficulty.as_str()),
            ],
        ) {
            Some(prompt) => match self.complete(&prompt).await {
                Ok(text) => extract_questions(&text),
                Err(e) => {
                    warn!("Question set generation failed, using defaults: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if questions.is_empty() {
            questions = DEFAULT_QUESTIONS[..3].iter().map(|q| q.to_string()).collect();
        }

        for custom in &context.custom_questions {
            let custom = custom.trim();
            if !custom.is_empty() && !questions.iter().any(|q| q == custom) {
                questions.push(custom.to_string());
            }
        }
        questions
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        complete_within(self.llm.as_ref(), prompt, self.timeout).await
    }

    /// Fixed templates with fixed names: a failure here is a bug, logged loudly
    /// and treated like any other downstream failure.
    fn render(&self, template: &str, vars: &[(&str, &str)]) -> Option<String> {
        match render_template(template, vars) {
            Ok(prompt) => Some(prompt),
            Err(TemplateError::MissingPlaceholder(name)) => {
                error!("Prompt template is missing a value for '{name}'");
                None
            }
        }
    }
}

fn build_bank<R: Rng + ?Sized>(
    interview_id: Uuid,
    context: &InterviewContext,
    rng: &mut R,
) -> QuestionBank {
    match build_question_bank(context, rng) {
        Ok(bank) => {
            info!(
                "Interview {interview_id}: question bank built ({} questions, difficulty {})",
                bank.total_remaining(),
                bank.difficulty()
            );
            debug!(
                "Interview {interview_id}: bank categories {}",
                QuestionCategory::BANK
                    .iter()
                    .map(|c| {
                        format!("{}={} (weight {:.1})", c.name(), bank.remaining(*c), c.weight())
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            bank
        }
        Err(e) => {
            error!("Interview {interview_id}: question bank build failed: {e}");
            QuestionBank::empty()
        }
    }
}

fn commit_answer(state: &mut SessionState, ingested: Option<(QuestionId, String)>) {
    if let Some((id, answer)) = ingested {
        state.memory.push((id.label(), answer));
    }
}

/// First default question not yet issued in this interview.
fn fallback_question(state: &SessionState) -> String {
    DEFAULT_QUESTIONS
        .iter()
        .find(|q| !state.was_issued(q))
        .unwrap_or(&LAST_RESORT_QUESTION)
        .to_string()
}
