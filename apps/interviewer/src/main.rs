mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod skills;
mod state;
mod store;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::Config;
use crate::db::create_pool;
use crate::errors::AppError;
use crate::interview::orchestrator::QuestionRecord;
use crate::interview::service::{
    cancel_interview, complete_interview, next_question, prepare_interview, schedule_interview,
};
use crate::llm_client::LlmClient;
use crate::models::interview::{Difficulty, NewInterview};
use crate::models::result::TranscriptEntry;
use crate::skills::KeywordSkillExtractor;
use crate::state::AppState;
use crate::store::{MemoryRecordStore, PgRecordStore, RecordStore};

/// Typed in place of an answer to end the interview early.
const DONE_COMMAND: &str = "/done";
/// Typed in place of an answer to abandon the interview without evaluation.
const CANCEL_COMMAND: &str = "/cancel";

/// Interview definition read from the JSON file given on the command line.
#[derive(Debug, Deserialize)]
struct InterviewDefinition {
    candidate_name: String,
    job_role: String,
    job_description: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default = "default_duration")]
    duration_minutes: i32,
    resume_path: String,
    #[serde(default)]
    custom_questions: Vec<String>,
}

fn default_duration() -> i32 {
    30
}

impl InterviewDefinition {
    fn into_new_interview(self) -> NewInterview {
        NewInterview {
            hr_id: Uuid::new_v4(),
            candidate_id: Uuid::new_v4(),
            candidate_name: self.candidate_name,
            job_role: self.job_role,
            job_description: self.job_description,
            difficulty: self.difficulty,
            scheduled_at: Utc::now(),
            duration_minutes: self.duration_minutes,
            resume_path: self.resume_path,
            custom_questions: self.custom_questions,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting interviewer v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let definition_path = args
        .next()
        .context("Usage: interviewer <interview.json> [--preview]")?;
    let preview_only = args.any(|arg| arg == "--preview");
    let raw = tokio::fs::read_to_string(&definition_path)
        .await
        .with_context(|| format!("Failed to read interview definition '{definition_path}'"))?;
    let definition: InterviewDefinition = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid interview definition in '{definition_path}'"))?;

    // Records: PostgreSQL when configured, process memory otherwise
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            info!("Using PostgreSQL record store");
            Arc::new(PgRecordStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory record store");
            Arc::new(MemoryRecordStore::new())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState::new(
        config,
        store,
        Arc::new(KeywordSkillExtractor),
        Arc::new(llm),
    );

    let interview = schedule_interview(&state, definition.into_new_interview())
        .await
        .map_err(report)?;

    if preview_only {
        let questions = prepare_interview(&state, interview.id)
            .await
            .map_err(report)?;
        println!("Question set for {} ({}):", interview.job_role, interview.difficulty);
        for (i, question) in questions.iter().enumerate() {
            println!("{}. {question}", i + 1);
        }
        return Ok(());
    }

    println!(
        "Interview for {} ({}). Type {DONE_COMMAND} to finish early or {CANCEL_COMMAND} to abandon.",
        interview.job_role, interview.difficulty
    );

    let Some(transcript) = run_interview(&state, interview.id).await? else {
        cancel_interview(&state, interview.id)
            .await
            .map_err(report)?;
        println!("Interview cancelled.");
        return Ok(());
    };

    let result = complete_interview(&state, interview.id, transcript)
        .await
        .map_err(report)?;
    println!("\n=== Evaluation ===");
    println!("Score: {}", result.score);
    println!("Decision: {}", result.decision);
    println!("\n{}", result.feedback);
    print_list("Strengths", &result.strengths);
    print_list("Areas for improvement", &result.weaknesses);

    Ok(())
}

/// Question/answer loop on stdin. Ends on the closing record, EOF or `/done`;
/// `None` when the candidate cancelled.
async fn run_interview(
    state: &AppState,
    interview_id: Uuid,
) -> Result<Option<Vec<TranscriptEntry>>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut transcript = Vec::new();
    let mut previous: Option<QuestionRecord> = None;
    let mut answer: Option<String> = None;

    loop {
        let question = next_question(
            state,
            interview_id,
            previous.as_ref().map(|q| q.id),
            answer.take(),
        )
        .await
        .map_err(report)?;

        if question.interview_complete {
            println!("\n{}", question.question);
            break;
        }

        match question.category {
            Some(category) => println!(
                "\n[{}] ({}) {}",
                question.id,
                category.name(),
                question.question
            ),
            None => println!("\n[{}] {}", question.id, question.question),
        }
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == DONE_COMMAND {
            break;
        }
        if line == CANCEL_COMMAND {
            return Ok(None);
        }

        transcript.push(TranscriptEntry {
            question: question.question.clone(),
            answer: line.to_string(),
            is_follow_up: question.is_follow_up,
        });
        answer = Some(line.to_string());
        previous = Some(question);
    }

    Ok(Some(transcript))
}

/// Attaches the stable error code to a service error.
fn report(e: AppError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}]", e, e.code())
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{title}:");
    for item in items {
        println!("  - {item}");
    }
}
