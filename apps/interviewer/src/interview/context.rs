use serde::{Deserialize, Serialize};

use crate::models::interview::{Difficulty, InterviewRecord};

/// Read-only description of an interview, resolved once by the caller and
/// handed to the orchestrator on every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewContext {
    pub job_role: String,
    pub job_description: String,
    pub difficulty: Difficulty,
    pub custom_questions: Vec<String>,
    pub skills: Vec<String>,
}

impl InterviewContext {
    pub fn from_record(record: &InterviewRecord, skills: Vec<String>) -> Self {
        Self {
            job_role: record.job_role.clone(),
            job_description: record.job_description.clone(),
            difficulty: record.difficulty(),
            custom_questions: record.custom_questions.clone(),
            skills,
        }
    }

    /// Comma-separated skill list for prompts; never empty text.
    pub fn skills_summary(&self) -> String {
        if self.skills.is_empty() {
            "Not specified".to_string()
        } else {
            self.skills.join(", ")
        }
    }
}
