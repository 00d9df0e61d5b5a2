use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One question/answer pair as recorded by the caller during the interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub is_follow_up: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewResultRecord {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub score: f64,
    pub decision: String,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterviewResult {
    pub interview_id: Uuid,
    pub score: f64,
    pub decision: String,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}
