use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Difficulty tiers, in increasing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Very Easy")]
    VeryEasy,
    #[serde(rename = "Easy")]
    Easy,
    #[default]
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "Hard")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::VeryEasy => "Very Easy",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "very easy" => Ok(Difficulty::VeryEasy),
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "unknown difficulty '{s}' (expected Very Easy, Easy, Medium or Hard)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "scheduled",
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Completed => "completed",
            InterviewStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled interviews accept no further questions.
    pub fn is_closed(&self) -> bool {
        matches!(self, InterviewStatus::Completed | InterviewStatus::Cancelled)
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(InterviewStatus::Scheduled),
            "in_progress" => Ok(InterviewStatus::InProgress),
            "completed" => Ok(InterviewStatus::Completed),
            "cancelled" => Ok(InterviewStatus::Cancelled),
            other => Err(format!("unknown interview status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRecord {
    pub id: Uuid,
    pub hr_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub job_role: String,
    pub job_description: String,
    pub difficulty: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub resume_path: String,
    pub custom_questions: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl InterviewRecord {
    /// Rows are only written through `schedule_interview`, which stores the
    /// canonical spelling; anything else reads as the default tier.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty.parse().unwrap_or_default()
    }

    pub fn status(&self) -> Result<InterviewStatus, String> {
        self.status.parse()
    }
}

/// Fields supplied when scheduling an interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInterview {
    pub hr_id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub job_role: String,
    pub job_description: String,
    pub difficulty: Difficulty,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub resume_path: String,
    #[serde(default)]
    pub custom_questions: Vec<String>,
}
