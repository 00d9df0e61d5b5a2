use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RecordStore;
use crate::errors::AppError;
use crate::models::interview::{InterviewRecord, InterviewStatus, NewInterview};
use crate::models::result::{InterviewResultRecord, NewInterviewResult};

/// Process-local store. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryRecordStore {
    interviews: RwLock<HashMap<Uuid, InterviewRecord>>,
    results: RwLock<HashMap<Uuid, InterviewResultRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_interview(&self, new: NewInterview) -> Result<InterviewRecord, AppError> {
        let record = InterviewRecord {
            id: Uuid::new_v4(),
            hr_id: new.hr_id,
            candidate_id: new.candidate_id,
            candidate_name: new.candidate_name,
            job_role: new.job_role,
            job_description: new.job_description,
            difficulty: new.difficulty.as_str().to_string(),
            scheduled_at: new.scheduled_at,
            duration_minutes: new.duration_minutes,
            resume_path: new.resume_path,
            custom_questions: new.custom_questions,
            status: InterviewStatus::Scheduled.as_str().to_string(),
            created_at: Utc::now(),
        };
        self.interviews
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<InterviewRecord>, AppError> {
        Ok(self.interviews.read().await.get(&id).cloned())
    }

    async fn update_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<(), AppError> {
        match self.interviews.write().await.get_mut(&id) {
            Some(record) => {
                record.status = status.as_str().to_string();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Interview {id} not found"))),
        }
    }

    async fn create_result(
        &self,
        new: NewInterviewResult,
    ) -> Result<InterviewResultRecord, AppError> {
        let mut results = self.results.write().await;
        if results.contains_key(&new.interview_id) {
            return Err(AppError::InvalidState(format!(
                "Interview {} already has a result",
                new.interview_id
            )));
        }
        let record = InterviewResultRecord {
            id: Uuid::new_v4(),
            interview_id: new.interview_id,
            score: new.score,
            decision: new.decision,
            feedback: new.feedback,
            strengths: new.strengths,
            weaknesses: new.weaknesses,
            created_at: Utc::now(),
        };
        results.insert(record.interview_id, record.clone());
        Ok(record)
    }

    async fn get_result(
        &self,
        interview_id: Uuid,
    ) -> Result<Option<InterviewResultRecord>, AppError> {
        Ok(self.results.read().await.get(&interview_id).cloned())
    }
}
