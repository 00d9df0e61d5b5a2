use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::RecordStore;
use crate::errors::AppError;
use crate::models::interview::{InterviewRecord, InterviewStatus, NewInterview};
use crate::models::result::{InterviewResultRecord, NewInterviewResult};

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create_interview(&self, new: NewInterview) -> Result<InterviewRecord, AppError> {
        Ok(sqlx::query_as::<_, InterviewRecord>(
            r#"
            INSERT INTO interviews
                (id, hr_id, candidate_id, candidate_name, job_role, job_description,
                 difficulty, scheduled_at, duration_minutes, resume_path, custom_questions, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.hr_id)
        .bind(new.candidate_id)
        .bind(&new.candidate_name)
        .bind(&new.job_role)
        .bind(&new.job_description)
        .bind(new.difficulty.as_str())
        .bind(new.scheduled_at)
        .bind(new.duration_minutes)
        .bind(&new.resume_path)
        .bind(&new.custom_questions)
        .bind(InterviewStatus::Scheduled.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_interview(&self, id: Uuid) -> Result<Option<InterviewRecord>, AppError> {
        Ok(
            sqlx::query_as::<_, InterviewRecord>("SELECT * FROM interviews WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn update_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE interviews SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Interview {id} not found")));
        }
        Ok(())
    }

    async fn create_result(
        &self,
        new: NewInterviewResult,
    ) -> Result<InterviewResultRecord, AppError> {
        Ok(sqlx::query_as::<_, InterviewResultRecord>(
            r#"
            INSERT INTO interview_results
                (id, interview_id, score, decision, feedback, strengths, weaknesses)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.interview_id)
        .bind(new.score)
        .bind(&new.decision)
        .bind(&new.feedback)
        .bind(&new.strengths)
        .bind(&new.weaknesses)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_result(
        &self,
        interview_id: Uuid,
    ) -> Result<Option<InterviewResultRecord>, AppError> {
        Ok(sqlx::query_as::<_, InterviewResultRecord>(
            "SELECT * FROM interview_results WHERE interview_id = $1",
        )
        .bind(interview_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
