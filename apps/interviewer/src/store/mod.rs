//! Persistence for interview and result records.
//!
//! The interview engine never touches storage directly; the service layer goes
//! through `RecordStore`, backed by PostgreSQL in deployment and by memory in
//! tests and database-less runs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::{InterviewRecord, InterviewStatus, NewInterview};
use crate::models::result::{InterviewResultRecord, NewInterviewResult};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_interview(&self, new: NewInterview) -> Result<InterviewRecord, AppError>;

    async fn get_interview(&self, id: Uuid) -> Result<Option<InterviewRecord>, AppError>;

    /// Fails with `NotFound` when no interview has this id.
    async fn update_interview_status(
        &self,
        id: Uuid,
        status: InterviewStatus,
    ) -> Result<(), AppError>;

    async fn create_result(
        &self,
        new: NewInterviewResult,
    ) -> Result<InterviewResultRecord, AppError>;

    async fn get_result(&self, interview_id: Uuid)
        -> Result<Option<InterviewResultRecord>, AppError>;
}
