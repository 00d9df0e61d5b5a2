//! Interview boundary operations.
//!
//! Contract errors (bad input, closed interviews, unknown ids) are rejected
//! here with `AppError` before the orchestrator runs. Past this layer nothing
//! fails because of the completion service.

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::context::InterviewContext;
use crate::interview::evaluator::EvaluationResult;
use crate::interview::orchestrator::QuestionRecord;
use crate::interview::question_id::QuestionId;
use crate::interview::session::Session;
use crate::models::interview::{InterviewRecord, InterviewStatus, NewInterview};
use crate::models::result::{InterviewResultRecord, NewInterviewResult, TranscriptEntry};
use crate::state::AppState;

/// Validates and stores a new interview with status `scheduled`.
pub async fn schedule_interview(
    state: &AppState,
    mut request: NewInterview,
) -> Result<InterviewRecord, AppError> {
    request.candidate_name = request.candidate_name.trim().to_string();
    request.job_role = request.job_role.trim().to_string();
    request.job_description = request.job_description.trim().to_string();
    request.resume_path = request.resume_path.trim().to_string();

    for (field, value) in [
        ("candidate_name", &request.candidate_name),
        ("job_role", &request.job_role),
        ("job_description", &request.job_description),
        ("resume_path", &request.resume_path),
    ] {
        if value.is_empty() {
            return Err(AppError::Validation(format!("{field} cannot be empty")));
        }
    }
    if request.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "duration_minutes must be positive".to_string(),
        ));
    }

    request.custom_questions = request
        .custom_questions
        .iter()
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();

    let record = state.store.create_interview(request).await?;
    info!(
        "Scheduled interview {} for candidate {} ({})",
        record.id, record.candidate_id, record.job_role
    );
    Ok(record)
}

/// Preview of the initial question set for HR.
pub async fn prepare_interview(
    state: &AppState,
    interview_id: Uuid,
) -> Result<Vec<String>, AppError> {
    let record = load_interview(state, interview_id).await?;
    let context = resolve_context(state, &record).await;
    Ok(state.orchestrator.prepare_questions(&context).await)
}

/// Issues the next question for an interview, creating its session on the
/// first call. Calls for the same interview are serialized on the session lock.
pub async fn next_question(
    state: &AppState,
    interview_id: Uuid,
    previous: Option<QuestionId>,
    answer: Option<String>,
) -> Result<QuestionRecord, AppError> {
    let record = load_interview(state, interview_id).await?;
    let status = record_status(&record)?;
    if status.is_closed() {
        return Err(AppError::InvalidState(format!(
            "Interview {interview_id} is {}",
            status.as_str()
        )));
    }

    let session = match state.sessions.get(interview_id).await {
        Some(session) => session,
        None => {
            state.sessions.evict_idle(state.config.session_idle()).await;
            let context = resolve_context(state, &record).await;
            let (session, created) = state
                .sessions
                .get_or_insert(interview_id, || Session::new(context))
                .await;
            match (created, previous) {
                (true, Some(previous)) => warn!(
                    "Interview {interview_id}: session recreated after question {previous}, \
                     earlier bank questions may repeat"
                ),
                (true, None) => info!("Started session for interview {interview_id}"),
                (false, _) => {}
            }
            session
        }
    };

    if status == InterviewStatus::Scheduled {
        state
            .store
            .update_interview_status(interview_id, InterviewStatus::InProgress)
            .await?;
    }

    let mut session = session.lock().await;
    let Session { context, state: session_state } = &mut *session;
    let question = state
        .orchestrator
        .next_question(
            interview_id,
            context,
            session_state,
            previous,
            answer.as_deref(),
        )
        .await;

    info!(
        "Interview {interview_id}: issued question {}{}",
        question.id,
        if question.interview_complete {
            " (closing)"
        } else {
            ""
        }
    );
    Ok(question)
}

/// Marks the interview completed, evaluates the transcript and stores the
/// result. The session is released whatever the evaluation outcome.
pub async fn complete_interview(
    state: &AppState,
    interview_id: Uuid,
    transcript: Vec<TranscriptEntry>,
) -> Result<InterviewResultRecord, AppError> {
    let record = load_interview(state, interview_id).await?;
    let status = record_status(&record)?;
    if status.is_closed() {
        return Err(AppError::InvalidState(format!(
            "Interview {interview_id} is already {}",
            status.as_str()
        )));
    }

    let evaluation = if transcript.is_empty() {
        info!("Interview {interview_id} completed without answers");
        EvaluationResult::no_responses()
    } else {
        // Evaluation reads only role and description; skills are not needed
        let context = InterviewContext::from_record(&record, Vec::new());
        state
            .evaluator
            .evaluate(&context, &transcript)
            .instrument(info_span!("evaluation", interview_id = %interview_id))
            .await
    };

    let result = state
        .store
        .create_result(NewInterviewResult {
            interview_id,
            score: f64::from(evaluation.score),
            decision: evaluation.decision.as_str().to_string(),
            feedback: evaluation.feedback,
            strengths: evaluation.strengths,
            weaknesses: evaluation.weaknesses,
        })
        .await?;
    state
        .store
        .update_interview_status(interview_id, InterviewStatus::Completed)
        .await?;
    state.sessions.release(interview_id).await;

    info!(
        "Interview {interview_id} completed: score={}, decision={}",
        result.score, result.decision
    );
    Ok(result)
}

pub async fn cancel_interview(state: &AppState, interview_id: Uuid) -> Result<(), AppError> {
    let record = load_interview(state, interview_id).await?;
    if record_status(&record)? == InterviewStatus::Completed {
        return Err(AppError::InvalidState(format!(
            "Interview {interview_id} is already completed"
        )));
    }

    state
        .store
        .update_interview_status(interview_id, InterviewStatus::Cancelled)
        .await?;
    state.sessions.release(interview_id).await;
    info!("Interview {interview_id} cancelled");
    Ok(())
}

async fn load_interview(state: &AppState, interview_id: Uuid) -> Result<InterviewRecord, AppError> {
    state
        .store
        .get_interview(interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))
}

fn record_status(record: &InterviewRecord) -> Result<InterviewStatus, AppError> {
    record
        .status()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Interview {}: {e}", record.id)))
}

/// Interview context with the candidate's skills. An unreadable resume is not
/// fatal: the interview proceeds without technical-skill questions.
async fn resolve_context(state: &AppState, record: &InterviewRecord) -> InterviewContext {
    let skills = match state.skills.extract_skills(&record.resume_path).await {
        Ok(skills) => skills,
        Err(e) => {
            warn!(
                "Interview {}: skill extraction failed, continuing without skills: {e}",
                record.id
            );
            Vec::new()
        }
    };
    InterviewContext::from_record(record, skills)
}
