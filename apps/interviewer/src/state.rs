use std::sync::Arc;

use crate::config::Config;
use crate::interview::evaluator::Evaluator;
use crate::interview::orchestrator::QuestionOrchestrator;
use crate::interview::session::SessionStore;
use crate::llm_client::CompletionClient;
use crate::skills::SkillExtractor;
use crate::store::RecordStore;

/// Shared collaborators handed to every service operation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    /// Pluggable resume reader. Default: KeywordSkillExtractor.
    pub skills: Arc<dyn SkillExtractor>,
    pub sessions: Arc<SessionStore>,
    pub orchestrator: Arc<QuestionOrchestrator>,
    pub evaluator: Arc<Evaluator>,
    pub config: Config,
}

impl AppState {
    /// Wires the orchestrator and evaluator to one completion client, both
    /// bounded by the configured timeout.
    pub fn new(
        config: Config,
        store: Arc<dyn RecordStore>,
        skills: Arc<dyn SkillExtractor>,
        llm: Arc<dyn CompletionClient>,
    ) -> Self {
        let orchestrator = QuestionOrchestrator::new(
            llm.clone(),
            config.llm_timeout(),
            config.max_primary_questions,
        );
        let evaluator = Evaluator::new(llm, config.llm_timeout());
        Self {
            store,
            skills,
            sessions: Arc::new(SessionStore::new()),
            orchestrator: Arc::new(orchestrator),
            evaluator: Arc::new(evaluator),
            config,
        }
    }
}
