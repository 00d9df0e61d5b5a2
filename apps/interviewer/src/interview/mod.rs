// Interview engine: question bank, follow-ups, generation, evaluation.
// All completion calls go through llm_client::CompletionClient; nothing here
// talks to the Anthropic API directly.

pub mod context;
pub mod evaluator;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod question_bank;
pub mod question_id;
pub mod service;
pub mod session;
