//! Scripted completion client for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionClient, LlmError};

type Responder = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

/// Records every prompt it receives and answers with a caller-supplied function.
pub struct StubCompletion {
    responder: Option<Responder>,
    prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(f)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        let text = text.to_string();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    pub fn failing() -> Self {
        Self::from_fn(|_| {
            Err(LlmError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            })
        })
    }

    /// Never resolves. Only useful together with a timeout.
    pub fn hanging() -> Self {
        Self {
            responder: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.responder {
            Some(respond) => respond(prompt),
            None => std::future::pending().await,
        }
    }
}
