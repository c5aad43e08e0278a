//! Scripted gateway for unit tests — no network, counts calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::llm::CompletionGateway;

#[derive(Clone)]
enum Step {
    Reply(String),
    Fail,
}

/// A gateway that replays a script, then repeats a fallback step.
pub(crate) struct ScriptedGateway {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    /// Always answer with `text`.
    pub(crate) fn always(text: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Step::Reply(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail.
    pub(crate) fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Step::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a reply ahead of the fallback.
    pub(crate) fn push_reply(self, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Step::Reply(text.to_string()));
        self
    }

    /// How many times `complete` has been called.
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match step {
            Step::Reply(text) => Ok(text),
            Step::Fail => Err(GatewayError::RequestFailed {
                endpoint: "scripted".into(),
                reason: "scripted failure".into(),
            }),
        }
    }
}
