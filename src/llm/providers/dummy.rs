//! Dummy LLM provider. Replays scripted replies, then echoes.
//!
//! Used for tests and offline runs. Clones share one reply queue and one
//! request log, so a test can keep a handle while the workspace owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::llm::{CompletionRequest, ProviderError};

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Result<String, String>>,
    requests: Vec<CompletionRequest>,
}

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    script: Arc<Mutex<Script>>,
}

impl DummyProvider {
    /// Provider that answers with `replies` in order.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let p = Self::default();
        for r in replies {
            p.push_reply(r);
        }
        p
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.with_script(|s| s.replies.push_back(Ok(reply.into())));
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.with_script(|s| s.replies.push_back(Err(message.into())));
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.with_script(|s| s.requests.clone())
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let next = self.with_script(|s| {
            s.requests.push(request.clone());
            s.replies.pop_front()
        });
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(ProviderError::Request(message)),
            None => Ok(format!("[echo] {}", request.prompt)),
        }
    }

    fn with_script<T>(&self, f: impl FnOnce(&mut Script) -> T) -> T {
        // A poisoned lock only means a test panicked mid-call; the data is
        // still usable.
        let mut guard = self.script.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}
