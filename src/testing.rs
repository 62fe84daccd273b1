//! Test doubles shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::source::{DataSource, FetchError, SourceKind};

/// A source that replays scripted results, then repeats a fallback.
#[derive(Debug)]
pub(crate) struct ScriptedSource {
    kind: SourceKind,
    description: String,
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    fallback: Result<String, FetchError>,
    latency: Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub(crate) fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            description: format!("scripted: {}", kind),
            script: Mutex::new(VecDeque::new()),
            fallback: Err(FetchError::Network("no script".to_string())),
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Body returned once the script is exhausted.
    pub(crate) fn with_body(mut self, body: &str) -> Self {
        self.fallback = Ok(body.to_string());
        self
    }

    /// Error returned once the script is exhausted.
    pub(crate) fn with_error(mut self, error: FetchError) -> Self {
        self.fallback = Err(error);
        self
    }

    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Queue a result ahead of the fallback.
    pub(crate) fn then(self, result: Result<&str, FetchError>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn fetch(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        result
    }
}
