//! Mock inference gateway for testing
//!
//! Scripted per-task responses, simulated latency, and a record of every
//! request, for driving the pipeline through each of its branches.

#![allow(dead_code)]

use async_trait::async_trait;
use calma_classifiers::{InferenceGateway, InferencePayload, RawResponse, TransportFailure};
use calma_core::TaskKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// A request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub task: TaskKind,
    pub model: String,
    pub payload: InferencePayload,
}

/// A configurable mock gateway. Unscripted tasks fail as unreachable.
pub struct MockGateway {
    outcomes: HashMap<TaskKind, Result<String, TransportFailure>>,
    simulated_latency: Option<Duration>,
    call_count: AtomicU32,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    /// Create a mock where every task is unreachable
    pub fn unreachable() -> Self {
        Self {
            outcomes: HashMap::new(),
            simulated_latency: None,
            call_count: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer `task` with this body
    pub fn respond(mut self, task: TaskKind, body: &str) -> Self {
        self.outcomes.insert(task, Ok(body.to_string()));
        self
    }

    /// Fail `task` with this transport failure
    pub fn fail(mut self, task: TaskKind, failure: TransportFailure) -> Self {
        self.outcomes.insert(task, Err(failure));
        self
    }

    /// Set simulated latency for every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Get the number of times invoke was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// All requests seen so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Most recent request for `task`
    pub fn last_call(&self, task: TaskKind) -> Option<RecordedCall> {
        self.calls().into_iter().rev().find(|c| c.task == task)
    }
}

#[async_trait]
impl InferenceGateway for MockGateway {
    async fn invoke(
        &self,
        task: TaskKind,
        model: &str,
        payload: &InferencePayload,
    ) -> Result<RawResponse, TransportFailure> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.calls.lock().unwrap().push(RecordedCall {
            task,
            model: model.to_string(),
            payload: payload.clone(),
        });

        if let Some(latency) = self.simulated_latency {
            tokio::time::sleep(latency).await;
        }

        match self.outcomes.get(&task) {
            Some(Ok(body)) => Ok(RawResponse::new(task, model, body.clone())),
            Some(Err(failure)) => Err(failure.clone()),
            None => Err(TransportFailure::Network("connection refused".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
