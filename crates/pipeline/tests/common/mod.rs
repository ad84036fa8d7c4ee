//! Shared test doubles for the pipeline integration suites.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeZone;
use tokio::sync::oneshot;
use wildcam_core::error::CoreError;
use wildcam_core::query::StackQuery;
use wildcam_core::selection::{Phase, SelectionCriteria, SelectionPatch};
use wildcam_core::stack::{Stack, StackImage};
use wildcam_core::types::Timestamp;
use wildcam_events::SelectionState;
use wildcam_pipeline::{AssetSource, StackPipeline, StackSource};

/// How a scripted source answers one call.
enum Reply {
    Ready(Result<Stack, CoreError>),
    /// Completes when the test sends through the paired `oneshot::Sender`.
    Gated(oneshot::Receiver<Result<Stack, CoreError>>),
}

/// A [`StackSource`] that records every query and answers from a script.
///
/// Calls beyond the script fail with a retrieval error.
#[derive(Default)]
pub struct ScriptedSource {
    calls: Mutex<Vec<StackQuery>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, stack: Stack) {
        self.replies.lock().unwrap().push_back(Reply::Ready(Ok(stack)));
    }

    pub fn push_err(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Ready(Err(CoreError::Retrieval(message.to_string()))));
    }

    /// Queue a reply the test completes later.
    pub fn push_gated(&self) -> oneshot::Sender<Result<Stack, CoreError>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<StackQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Yield until at least `n` calls have been recorded.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl StackSource for ScriptedSource {
    async fn fetch_stack(&self, query: StackQuery) -> Result<Stack, CoreError> {
        self.calls.lock().unwrap().push(query);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(CoreError::Retrieval("gate dropped".into()))),
            None => Err(CoreError::Retrieval("no scripted reply".into())),
        }
    }
}

/// Fallback source returning a fixed result.
pub struct StaticAssets(pub Result<Stack, String>);

#[async_trait]
impl AssetSource for StaticAssets {
    async fn fetch_fallback(&self) -> Result<Stack, CoreError> {
        self.0.clone().map_err(CoreError::Asset)
    }
}

pub fn stack_of(names: &[&str]) -> Stack {
    names.iter().map(|name| StackImage::new(*name)).collect()
}

pub fn utc(year: i32, month: u32, day: u32) -> Timestamp {
    chrono::Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// The selection used throughout the scenarios: deployment 7, one day of
/// daytime frames every five seconds.
pub fn scenario_patch() -> SelectionPatch {
    SelectionPatch::new()
        .with_deployment(7)
        .with_period(utc(2024, 1, 1), utc(2024, 1, 2))
        .with_interval(5)
        .with_phase(Phase::Day)
}

/// Selection state wired to a manually pumped pipeline.
pub struct Harness {
    pub state: SelectionState,
    pub pipeline: StackPipeline,
    pub source: Arc<ScriptedSource>,
    feed: wildcam_events::Subscription<SelectionCriteria>,
}

impl Harness {
    pub fn new() -> Self {
        let source = ScriptedSource::new();
        let state = SelectionState::new();
        let feed = state.subscribe();
        let pipeline = StackPipeline::new(source.clone());
        Self {
            state,
            pipeline,
            source,
            feed,
        }
    }

    /// Apply `patch` and let the pipeline react, waiting for any retrieval
    /// it dispatched to finish.
    pub async fn update(&mut self, patch: SelectionPatch) {
        for handle in self.update_detached(patch) {
            handle.await.expect("retrieval task should not panic");
        }
    }

    /// Apply `patch` and let the pipeline react without waiting for
    /// retrievals.
    pub fn update_detached(&mut self, patch: SelectionPatch) -> Vec<tokio::task::JoinHandle<()>> {
        self.state.update(patch);
        self.feed
            .drain()
            .iter()
            .filter_map(|criteria| self.pipeline.on_selection_changed(criteria))
            .collect()
    }
}
