//! The stack pipeline and its published channels.
//!
//! For each selection broadcast the pipeline:
//!
//! 1. republishes the frame rate, unconditionally;
//! 2. stops if the rest of the selection equals the previous broadcast;
//! 3. stops silently if the selection is not valid for retrieval;
//! 4. otherwise publishes `loading = true` and spawns one retrieval.
//!
//! A finished retrieval publishes `loading = false` and then, on success
//! only, the new stack. Retrievals are never cancelled; when several
//! overlap, whichever finishes last owns the stack channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use wildcam_core::error::CoreError;
use wildcam_core::query::StackQuery;
use wildcam_core::selection::{SelectionCriteria, SelectionKey};
use wildcam_core::stack::Stack;
use wildcam_events::{ReplayChannel, ReplayView, SelectionState, Subscription};

use crate::source::{AssetSource, StackSource};

// ---------------------------------------------------------------------------
// PipelineOutputs
// ---------------------------------------------------------------------------

/// Read-only views of the three channels the pipeline publishes.
///
/// Each view replays its latest value to new subscribers. Cheap to clone.
#[derive(Clone)]
pub struct PipelineOutputs {
    /// Ordered images for the playback loop.
    pub stack: ReplayView<Stack>,
    /// Playback speed in frames per second.
    pub frame_rate: ReplayView<f64>,
    /// Whether a retrieval is in flight.
    pub loading: ReplayView<bool>,
}

/// One value published on any of the pipeline's channels.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    Stack(Stack),
    FrameRate(f64),
    Loading(bool),
}

impl PipelineOutputs {
    /// Subscribe to all three channels through one queue.
    ///
    /// Latest values are replayed first (stack, frame rate, loading). After
    /// that, events arrive in the order the pipeline published them.
    pub fn subscribe_all(&self) -> Subscription<PipelineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.stack.forward(&tx, PipelineEvent::Stack);
        self.frame_rate.forward(&tx, PipelineEvent::FrameRate);
        self.loading.forward(&tx, PipelineEvent::Loading);
        Subscription::from(rx)
    }
}

// ---------------------------------------------------------------------------
// StackPipeline
// ---------------------------------------------------------------------------

/// Turns selection broadcasts into retrievals and published stacks.
///
/// All decision state is owned here and mutated only from
/// [`on_selection_changed`](Self::on_selection_changed).
pub struct StackPipeline {
    source: Arc<dyn StackSource>,
    assets: Option<Arc<dyn AssetSource>>,
    stack: ReplayChannel<Stack>,
    frame_rate: ReplayChannel<f64>,
    loading: ReplayChannel<bool>,
    /// Key of the previous broadcast; `None` until the first one.
    previous_key: Option<SelectionKey>,
    /// Number of retrievals dispatched so far, for log correlation.
    dispatched: u64,
}

impl StackPipeline {
    pub fn new(source: Arc<dyn StackSource>) -> Self {
        Self {
            source,
            assets: None,
            stack: ReplayChannel::new(),
            frame_rate: ReplayChannel::new(),
            loading: ReplayChannel::new(),
            previous_key: None,
            dispatched: 0,
        }
    }

    /// Attach the collaborator used by [`load_fallback`](Self::load_fallback).
    pub fn with_fallback(mut self, assets: Arc<dyn AssetSource>) -> Self {
        self.assets = Some(assets);
        self
    }

    /// Views for playback and UI consumers.
    pub fn outputs(&self) -> PipelineOutputs {
        PipelineOutputs {
            stack: self.stack.view(),
            frame_rate: self.frame_rate.view(),
            loading: self.loading.view(),
        }
    }

    /// React to one selection broadcast.
    ///
    /// Returns the handle of the retrieval task when one was dispatched.
    /// Dropping the handle detaches the task; it still runs to completion.
    /// Must be called from within a tokio runtime.
    pub fn on_selection_changed(
        &mut self,
        criteria: &SelectionCriteria,
    ) -> Option<JoinHandle<()>> {
        self.frame_rate.publish(criteria.frame_rate);

        let key = criteria.key();
        if self.previous_key.as_ref() == Some(&key) {
            tracing::debug!(
                frame_rate = criteria.frame_rate,
                "Selection unchanged, skipping retrieval",
            );
            return None;
        }
        self.previous_key = Some(key);

        if let Err(reason) = criteria.validate() {
            tracing::debug!(%reason, "Selection incomplete, retrieval deferred");
            return None;
        }

        Some(self.dispatch(StackQuery::from(criteria)))
    }

    /// Drive the pipeline from a selection feed until the feed closes.
    pub async fn run(mut self, mut selections: Subscription<SelectionCriteria>) {
        while let Some(criteria) = selections.recv().await {
            // Retrievals are detached; they publish on their own.
            let _ = self.on_selection_changed(&criteria);
        }
        tracing::info!(
            dispatched = self.dispatched,
            "Selection feed closed, stack pipeline stopped",
        );
    }

    /// Subscribe to `state` and run the pipeline on a background task.
    ///
    /// Only broadcasts made after this call are observed.
    pub fn spawn(self, state: &SelectionState) -> JoinHandle<()> {
        let selections = state.subscribe();
        tokio::spawn(self.run(selections))
    }

    /// Publish the static fallback stack, bypassing validation and the
    /// loading flag.
    ///
    /// Errors are returned to the caller untouched and nothing is published.
    pub async fn load_fallback(&self) -> Result<(), CoreError> {
        let assets = self
            .assets
            .as_ref()
            .ok_or_else(|| CoreError::Asset("no fallback asset source configured".into()))?;

        let stack = assets.fetch_fallback().await?;
        tracing::info!(images = stack.len(), "Publishing fallback stack");
        self.stack.publish(stack);
        Ok(())
    }

    // ---- private helpers ----

    fn dispatch(&mut self, query: StackQuery) -> JoinHandle<()> {
        self.dispatched += 1;
        let request = self.dispatched;

        tracing::info!(
            request,
            deployment_id = ?query.deployment_id,
            interval = query.interval,
            phase = ?query.phase,
            "Requesting image stack",
        );
        self.loading.publish(true);

        let source = Arc::clone(&self.source);
        let stack_tx = self.stack.clone();
        let loading_tx = self.loading.clone();

        tokio::spawn(async move {
            match source.fetch_stack(query).await {
                Ok(stack) => {
                    tracing::info!(request, images = stack.len(), "Image stack received");
                    loading_tx.publish(false);
                    stack_tx.publish(stack);
                }
                Err(e) => {
                    tracing::warn!(request, error = %e, "Image stack retrieval failed");
                    loading_tx.publish(false);
                }
            }
        })
    }
}
