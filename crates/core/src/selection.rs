//! Selection criteria chosen by the viewer.
//!
//! [`SelectionCriteria`] is deliberately allowed to be incomplete: the UI
//! fills it in one field at a time and every intermediate state is stored
//! as-is. Whether a value may be turned into a retrieval is decided
//! separately by [`is_valid_for_retrieval`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DeploymentId, Timestamp};

/// Default sampling interval between frames, in seconds.
pub const DEFAULT_INTERVAL_SECS: u32 = 1;

/// Default playback speed, in frames per second.
pub const DEFAULT_FRAME_RATE: f64 = 1.0;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Time-of-day restriction on the sampled images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Day,
    Night,
}

impl std::str::FromStr for Phase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Phase::Day),
            "night" => Ok(Phase::Night),
            other => Err(CoreError::Validation(format!(
                "unknown phase '{other}', expected 'day' or 'night'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SelectionCriteria
// ---------------------------------------------------------------------------

/// The full, possibly invalid, selection held by the selection state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Camera deployment to sample from.
    pub deployment: Option<DeploymentId>,
    /// Inclusive lower bound of the capture window.
    pub period_start: Option<Timestamp>,
    /// Upper bound of the capture window.
    pub period_end: Option<Timestamp>,
    /// Seconds between sampled frames. Whole seconds only; fractional
    /// intervals cannot be expressed.
    pub interval: u32,
    /// Restrict to day or night captures; `None` means no restriction.
    pub phase: Option<Phase>,
    /// Playback speed in frames per second. Never part of the query.
    pub frame_rate: f64,
}

impl Default for SelectionCriteria {
    fn default() -> Self {
        Self {
            deployment: None,
            period_start: None,
            period_end: None,
            interval: DEFAULT_INTERVAL_SECS,
            phase: None,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl SelectionCriteria {
    /// Merge a partial update into this value in place.
    ///
    /// Fields the patch leaves untouched keep their current value.
    pub fn apply(&mut self, patch: SelectionPatch) {
        if let Some(deployment) = patch.deployment {
            self.deployment = deployment;
        }
        if let Some(start) = patch.period_start {
            self.period_start = start;
        }
        if let Some(end) = patch.period_end {
            self.period_end = end;
        }
        if let Some(interval) = patch.interval {
            self.interval = interval;
        }
        if let Some(phase) = patch.phase {
            self.phase = phase;
        }
        if let Some(frame_rate) = patch.frame_rate {
            self.frame_rate = frame_rate;
        }
    }

    /// The part of the selection that decides which images are loaded.
    pub fn key(&self) -> SelectionKey {
        SelectionKey {
            deployment: self.deployment,
            period_start: self.period_start,
            period_end: self.period_end,
            interval: self.interval,
            phase: self.phase,
        }
    }

    /// Check that the selection can be turned into a retrieval.
    ///
    /// Requires a deployment and a positive interval. Period bounds are
    /// optional, but when both are present the window must not be empty.
    /// Frame rate is never inspected.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.deployment.is_none() {
            return Err(CoreError::Validation("deployment is required".into()));
        }
        if self.interval == 0 {
            return Err(CoreError::Validation(
                "interval must be at least one second".into(),
            ));
        }
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            if start >= end {
                return Err(CoreError::Validation(format!(
                    "period start {start} must be before period end {end}"
                )));
            }
        }
        Ok(())
    }
}

/// Pure retrieval predicate over a selection.
pub fn is_valid_for_retrieval(criteria: &SelectionCriteria) -> bool {
    criteria.validate().is_ok()
}

// ---------------------------------------------------------------------------
// SelectionKey
// ---------------------------------------------------------------------------

/// Comparison key used to suppress duplicate retrievals.
///
/// Equality is field by field over the fixed schema, so two selections that
/// reached the same values through different update orders compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub deployment: Option<DeploymentId>,
    pub period_start: Option<Timestamp>,
    pub period_end: Option<Timestamp>,
    pub interval: u32,
    pub phase: Option<Phase>,
}

// ---------------------------------------------------------------------------
// SelectionPatch
// ---------------------------------------------------------------------------

/// A partial update for [`SelectionCriteria`].
///
/// Clearable fields use `Option<Option<T>>`: the outer `None` leaves the
/// field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionPatch {
    pub deployment: Option<Option<DeploymentId>>,
    pub period_start: Option<Option<Timestamp>>,
    pub period_end: Option<Option<Timestamp>>,
    pub interval: Option<u32>,
    pub phase: Option<Option<Phase>>,
    pub frame_rate: Option<f64>,
}

impl SelectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployment(mut self, deployment: DeploymentId) -> Self {
        self.deployment = Some(Some(deployment));
        self
    }

    pub fn clear_deployment(mut self) -> Self {
        self.deployment = Some(None);
        self
    }

    /// Set both period bounds at once.
    pub fn with_period(mut self, start: Timestamp, end: Timestamp) -> Self {
        self.period_start = Some(Some(start));
        self.period_end = Some(Some(end));
        self
    }

    pub fn with_period_start(mut self, start: Timestamp) -> Self {
        self.period_start = Some(Some(start));
        self
    }

    pub fn with_period_end(mut self, end: Timestamp) -> Self {
        self.period_end = Some(Some(end));
        self
    }

    pub fn clear_period(mut self) -> Self {
        self.period_start = Some(None);
        self.period_end = Some(None);
        self
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(Some(phase));
        self
    }

    /// Remove any day/night restriction.
    pub fn any_phase(mut self) -> Self {
        self.phase = Some(None);
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }
}
