//! Reference event, scheduler and restriction implementations.
//!
//! These back both [`TableProblem`](super::TableProblem) and the
//! [`line`](crate::line) model. Events carry a dense index so timing and
//! quota state can live in flat vectors.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::types::{Event, Restriction, Scheduler};

/// An indexed, named event.
///
/// Equality and hashing use the index only.
#[derive(Clone)]
pub struct EventLabel {
    index: usize,
    name: Arc<str>,
    controllable: bool,
}

impl EventLabel {
    /// Creates an event with the given dense index.
    pub fn new(index: usize, name: impl Into<Arc<str>>, controllable: bool) -> Self {
        Self {
            index,
            name: name.into(),
            controllable,
        }
    }

    /// Dense index into per-event tables.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for EventLabel {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for EventLabel {}

impl Hash for EventLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for EventLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl Event for EventLabel {
    fn is_controllable(&self) -> bool {
        self.controllable
    }
}

/// Static timing rules shared by every [`TimedScheduler`] of a problem.
#[derive(Debug, Clone, Default)]
pub struct TimingRules {
    /// `arms[i] = Some((j, d))`: firing event `i` starts a clock of length
    /// `d` for event `j`.
    arms: Vec<Option<(usize, f64)>>,
    /// Events that are only enabled while their clock runs.
    clocked: Vec<bool>,
}

impl TimingRules {
    /// Rules for `event_count` events with no clocks.
    pub fn new(event_count: usize) -> Self {
        Self {
            arms: vec![None; event_count],
            clocked: vec![false; event_count],
        }
    }

    /// Firing `start` arms `finish` with `duration` time units.
    pub fn with_task(mut self, start: usize, finish: usize, duration: f64) -> Self {
        self.arms[start] = Some((finish, duration));
        self.clocked[finish] = true;
        self
    }

    /// Number of events covered.
    pub fn len(&self) -> usize {
        self.arms.len()
    }

    /// Whether no events are covered.
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }
}

/// Clock-based scheduler.
///
/// Unclocked events are always enabled and take no time. A clocked event
/// is enabled only while its clock runs and only if no other running clock
/// expires earlier; firing it advances every running clock by its
/// remaining time.
#[derive(Debug, Clone)]
pub struct TimedScheduler {
    rules: Arc<TimingRules>,
    remaining: Vec<f64>,
}

impl TimedScheduler {
    const EPSILON: f64 = 1e-9;

    /// Scheduler with every clock stopped.
    pub fn new(rules: Arc<TimingRules>) -> Self {
        let remaining = vec![f64::INFINITY; rules.len()];
        Self { rules, remaining }
    }

    fn earliest(&self) -> f64 {
        self.remaining
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Remaining time of `index`'s clock (`INFINITY` when stopped).
    pub fn remaining(&self, index: usize) -> f64 {
        self.remaining[index]
    }
}

impl PartialEq for TimedScheduler {
    fn eq(&self, other: &Self) -> bool {
        self.remaining == other.remaining
    }
}

impl Scheduler<EventLabel> for TimedScheduler {
    fn is_enabled(&self, event: &EventLabel) -> bool {
        let i = event.index();
        if !self.rules.clocked[i] {
            return true;
        }
        let left = self.remaining[i];
        left.is_finite() && left <= self.earliest() + Self::EPSILON
    }

    fn duration(&self, event: &EventLabel) -> f64 {
        let i = event.index();
        if self.rules.clocked[i] {
            self.remaining[i]
        } else {
            0.0
        }
    }

    fn update(&self, event: &EventLabel) -> Self {
        let i = event.index();
        let elapsed = self.duration(event);
        let mut next = self.clone();

        if elapsed.is_finite() && elapsed > 0.0 {
            for left in next.remaining.iter_mut().filter(|t| t.is_finite()) {
                *left = (*left - elapsed).max(0.0);
            }
        }
        if self.rules.clocked[i] {
            next.remaining[i] = f64::INFINITY;
        }
        if let Some((target, duration)) = self.rules.arms[i] {
            next.remaining[target] = duration;
        }
        next
    }
}

/// Per-event firing quota, scaled by the batch count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaRestriction {
    remaining: Vec<u32>,
}

impl QuotaRestriction {
    /// Each event `i` may fire `per_batch[i] * batch_count` times.
    ///
    /// Uncontrollable events are never checked against the quota.
    pub fn new(per_batch: &[u32], batch_count: usize) -> Self {
        let scale = u32::try_from(batch_count).unwrap_or(u32::MAX);
        Self {
            remaining: per_batch.iter().map(|&q| q.saturating_mul(scale)).collect(),
        }
    }

    /// Firings left for `index`.
    pub fn remaining(&self, index: usize) -> u32 {
        self.remaining[index]
    }
}

impl Restriction<EventLabel> for QuotaRestriction {
    fn is_enabled(&self, event: &EventLabel) -> bool {
        !event.is_controllable() || self.remaining[event.index()] > 0
    }

    fn update(&self, event: &EventLabel) -> Self {
        let mut next = self.clone();
        let slot = &mut next.remaining[event.index()];
        *slot = slot.saturating_sub(1);
        next
    }
}
