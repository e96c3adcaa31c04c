//! Progress events emitted per job-state transition.
//!
//! Delivery is best-effort observability for the caller: a panicking or
//! otherwise misbehaving sink is contained and never affects job
//! outcomes.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::JobState;

/// One job-state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Clip identifier the event belongs to.
    pub clip_id: String,
    /// 1-based position in the submitted batch.
    pub number: usize,
    /// State the job just entered.
    pub state: JobState,
    /// Optional human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Caller-supplied sink receiving progress events.
pub type ProgressSink = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Deliver an event to the sink, containing any panic it raises.
pub(crate) fn emit(sink: Option<&ProgressSink>, event: ProgressEvent) {
    let Some(sink) = sink else { return };
    let delivery = catch_unwind(AssertUnwindSafe(|| sink(&event)));
    if delivery.is_err() {
        tracing::warn!(
            "Progress sink panicked on {} -> {}; continuing",
            event.clip_id,
            event.state
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn event(state: JobState) -> ProgressEvent {
        ProgressEvent {
            clip_id: "clip_01_Hook".to_string(),
            number: 1,
            state,
            message: None,
        }
    }

    #[test]
    fn events_reach_the_sink() {
        let seen = Arc::new(AtomicU32::new(0));
        let seen_in_sink = Arc::clone(&seen);
        let sink: ProgressSink = Arc::new(move |_| {
            seen_in_sink.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&sink), event(JobState::Preparing));
        emit(Some(&sink), event(JobState::Succeeded));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_sink_is_contained() {
        let sink: ProgressSink = Arc::new(|_| panic!("listener bug"));
        // Must not propagate.
        emit(Some(&sink), event(JobState::Rendering));
    }

    #[test]
    fn no_sink_is_a_noop() {
        emit(None, event(JobState::Pending));
    }
}
