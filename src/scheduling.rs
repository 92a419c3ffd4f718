//! Timed-playback scheduling for the simulated assistant.
//!
//! Two behaviors live here: (a) a faked 500–1500 ms "thinking" latency
//! before a reply lands and (b) the staggered reveal of execution
//! log entries.  Instead of chaining ad-hoc timeouts, both are expressed as
//! an explicit *plan* — a list of `(delay, payload)` pairs — computed by a
//! pure function and only then handed to the timer executor.  Ordering and
//! spacing are testable without ever sleeping.

use std::cell::RefCell;

use gloo_timers::callback::Timeout;
use rand::Rng;

use crate::models::ExecutionLogEntry;

thread_local! {
    // Handles for the in-flight playback; dropping one clears its timeout.
    static PLAYBACK_TIMERS: RefCell<Vec<Timeout>> = RefCell::new(Vec::new());
}

/// Inclusive lower / exclusive upper bound of the fake assistant latency.
pub const REPLY_LATENCY_MS: (u32, u32) = (500, 1500);

/// Delay between consecutive log entries appearing in the transcript.
/// Matches the 800 ms spacing of the generated timestamps.
pub const LOG_REVEAL_STEP_MS: u32 = 800;

/// One scheduled reveal: fire `payload` after `delay_ms`.
#[derive(Clone, Debug, PartialEq)]
pub struct TimedEvent<T> {
    pub delay_ms: u32,
    pub payload: T,
}

/// Lay out log entries on the timeline: entry `i` appears after
/// `i * LOG_REVEAL_STEP_MS`.
pub fn log_playback_plan(entries: Vec<ExecutionLogEntry>) -> Vec<TimedEvent<ExecutionLogEntry>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| TimedEvent {
            delay_ms: i as u32 * LOG_REVEAL_STEP_MS,
            payload: entry,
        })
        .collect()
}

/// Random latency for the next simulated reply.
pub fn reply_latency_ms() -> u32 {
    rand::thread_rng().gen_range(REPLY_LATENCY_MS.0..REPLY_LATENCY_MS.1)
}

/// Fire each event of a plan through `handler` at its scheduled delay.
///
/// Starting a new plan supersedes the previous one: whatever it still had
/// pending is dropped, which clears those timeouts.
pub fn run_plan<T, F>(plan: Vec<TimedEvent<T>>, handler: F)
where
    T: 'static,
    F: Fn(T) + Clone + 'static,
{
    cancel_playback();
    PLAYBACK_TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        for event in plan {
            let handler = handler.clone();
            timers.push(Timeout::new(event.delay_ms, move || handler(event.payload)));
        }
    });
}

/// Drop every pending reveal without firing it.  Clearing the canvas
/// mid-playback goes through here so the transcript stops growing.
pub fn cancel_playback() {
    PLAYBACK_TIMERS.with(|timers| timers.borrow_mut().clear());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExecutionStatus;

    fn entry(id: &str) -> ExecutionLogEntry {
        ExecutionLogEntry {
            node_id: id.to_string(),
            node_name: id.to_string(),
            status: ExecutionStatus::Success,
            timestamp_ms: 0.0,
            message: None,
            error: None,
        }
    }

    #[test]
    fn plan_spaces_entries_by_the_reveal_step() {
        let plan = log_playback_plan(vec![entry("a"), entry("b"), entry("c")]);
        let delays: Vec<u32> = plan.iter().map(|e| e.delay_ms).collect();
        assert_eq!(delays, vec![0, 800, 1600]);
        assert_eq!(plan[2].payload.node_id, "c");
    }

    #[test]
    fn empty_plan_is_empty() {
        assert!(log_playback_plan(Vec::new()).is_empty());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod playback_tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use gloo_timers::future::TimeoutFuture;
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn plan_of(delays: &[u32]) -> Vec<TimedEvent<usize>> {
        delays
            .iter()
            .enumerate()
            .map(|(i, d)| TimedEvent {
                delay_ms: *d,
                payload: i,
            })
            .collect()
    }

    #[wasm_bindgen_test]
    async fn cancel_playback_drops_pending_reveals() {
        let fired = Rc::new(Cell::new(0u32));
        let counter = fired.clone();
        run_plan(plan_of(&[0, 60, 120]), move |_| {
            counter.set(counter.get() + 1)
        });

        TimeoutFuture::new(30).await;
        cancel_playback();
        TimeoutFuture::new(200).await;

        // Only the entry scheduled before the cancel made it through.
        assert_eq!(fired.get(), 1);
    }

    #[wasm_bindgen_test]
    async fn starting_a_new_plan_supersedes_the_old_one() {
        let fired = Rc::new(Cell::new(0u32));
        let old = fired.clone();
        run_plan(plan_of(&[100]), move |_| old.set(old.get() + 100));
        let new = fired.clone();
        run_plan(plan_of(&[30]), move |_| new.set(new.get() + 1));

        TimeoutFuture::new(200).await;
        assert_eq!(fired.get(), 1);
    }
}
