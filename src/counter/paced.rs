//! Paced mock counter.
//!
//! Ignores frame content entirely and reports one rep whenever a randomized
//! interval has elapsed between samples. Stands in for the pose model during
//! development and demos; the randomized pace keeps the demo counter from
//! looking metronomic.

use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

use crate::capture::Frame;

use super::{CountCallback, RepCounter};

/// Shortest gap between mock reps.
const MIN_GAP: Duration = Duration::from_millis(1500);

/// Longest gap between mock reps.
const MAX_GAP: Duration = Duration::from_millis(2500);

/// Emits a rep on a randomized 1.5-2.5s cadence, regardless of frames.
pub struct PacedCounter {
    on_count: CountCallback,
    count: u32,
    last_rep: Option<Instant>,
    gap: Duration,
}

impl PacedCounter {
    pub fn new(on_count: CountCallback) -> Self {
        Self {
            on_count,
            count: 0,
            last_rep: None,
            gap: next_gap(),
        }
    }
}

fn next_gap() -> Duration {
    let millis = rand::thread_rng().gen_range(MIN_GAP.as_millis()..=MAX_GAP.as_millis());
    Duration::from_millis(millis as u64)
}

impl RepCounter for PacedCounter {
    fn process_frame(&mut self, _frame: &Frame) {
        let now = Instant::now();
        let last = *self.last_rep.get_or_insert(now);

        if now.duration_since(last) >= self.gap {
            self.count += 1;
            self.last_rep = Some(now);
            self.gap = next_gap();
            tracing::debug!("Mock rep: {}", self.count);
            (self.on_count)(self.count);
        }
    }

    fn reset(&mut self) {
        self.count = 0;
        self.last_rep = None;
        self.gap = next_gap();
        tracing::debug!("Paced counter reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn frame() -> Frame {
        Frame {
            width: 1,
            height: 1,
            luma: vec![0],
        }
    }

    fn counter_with_log() -> (PacedCounter, Arc<Mutex<Vec<u32>>>) {
        let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let counter = PacedCounter::new(Box::new(move |count| {
            sink.lock().unwrap().push(count);
        }));
        (counter, log)
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_rep_before_minimum_gap() {
        let (mut counter, log) = counter_with_log();
        counter.process_frame(&frame());
        tokio::time::advance(Duration::from_millis(1000)).await;
        counter.process_frame(&frame());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reps_accumulate_over_time() {
        let (mut counter, log) = counter_with_log();
        counter.process_frame(&frame());
        for _ in 0..10 {
            tokio::time::advance(MAX_GAP).await;
            counter.process_frame(&frame());
        }
        assert_eq!(log.lock().unwrap().as_slice(), &(1..=10).collect::<Vec<u32>>()[..]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restarts_pacing() {
        let (mut counter, log) = counter_with_log();
        counter.process_frame(&frame());
        tokio::time::advance(MAX_GAP).await;
        counter.process_frame(&frame());
        counter.reset();
        counter.process_frame(&frame());
        tokio::time::advance(MAX_GAP).await;
        counter.process_frame(&frame());
        assert_eq!(log.lock().unwrap().as_slice(), &[1, 1]);
    }
}
