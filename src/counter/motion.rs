//! Motion-based rep detection.
//!
//! Placeholder for a real pose-estimation model: tracks the mean luma of
//! sampled frames against a slow-moving baseline and counts one rep per
//! down/up cycle. A body moving through the frame darkens or lightens it
//! enough to register as a dip; hysteresis between the dip and rise
//! thresholds keeps sensor noise from producing phantom reps.

use crate::capture::Frame;

use super::{CountCallback, RepCounter};

/// Smoothing factor for the luma baseline (exponential moving average).
const BASELINE_ALPHA: f32 = 0.05;

/// Deviation from baseline (luma units) that enters the down phase.
const DIP_THRESHOLD: f32 = 12.0;

/// Deviation from baseline that confirms the return to the up phase.
const RISE_THRESHOLD: f32 = -4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Up,
    Down,
}

/// Counts exercise repetitions from frame-to-frame luma motion.
pub struct MotionCounter {
    on_count: CountCallback,
    count: u32,
    baseline: Option<f32>,
    phase: Phase,
}

impl MotionCounter {
    pub fn new(on_count: CountCallback) -> Self {
        Self {
            on_count,
            count: 0,
            baseline: None,
            phase: Phase::Up,
        }
    }
}

impl RepCounter for MotionCounter {
    fn process_frame(&mut self, frame: &Frame) {
        let mean = frame.mean_luma();

        // First frame establishes the baseline
        let baseline = *self.baseline.get_or_insert(mean);
        let deviation = mean - baseline;

        match self.phase {
            Phase::Up => {
                if deviation <= -DIP_THRESHOLD {
                    self.phase = Phase::Down;
                    tracing::trace!("Rep phase down (deviation {deviation:.1})");
                }
            }
            Phase::Down => {
                if deviation >= RISE_THRESHOLD {
                    self.phase = Phase::Up;
                    self.count += 1;
                    tracing::debug!("Rep detected: {}", self.count);
                    (self.on_count)(self.count);
                }
            }
        }

        self.baseline = Some(baseline + BASELINE_ALPHA * (mean - baseline));
    }

    fn reset(&mut self) {
        self.count = 0;
        self.baseline = None;
        self.phase = Phase::Up;
        tracing::debug!("Motion counter reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn flat_frame(luma: u8) -> Frame {
        Frame {
            width: 4,
            height: 4,
            luma: vec![luma; 16],
        }
    }

    fn counter_with_log() -> (MotionCounter, Arc<Mutex<Vec<u32>>>) {
        let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let counter = MotionCounter::new(Box::new(move |count| {
            sink.lock().unwrap().push(count);
        }));
        (counter, log)
    }

    fn feed(counter: &mut MotionCounter, luma: u8, frames: usize) {
        let frame = flat_frame(luma);
        for _ in 0..frames {
            counter.process_frame(&frame);
        }
    }

    #[test]
    fn test_down_up_cycle_counts_one_rep() {
        let (mut counter, log) = counter_with_log();
        feed(&mut counter, 128, 5); // settle baseline
        feed(&mut counter, 100, 3); // dip
        feed(&mut counter, 128, 3); // rise
        assert_eq!(log.lock().unwrap().as_slice(), &[1]);
    }

    #[test]
    fn test_counts_are_cumulative() {
        let (mut counter, log) = counter_with_log();
        feed(&mut counter, 128, 5);
        for _ in 0..3 {
            feed(&mut counter, 100, 3);
            feed(&mut counter, 128, 3);
        }
        assert_eq!(log.lock().unwrap().as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_dip_without_return_does_not_count() {
        let (mut counter, log) = counter_with_log();
        feed(&mut counter, 128, 5);
        feed(&mut counter, 100, 3);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_small_noise_is_ignored() {
        let (mut counter, log) = counter_with_log();
        feed(&mut counter, 128, 5);
        feed(&mut counter, 124, 3); // within the dip threshold
        feed(&mut counter, 128, 3);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reset_zeroes_count_and_state() {
        let (mut counter, log) = counter_with_log();
        feed(&mut counter, 128, 5);
        feed(&mut counter, 100, 3);
        feed(&mut counter, 128, 3);
        counter.reset();
        // Next cycle starts over from one
        feed(&mut counter, 128, 5);
        feed(&mut counter, 100, 3);
        feed(&mut counter, 128, 3);
        assert_eq!(log.lock().unwrap().as_slice(), &[1, 1]);
    }
}
