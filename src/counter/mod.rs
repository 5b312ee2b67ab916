//! Rep counting for khel.
//!
//! The recording flow forwards sampled frames to a rep counter and receives
//! updated counts through a callback. Implementations are free to run a real
//! pose-estimation model behind this contract; the ones shipped here are a
//! motion heuristic and a paced mock.

pub mod motion;
pub mod paced;

pub use motion::MotionCounter;
pub use paced::PacedCounter;

use crate::capture::Frame;

/// Receives cumulative rep counts as they are detected.
pub type CountCallback = Box<dyn FnMut(u32) + Send>;

/// Contract between the recording flow and a rep-counting backend.
///
/// `process_frame` is fire-and-forget: results are delivered through the
/// callback the counter was constructed with. `reset` zeroes the cumulative
/// count and any internal detection state; the flow invokes it whenever a
/// session resets (entering recording, or retake).
pub trait RepCounter {
    fn process_frame(&mut self, frame: &Frame);

    fn reset(&mut self);
}

impl RepCounter for Box<dyn RepCounter + Send> {
    fn process_frame(&mut self, frame: &Frame) {
        (**self).process_frame(frame);
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
