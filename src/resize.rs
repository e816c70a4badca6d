//! Debounced resize handling.
//!
//! Window resize events arrive in bursts while the user drags an edge. The
//! [`ResizeDebouncer`] keeps at most one pending resize token: every new event
//! cancels the pending one and restarts the quiet period. The event loop polls
//! once per frame and applies the surviving size once the quiet period has
//! passed.

use instant::{Duration, Instant};
use winit::dpi::PhysicalSize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingResize {
    pub size: PhysicalSize<u32>,
    pub deadline: Instant,
}

#[derive(Debug)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<PendingResize>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records a resize, replacing whatever was pending.
    pub fn push(&mut self, size: PhysicalSize<u32>, now: Instant) {
        if self.pending.is_some() {
            log::trace!("resize to {}x{} supersedes pending resize", size.width, size.height);
        }
        self.pending = Some(PendingResize {
            size,
            deadline: now + self.delay,
        });
    }

    /// Hands out the pending size once its quiet period is over.
    pub fn poll(&mut self, now: Instant) -> Option<PhysicalSize<u32>> {
        match self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending = None;
                Some(pending.size)
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
