//! Synchronization clock scheduling
//!
//! The clock is a cooperative loop: each frame runs one synchronous sync
//! pass and then re-arms itself. At most one frame is pending at a time,
//! identified by a [`FrameHandle`]. Cancelling invalidates the handle, so
//! a frame requested before `pause()`/`destroy()` can never run after it,
//! even if the host delivers it late.

/// Identity of one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Pending-frame bookkeeping
#[derive(Debug, Default)]
pub struct SyncClock {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl SyncClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a new frame, replacing any pending one
    pub fn schedule(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    /// Invalidate the pending frame, returning it if there was one
    pub fn cancel(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume `handle` if it is the pending frame
    ///
    /// Returns false for stale or cancelled handles.
    pub fn claim(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

/// Authoritative playhead for the next frame
///
/// `max(current, max(resource_time + start))` over the samples of
/// resources that are advancing. Never less than `current`.
pub fn furthest_position<I>(current: f64, advancing: I) -> f64
where
    I: IntoIterator<Item = (f64, f64)>,
{
    advancing
        .into_iter()
        .map(|(resource_time, start_position)| resource_time + start_position)
        .filter(|candidate| candidate.is_finite())
        .fold(current, f64::max)
}
