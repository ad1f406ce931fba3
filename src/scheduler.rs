// Host tick scheduling: single-shot requests, at most one tick per frame

/// Identifies one scheduled tick. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Something that can call the simulation back on a later frame.
pub trait TickScheduler {
    /// Requests a single callback on the next frame.
    fn request_tick(&mut self) -> TickHandle;
    /// Withdraws a pending request. Unknown or already fired handles are ignored.
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Scheduler driven by the window's frame loop: whatever is pending when a frame starts
/// is handed back by [`FrameScheduler::take_due`] and fired exactly once.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Pops the request due on this frame, if any.
    pub fn take_due(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl TickScheduler for FrameScheduler {
    fn request_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        if let Some(old) = self.pending.replace(handle) {
            log::warn!("Tick {} superseded by tick {}", old.0, handle.0);
        }
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_then_take() {
        let mut scheduler = FrameScheduler::new();
        assert_eq!(scheduler.take_due(), None);

        let handle = scheduler.request_tick();
        assert!(scheduler.has_pending());
        assert_eq!(scheduler.take_due(), Some(handle));
        // Single shot
        assert_eq!(scheduler.take_due(), None);
    }

    #[test]
    fn test_cancel_only_matching_handle() {
        let mut scheduler = FrameScheduler::new();
        let first = scheduler.request_tick();
        scheduler.take_due();
        let second = scheduler.request_tick();
        assert_ne!(first, second);

        scheduler.cancel_tick(first);
        assert!(scheduler.has_pending());
        scheduler.cancel_tick(second);
        assert!(!scheduler.has_pending());
    }
}
