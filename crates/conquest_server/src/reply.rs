//! # One-Shot Response Slots
//!
//! Bridges a request that must be answered from inside a tick to a caller on
//! another thread.
//!
//! ```text
//!  transport thread                     tick thread
//!  ────────────────                     ───────────
//!  (slot, waiter) = response_slot()
//!  enqueue(Command { reply: slot }) ──► apply command
//!  waiter.wait(500ms) ◄──────────────── slot.resolve(value)
//! ```
//!
//! The slot is consumed by `resolve`, so it can be answered at most once. A
//! waiter that gives up drops its end; a late `resolve` is then discarded.

use crate::error::ReplyError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Producer half, carried inside a command.
#[derive(Debug)]
pub struct ResponseSlot<T> {
    tx: Sender<T>,
}

/// Consumer half, held by the requester.
#[derive(Debug)]
pub struct ReplyWaiter<T> {
    rx: Receiver<T>,
}

/// Creates a connected slot/waiter pair.
#[must_use]
pub fn response_slot<T>() -> (ResponseSlot<T>, ReplyWaiter<T>) {
    let (tx, rx) = bounded(1);
    (ResponseSlot { tx }, ReplyWaiter { rx })
}

impl<T> ResponseSlot<T> {
    /// Answers the request.
    ///
    /// # Returns
    ///
    /// `false` if the requester already gave up.
    pub fn resolve(self, value: T) -> bool {
        self.tx.try_send(value).is_ok()
    }
}

impl<T> ReplyWaiter<T> {
    /// Blocks for at most `timeout` waiting for the answer.
    ///
    /// # Errors
    ///
    /// [`ReplyError::Timeout`] if nothing arrived in time,
    /// [`ReplyError::Abandoned`] if the slot was dropped unanswered.
    pub fn wait(self, timeout: Duration) -> Result<T, ReplyError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => ReplyError::Timeout(timeout),
            RecvTimeoutError::Disconnected => ReplyError::Abandoned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_resolved_from_other_thread() {
        let (slot, waiter) = response_slot();
        let worker = thread::spawn(move || slot.resolve(42u32));
        assert_eq!(waiter.wait(Duration::from_secs(5)), Ok(42));
        assert!(worker.join().unwrap());
    }

    #[test]
    fn test_timeout_is_bounded() {
        let (_slot, waiter) = response_slot::<u32>();
        let start = Instant::now();
        let result = waiter.wait(Duration::from_millis(50));
        assert_eq!(result, Err(ReplyError::Timeout(Duration::from_millis(50))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_dropped_slot_is_abandoned() {
        let (slot, waiter) = response_slot::<u32>();
        drop(slot);
        assert_eq!(waiter.wait(Duration::from_secs(5)), Err(ReplyError::Abandoned));
    }

    #[test]
    fn test_late_resolve_is_discarded() {
        let (slot, waiter) = response_slot::<u32>();
        drop(waiter);
        assert!(!slot.resolve(1));
    }
}
