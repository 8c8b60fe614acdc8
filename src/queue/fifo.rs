//! Fixed-capacity FIFO with blocking, non-blocking and timed operations
//!
//! The FIFO supports any number of concurrent producers and consumers. A
//! single mutex guards the buffer; two condition variables carry the
//! "space freed" and "element available" signals. A separate atomic length
//! mirror lets the observers answer without taking the lock.
//!
//! Disabling the queue fails pending and future pushes immediately while
//! leaving consumers free to drain the remaining elements.

use crate::queue::error::{PushError, TimedPopError, TryPopError, TryPushError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct FifoInner<T> {
    items: VecDeque<T>,
    enabled: bool,
}

/// Bounded multi-producer/multi-consumer FIFO.
///
/// Elements are owned by the queue while enqueued; a successful pop transfers
/// ownership back to the caller. Every successful push pairs with exactly one
/// successful pop.
#[derive(Debug)]
pub struct BoundedFifo<T> {
    inner: Mutex<FifoInner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    len: AtomicUsize,
}

impl<T> BoundedFifo<T> {
    /// Create a FIFO holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be greater than zero");

        Self {
            inner: Mutex::new(FifoInner {
                items: VecDeque::with_capacity(capacity),
                enabled: true,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            len: AtomicUsize::new(0),
        }
    }

    /// Append an element, blocking while the queue is full.
    ///
    /// Returns the element inside [`PushError::Disabled`] if the queue is, or
    /// becomes, disabled while waiting.
    pub fn push_back(&self, value: T) -> Result<(), PushError<T>> {
        self.push_back_counted(value).map(|_| ())
    }

    /// Append an element without blocking.
    pub fn try_push_back(&self, value: T) -> Result<(), TryPushError<T>> {
        self.try_push_back_counted(value).map(|_| ())
    }

    /// Remove the front element, blocking until one is available.
    ///
    /// Disabling the queue does not wake blocked consumers; shutdown is
    /// conventionally signalled by enqueueing a sentinel element.
    pub fn pop_front(&self) -> T {
        self.pop_front_counted().0
    }

    /// Remove the front element without blocking.
    pub fn try_pop_front(&self) -> Result<T, TryPopError> {
        self.try_pop_front_counted().map(|(value, _)| value)
    }

    /// Remove the front element, waiting up to `timeout` for one to arrive.
    pub fn timed_pop_front(&self, timeout: Duration) -> Result<T, TimedPopError> {
        self.timed_pop_front_counted(timeout).map(|(value, _)| value)
    }

    /// Like [`push_back`](Self::push_back), additionally returning the
    /// number of elements observed inside the critical section, right after
    /// the push.
    pub(crate) fn push_back_counted(&self, value: T) -> Result<usize, PushError<T>> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if !inner.enabled {
                return Err(PushError::Disabled(value));
            }
            if inner.items.len() < self.capacity {
                break;
            }
            inner = self.not_full.wait(inner).unwrap();
        }

        inner.items.push_back(value);
        let len = inner.items.len();
        self.len.store(len, Ordering::Release);
        drop(inner);
        self.not_empty.notify_one();
        Ok(len)
    }

    pub(crate) fn try_push_back_counted(&self, value: T) -> Result<usize, TryPushError<T>> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.enabled {
            return Err(TryPushError::Disabled(value));
        }
        if inner.items.len() == self.capacity {
            return Err(TryPushError::Full(value));
        }

        inner.items.push_back(value);
        let len = inner.items.len();
        self.len.store(len, Ordering::Release);
        drop(inner);
        self.not_empty.notify_one();
        Ok(len)
    }

    pub(crate) fn pop_front_counted(&self) -> (T, usize) {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(value) = inner.items.pop_front() {
                let len = inner.items.len();
                self.len.store(len, Ordering::Release);
                drop(inner);
                self.not_full.notify_one();
                return (value, len);
            }
            inner = self.not_empty.wait(inner).unwrap();
        }
    }

    pub(crate) fn try_pop_front_counted(&self) -> Result<(T, usize), TryPopError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.items.pop_front() {
            Some(value) => {
                let len = inner.items.len();
                self.len.store(len, Ordering::Release);
                drop(inner);
                self.not_full.notify_one();
                Ok((value, len))
            }
            None => Err(TryPopError::Empty),
        }
    }

    pub(crate) fn timed_pop_front_counted(
        &self,
        timeout: Duration,
    ) -> Result<(T, usize), TimedPopError> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(value) = inner.items.pop_front() {
                let len = inner.items.len();
                self.len.store(len, Ordering::Release);
                drop(inner);
                self.not_full.notify_one();
                return Ok((value, len));
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(TimedPopError::Timeout);
            }
            let (guard, _) = self.not_empty.wait_timeout(inner, deadline - now).unwrap();
            inner = guard;
        }
    }

    /// Current number of elements. Lock-free; may be momentarily stale under
    /// concurrent mutation.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Allow pushes again after a [`disable`](Self::disable).
    pub fn enable(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.enabled = true;
    }

    /// Fail pending and future pushes. Blocked pushers wake up and return
    /// [`PushError::Disabled`]; consumers keep draining.
    pub fn disable(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.enabled = false;
        drop(inner);
        self.not_full.notify_all();
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().unwrap().enabled
    }

    /// Drop all elements and return to empty.
    ///
    /// Must not run concurrently with pushers or poppers; the caller is
    /// expected to quiesce the queue first.
    pub fn reset(&self) {
        let drained = {
            let mut inner = self.inner.lock().unwrap();
            let drained = std::mem::take(&mut inner.items);
            self.len.store(0, Ordering::Release);
            drained
        };
        // Element drops run outside the lock.
        drop(drained);
        self.not_full.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_creation() {
        let fifo: BoundedFifo<i32> = BoundedFifo::new(4);

        assert_eq!(fifo.capacity(), 4);
        assert_eq!(fifo.len(), 0);
        assert!(fifo.is_empty());
        assert!(fifo.is_enabled());
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than zero")]
    fn test_zero_capacity_panics() {
        let _fifo: BoundedFifo<i32> = BoundedFifo::new(0);
    }

    #[test]
    fn test_push_pop_order() {
        let fifo = BoundedFifo::new(4);

        fifo.push_back(1).unwrap();
        fifo.push_back(2).unwrap();
        fifo.push_back(3).unwrap();

        assert_eq!(fifo.len(), 3);
        assert_eq!(fifo.pop_front(), 1);
        assert_eq!(fifo.pop_front(), 2);
        assert_eq!(fifo.pop_front(), 3);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_counted_operations_report_in_lock_length() {
        let fifo = BoundedFifo::new(4);

        assert_eq!(fifo.push_back_counted(1).unwrap(), 1);
        assert_eq!(fifo.push_back_counted(2).unwrap(), 2);
        assert_eq!(fifo.try_push_back_counted(3).unwrap(), 3);

        assert_eq!(fifo.pop_front_counted(), (1, 2));
        assert_eq!(fifo.try_pop_front_counted().unwrap(), (2, 1));
        assert_eq!(
            fifo.timed_pop_front_counted(Duration::from_millis(5)).unwrap(),
            (3, 0)
        );
    }

    #[test]
    fn test_try_push_full() {
        let fifo = BoundedFifo::new(2);
        fifo.try_push_back(1).unwrap();
        fifo.try_push_back(2).unwrap();

        match fifo.try_push_back(3) {
            Err(TryPushError::Full(value)) => assert_eq!(value, 3),
            other => panic!("expected Full, got {:?}", other),
        }
        assert_eq!(fifo.len(), 2);
    }

    #[test]
    fn test_try_pop_empty() {
        let fifo: BoundedFifo<i32> = BoundedFifo::new(2);
        assert_eq!(fifo.try_pop_front(), Err(TryPopError::Empty));
    }

    #[test]
    fn test_timed_pop_times_out() {
        let fifo: BoundedFifo<i32> = BoundedFifo::new(2);
        let timeout = Duration::from_millis(20);

        let start = Instant::now();
        let result = fifo.timed_pop_front(timeout);
        let elapsed = start.elapsed();

        assert_eq!(result, Err(TimedPopError::Timeout));
        assert!(elapsed >= timeout, "returned early after {:?}", elapsed);
    }

    #[test]
    fn test_timed_pop_returns_pushed_element() {
        let fifo = Arc::new(BoundedFifo::new(2));

        let pusher = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                fifo.push_back(7).unwrap();
            })
        };

        let value = fifo.timed_pop_front(Duration::from_secs(5)).unwrap();
        assert_eq!(value, 7);
        pusher.join().unwrap();
    }

    #[test]
    fn test_blocked_pusher_wakes_on_pop() {
        let fifo = Arc::new(BoundedFifo::new(1));
        fifo.push_back(1).unwrap();

        let pusher = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || fifo.push_back(2))
        };

        thread::sleep(Duration::from_millis(10));
        assert_eq!(fifo.pop_front(), 1);

        pusher.join().unwrap().unwrap();
        assert_eq!(fifo.pop_front(), 2);
    }

    #[test]
    fn test_disable_wakes_blocked_pusher() {
        let fifo = Arc::new(BoundedFifo::new(1));
        fifo.push_back(1).unwrap();

        let pusher = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || fifo.push_back(2))
        };

        thread::sleep(Duration::from_millis(10));
        fifo.disable();

        match pusher.join().unwrap() {
            Err(PushError::Disabled(value)) => assert_eq!(value, 2),
            other => panic!("expected Disabled, got {:?}", other),
        }

        // Consumers still drain, and enable re-admits producers.
        assert_eq!(fifo.pop_front(), 1);
        fifo.enable();
        fifo.push_back(3).unwrap();
        assert_eq!(fifo.pop_front(), 3);
    }

    #[test]
    fn test_reset_drops_elements() {
        let fifo = BoundedFifo::new(4);
        fifo.push_back(1).unwrap();
        fifo.push_back(2).unwrap();

        fifo.reset();

        assert!(fifo.is_empty());
        assert_eq!(fifo.try_pop_front(), Err(TryPopError::Empty));
    }
}
