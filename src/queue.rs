//! Bounded FIFO hand-off between one producer and many consumers.

use parking_lot::{Condvar, Mutex};

struct Inner<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
    closed: bool,
}

/// Fixed-capacity circular buffer with blocking push/pop.
///
/// `push` suspends the producer while the buffer is full, giving back-pressure;
/// `pop` suspends a consumer while it is empty. Items are delivered in push
/// order, each to exactly one consumer. The queue never fails; the only
/// non-blocking outcome is observing `close`, which unblocks all waiters so
/// the pool can shut down.
pub struct TaskQueue<T> {
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> TaskQueue<T> {
    /// Create a queue with the given fixed capacity.
    ///
    /// Panics if `capacity` is zero; `Config::validate` rejects that earlier.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be > 0");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            inner: Mutex::new(Inner {
                slots: slots.into_boxed_slice(),
                head: 0,
                tail: 0,
                count: 0,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Insert at the tail, blocking while the queue is full.
    ///
    /// Returns `false` if the queue was closed (the item is dropped).
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        while inner.count == self.capacity && !inner.closed {
            self.not_full.wait(&mut inner);
        }
        if inner.closed {
            return false;
        }

        let tail = inner.tail;
        inner.slots[tail] = Some(item);
        inner.tail = (tail + 1) % self.capacity;
        inner.count += 1;
        drop(inner);

        self.not_empty.notify_one();
        true
    }

    /// Remove from the head, blocking while the queue is empty.
    ///
    /// Returns `None` only once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock();
        while inner.count == 0 {
            if inner.closed {
                return None;
            }
            self.not_empty.wait(&mut inner);
        }

        let head = inner.head;
        let item = inner.slots[head].take();
        debug_assert!(item.is_some(), "occupied slot was empty");
        inner.head = (head + 1) % self.capacity;
        inner.count -= 1;
        drop(inner);

        self.not_full.notify_one();
        item
    }

    /// Close the queue, waking every blocked producer and consumer.
    ///
    /// Already-queued items remain poppable; new pushes are refused.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> std::fmt::Debug for TaskQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TaskQueue")
            .field("capacity", &self.capacity)
            .field("count", &inner.count)
            .field("closed", &inner.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = TaskQueue::new(8);
        for i in 0..8u64 {
            assert!(queue.push(i));
        }
        for i in 0..8u64 {
            assert_eq!(queue.pop(), Some(i));
        }
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let queue = TaskQueue::new(3);
        // drive head/tail around the buffer several times
        for round in 0..5u64 {
            for i in 0..3u64 {
                assert!(queue.push(round * 3 + i));
            }
            for i in 0..3u64 {
                assert_eq!(queue.pop(), Some(round * 3 + i));
            }
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_blocks_when_full() {
        let queue = Arc::new(TaskQueue::new(2));
        assert!(queue.push(1u64));
        assert!(queue.push(2));

        let entered = Arc::new(AtomicBool::new(false));
        let done = Arc::new(AtomicBool::new(false));

        let producer = {
            let queue = queue.clone();
            let entered = entered.clone();
            let done = done.clone();
            thread::spawn(move || {
                entered.store(true, Ordering::SeqCst);
                assert!(queue.push(3));
                done.store(true, Ordering::SeqCst);
            })
        };

        while !entered.load(Ordering::SeqCst) {
            thread::yield_now();
        }
        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst), "push completed over capacity");

        assert_eq!(queue.pop(), Some(1));
        producer.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue = Arc::new(TaskQueue::new(2));

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(queue.push(42u64));
        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn test_close_wakes_consumers() {
        let queue: Arc<TaskQueue<u64>> = Arc::new(TaskQueue::new(4));

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.pop())
            })
            .collect();

        thread::sleep(Duration::from_millis(20));
        queue.close();

        for consumer in consumers {
            assert_eq!(consumer.join().unwrap(), None);
        }
        assert!(!queue.push(1));
    }

    #[test]
    fn test_close_drains_pending_items() {
        let queue = TaskQueue::new(4);
        assert!(queue.push(1u64));
        assert!(queue.push(2));
        queue.close();

        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_exactly_once_delivery_many_consumers() {
        const ITEMS: u64 = 10_000;
        let queue = Arc::new(TaskQueue::new(64));

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(item) = queue.pop() {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        for i in 0..ITEMS {
            assert!(queue.push(i));
        }
        queue.close();

        let mut all = Vec::new();
        for consumer in consumers {
            let seen = consumer.join().unwrap();
            // each consumer observes a FIFO-consistent subsequence
            assert!(seen.windows(2).all(|w| w[0] < w[1]));
            all.extend(seen);
        }

        assert_eq!(all.len() as u64, ITEMS);
        let distinct: HashSet<u64> = all.into_iter().collect();
        assert_eq!(distinct.len() as u64, ITEMS);
    }
}
