// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Per-Order Locks
//!
//! Every read-modify-commit cycle on an order runs under that order's lock,
//! so two operations on the same order are serialized while operations on
//! different orders proceed in parallel.
//!
//! The registry maps each `OrderId` to an `Arc<Mutex<()>>`. Taking a lock
//! only holds the registry mutex long enough to clone the `Arc`; the order
//! mutex itself is then acquired through an owned guard, which keeps the
//! entry alive for as long as the guard exists. The last guard of an order
//! removes its entry when dropped, so the registry only holds orders that
//! are locked or waited for.
//!
//! ## Usage
//!
//! ```rust
//! use stowage_service::lock::OrderLocks;
//! use stowage_model::index::OrderId;
//!
//! let locks = OrderLocks::new();
//! {
//!     let _guard = locks.lock(OrderId::new(1));
//!     // read, plan and commit the order
//!     assert_eq!(locks.len(), 1);
//! }
//! assert!(locks.is_empty());
//! ```

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use stowage_model::index::OrderId;

/// Holds the lock of one order until dropped.
#[must_use = "the order is unlocked as soon as the guard is dropped"]
pub struct OrderGuard<'a> {
    order_id: OrderId,
    registry: &'a OrderLocks,
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl OrderGuard<'_> {
    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }
}

impl Drop for OrderGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the guard's own `Arc` no longer counts.
        drop(self.guard.take());
        self.registry.release(self.order_id);
    }
}

impl std::fmt::Debug for OrderGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderGuard")
            .field("order_id", &self.order_id)
            .finish()
    }
}

/// A registry of mutexes keyed by order.
#[derive(Debug, Default)]
pub struct OrderLocks {
    locks: Mutex<FxHashMap<OrderId, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, order_id: OrderId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(order_id).or_default())
    }

    /// Removes the entry of `order_id` once nobody holds or waits for it.
    /// Clones of an entry are only taken under the registry mutex, so the
    /// count cannot grow while it is checked here.
    fn release(&self, order_id: OrderId) {
        let mut locks = self.locks.lock();
        if locks
            .get(&order_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&order_id);
        }
    }

    /// Blocks until the lock of `order_id` is held.
    pub fn lock(&self, order_id: OrderId) -> OrderGuard<'_> {
        let lock = self.entry(order_id);
        OrderGuard {
            order_id,
            registry: self,
            guard: Some(lock.lock_arc()),
        }
    }

    /// Takes the lock of `order_id` only if nobody holds it.
    pub fn try_lock(&self, order_id: OrderId) -> Option<OrderGuard<'_>> {
        let lock = self.entry(order_id);
        let guard = lock.try_lock_arc();
        drop(lock);
        match guard {
            Some(guard) => Some(OrderGuard {
                order_id,
                registry: self,
                guard: Some(guard),
            }),
            None => {
                self.release(order_id);
                None
            }
        }
    }

    /// Drops the entries of orders nobody holds or waits for. Guards clean up
    /// after themselves, so this only finds entries left behind by a panic
    /// between taking an entry and locking it.
    pub fn prune(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of orders with a registry entry.
    #[inline]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_lock_is_exclusive_per_order() {
        let locks = OrderLocks::new();
        let guard = locks.lock(OrderId::new(1));
        assert_eq!(guard.order_id(), OrderId::new(1));

        assert!(locks.try_lock(OrderId::new(1)).is_none());
        assert!(locks.try_lock(OrderId::new(2)).is_some());

        drop(guard);
        assert!(locks.try_lock(OrderId::new(1)).is_some());
    }

    #[test]
    fn test_dropped_guards_remove_their_entries() {
        let locks = OrderLocks::new();
        let held = locks.lock(OrderId::new(1));
        drop(locks.lock(OrderId::new(2)));
        drop(locks.try_lock(OrderId::new(3)));
        assert_eq!(locks.len(), 1);

        assert!(locks.try_lock(OrderId::new(1)).is_none());
        assert_eq!(locks.len(), 1);
        drop(held);
        assert!(locks.is_empty());
        assert_eq!(locks.prune(), 0);
    }

    #[test]
    fn test_prune_keeps_held_locks() {
        let locks = OrderLocks::new();
        let held = locks.lock(OrderId::new(1));
        let stale = locks.entry(OrderId::new(2));
        drop(stale);
        assert_eq!(locks.len(), 2);

        assert_eq!(locks.prune(), 1);
        assert_eq!(locks.len(), 1);
        drop(held);
        assert!(locks.is_empty());
    }

    #[test]
    fn test_waiters_keep_the_entry_alive() {
        let locks = OrderLocks::new();
        let held = locks.lock(OrderId::new(4));

        std::thread::scope(|s| {
            let waiter = s.spawn(|| {
                let guard = locks.lock(OrderId::new(4));
                guard.order_id()
            });
            while locks
                .locks
                .lock()
                .get(&OrderId::new(4))
                .is_some_and(|lock| Arc::strong_count(lock) < 3)
            {
                std::thread::yield_now();
            }
            drop(held);
            assert_eq!(waiter.join().unwrap(), OrderId::new(4));
        });

        assert!(locks.is_empty());
    }

    #[test]
    fn test_lock_serializes_threads() {
        let locks = OrderLocks::new();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        let _guard = locks.lock(OrderId::new(7));
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        std::hint::spin_loop();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }
}
