/*
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
If a copy of the MPL was not distributed with this file,
You can obtain one at https://mozilla.org/MPL/2.0/.
*/
//! A generic reuse cache for tick-frequency scratch values.
//!
//! Steering runs every tick for every agent and produces a handful of
//! short-lived outputs each time; allocating those fresh would turn into a
//! steady drizzle of heap churn across a large population. The pool keeps a
//! LIFO stack of ready-to-use instances and hands them back out instead.
//!
//! The pool *never* refuses an `acquire`. Past its soft cap it keeps minting
//! fresh instances and simply stops tracking them; excess `release`s are
//! dropped on the floor. Under sustained peak demand that means a little
//! untracked garbage rather than a stall, and steady-state memory stays
//! bounded regardless of churn.
//!
//! Not internally synchronized. Use one pool per worker, or wrap it in your
//! own mutual exclusion if you must share.

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;
type ResetFn<T> = Box<dyn Fn(&mut T) + Send + Sync>;

pub struct ObjectPool<T> {
    available: Vec<T>,
    factory: Factory<T>,
    reset: ResetFn<T>,
    max_size: usize,
    created: usize,
}

impl<T> ObjectPool<T> {
    /// Builds a pool around a factory (produces a fresh instance) and a reset
    /// procedure (restores an instance to its reusable baseline), pre-warming
    /// `initial_size` instances up front.
    ///
    /// `max_size` is a soft cap: it bounds how many instances the stack will
    /// hold and how far the creation counter counts, not how many instances
    /// `acquire` will hand out.
    pub fn new(
        factory: impl Fn() -> T + Send + Sync + 'static,
        reset: impl Fn(&mut T) + Send + Sync + 'static,
        initial_size: usize,
        max_size: usize,
    ) -> Self {
        let factory: Factory<T> = Box::new(factory);
        let prewarm = initial_size.min(max_size);
        let mut available = Vec::with_capacity(prewarm);
        for _ in 0..prewarm {
            available.push((factory)());
        }

        Self {
            available,
            factory,
            reset: Box::new(reset),
            max_size,
            created: prewarm,
        }
    }

    /// Convenience constructor: pre-warms `size` instances and derives the
    /// soft cap as twice that.
    pub fn with_size(
        factory: impl Fn() -> T + Send + Sync + 'static,
        reset: impl Fn(&mut T) + Send + Sync + 'static,
        size: usize,
    ) -> Self {
        Self::new(factory, reset, size, size.saturating_mul(2))
    }

    /// Takes an instance out of the pool.
    ///
    /// Returns the most recently released instance if one is available (no
    /// reset is applied here - `release` already did it before storing).
    /// With the stack empty, a fresh instance is minted; the creation counter
    /// follows along only until it reaches the cap, after which the pool
    /// keeps minting untracked instances rather than blocking or failing.
    pub fn acquire(&mut self) -> T {
        match self.available.pop() {
            Some(instance) => instance,
            None => {
                if self.created < self.max_size {
                    self.created += 1;
                }
                (self.factory)()
            }
        }
    }

    /// Returns an instance to the pool.
    ///
    /// The instance is reset and stored if there is room below the cap;
    /// otherwise it is silently dropped. The caller must not touch the
    /// instance again until a later `acquire` re-issues it.
    pub fn release(&mut self, mut instance: T) {
        if self.available.len() < self.max_size {
            (self.reset)(&mut instance);
            self.available.push(instance);
        }
    }

    /// How many instances are currently ready to be acquired.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// Lifetime creation count, saturating at `max_size`.
    ///
    /// Known accounting quirk, kept on purpose: once the counter hits the
    /// cap it stops moving even though overflow `acquire`s keep minting
    /// fresh instances, so this is not a live-object census past that point.
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl<T> core::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("available", &self.available.len())
            .field("created", &self.created)
            .field("max_size", &self.max_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_pool(initial: usize, max: usize) -> ObjectPool<Vec<u32>> {
        ObjectPool::new(Vec::new, Vec::clear, initial, max)
    }

    #[test]
    fn prewarm_counts_toward_created() {
        let pool = counter_pool(3, 6);
        assert_eq!(pool.available(), 3);
        assert_eq!(pool.created(), 3);
    }

    #[test]
    fn with_size_doubles_the_cap() {
        let pool = ObjectPool::with_size(Vec::<u32>::new, Vec::clear, 4);
        assert_eq!(pool.max_size(), 8);
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn acquire_reuses_in_lifo_order() {
        // Identity-preserving pool: every minted instance gets a unique tag
        // and reset leaves it alone, so reuse order is observable.
        let serial = std::sync::atomic::AtomicU32::new(0);
        let mut pool = ObjectPool::new(
            move || serial.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
            |_| {},
            0,
            4,
        );

        let first = pool.acquire();
        let second = pool.acquire();
        pool.release(first);
        pool.release(second);

        // `second` went in last, so it comes out first.
        assert_eq!(pool.acquire(), second);
        assert_eq!(pool.acquire(), first);
    }

    #[test]
    fn release_resets_before_storing() {
        let mut pool = counter_pool(0, 2);
        let mut dirty = pool.acquire();
        dirty.extend([1, 2, 3]);
        pool.release(dirty);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn overflow_acquires_mint_but_stop_counting() {
        let mut pool = counter_pool(2, 4);
        let mut held = Vec::new();
        for _ in 0..6 {
            held.push(pool.acquire());
        }
        // Six usable instances went out, but the counter froze at the cap.
        assert_eq!(held.len(), 6);
        assert_eq!(pool.created(), 4);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn excess_releases_are_dropped_not_stored() {
        let mut pool = counter_pool(2, 4);
        let held: Vec<_> = (0..6).map(|_| pool.acquire()).collect();
        for instance in held {
            pool.release(instance);
        }
        assert_eq!(pool.available(), 4);
    }

    #[test]
    fn available_never_exceeds_max_size() {
        let mut pool = counter_pool(1, 3);
        // Arbitrary churn: acquire in bursts, release everything, repeat.
        for burst in 1..6 {
            let held: Vec<_> = (0..burst * 2).map(|_| pool.acquire()).collect();
            assert!(pool.available() <= pool.max_size());
            for instance in held {
                pool.release(instance);
                assert!(pool.available() <= pool.max_size());
            }
        }
    }

    #[test]
    fn prewarm_is_clamped_to_the_cap() {
        let pool = counter_pool(10, 4);
        assert_eq!(pool.available(), 4);
        assert_eq!(pool.created(), 4);
    }
}
