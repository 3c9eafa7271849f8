//! Bounded object pool with RAII guards.
//!
//! Hashing workers reuse read buffers and hash states instead of allocating
//! one per file. An item is reset every time it is acquired and goes back to
//! the pool when its [`Pooled`] guard drops. When the pool already holds
//! `capacity` idle items, the returned item is dropped instead.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

type CreateFn<T> = Box<dyn Fn() -> T + Send + Sync>;
type ResetFn<T> = Box<dyn Fn(&mut T) + Send + Sync>;

/// Thread-safe pool of reusable items.
pub struct ObjectPool<T> {
    items: Mutex<Vec<T>>,
    capacity: usize,
    create: CreateFn<T>,
    reset: ResetFn<T>,
}

impl<T> ObjectPool<T> {
    /// Create an empty pool.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of idle items retained
    /// * `create` - Builds a new item when the pool is empty
    /// * `reset` - Restores an item to a clean state before reuse
    pub fn new<C, R>(capacity: usize, create: C, reset: R) -> Self
    where
        C: Fn() -> T + Send + Sync + 'static,
        R: Fn(&mut T) + Send + Sync + 'static,
    {
        Self {
            items: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            create: Box::new(create),
            reset: Box::new(reset),
        }
    }

    /// Take an item from the pool, creating one if none is idle.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let item = self.lock().pop();
        let mut item = item.unwrap_or_else(|| (self.create)());
        (self.reset)(&mut item);
        Pooled {
            pool: self,
            item: Some(item),
        }
    }

    /// Number of idle items currently held.
    pub fn available(&self) -> usize {
        self.lock().len()
    }

    /// Maximum number of idle items retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn release(&self, item: T) {
        let mut items = self.lock();
        if items.len() < self.capacity {
            items.push(item);
        }
    }

    // A panic while holding the lock cannot leave the Vec half-modified.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Guard over a pooled item. Returns the item to its pool on drop.
pub struct Pooled<'a, T> {
    pool: &'a ObjectPool<T>,
    item: Option<T>,
}

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Only `drop` takes the item out.
        self.item.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.item.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(item) = self.item.take() {
            self.pool.release(item);
        }
    }
}
