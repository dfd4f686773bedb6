//! Admission slots: the counting resource that bounds how many task bodies run at once.

use std::{fmt, num::NonZeroUsize};

use crate::sync::{Condvar, Mutex};

/// A fixed number of admission slots.
///
/// A slot is not tied to any particular task. Acquiring one yields a [`SlotGuard`], and dropping
/// the guard puts the slot back, whether the holder finished normally or is unwinding.
pub struct Slots {
    available: Mutex<usize>,
    condvar: Condvar,
    capacity: NonZeroUsize,
}

impl Slots {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            available: Mutex::new(capacity.get()),
            condvar: Condvar::new(),
            capacity,
        }
    }

    /// Takes a slot, blocking the calling thread while all of them are held.
    pub fn acquire(&self) -> SlotGuard<'_> {
        let mut available = self.condvar.wait_while(self.available.lock(), |n| *n == 0);
        *available -= 1;
        SlotGuard { slots: self }
    }

    /// Takes a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<SlotGuard<'_>> {
        let mut available = self.available.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        Some(SlotGuard { slots: self })
    }

    /// Number of slots not currently held.
    pub fn available(&self) -> usize {
        *self.available.lock()
    }

    #[inline]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    fn release(&self) {
        let mut available = self.available.lock();
        debug_assert!(*available < self.capacity.get(), "released more slots than acquired");
        *available += 1;
        drop(available);
        self.condvar.notify_one();
    }
}

impl fmt::Debug for Slots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slots")
            .field("available", &self.available)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// A held admission slot. Released on drop.
#[must_use = "dropping a `SlotGuard` releases the slot immediately"]
pub struct SlotGuard<'a> {
    slots: &'a Slots,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slots.release();
    }
}
