//! Scratch memory for execution groups
//!
//! Every group invocation needs a staging buffer sized to its thread count
//! (the group-local "shared memory" of the accelerator) plus one register per
//! lane. This module provides those as pooled, aligned buffers:
//! - Exclusive ownership: a checked-out buffer belongs to one group only
//! - Scoped lifetime: the RAII guard zeroes the buffer and hands it back to
//!   the pool when the group completes
//! - Reuse: repeated launches recycle buffers instead of reallocating

use crate::{Error, Result};
use bytemuck::Pod;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Alignment used for scratch buffers unless overridden
pub const CACHE_LINE: usize = 64;

/// A zero-initialised, aligned, fixed-capacity buffer of `T`
///
/// `T: Pod` guarantees the all-zero bit pattern is a valid value, so the
/// whole capacity is always initialised.
pub struct SharedMemory<T: Pod> {
    ptr: NonNull<T>,
    capacity: usize,
    len: usize,
    layout: Option<Layout>,
    _marker: PhantomData<T>,
}

impl<T: Pod> SharedMemory<T> {
    /// Allocate a buffer with room for `capacity` elements
    ///
    /// `alignment` must be a power of two and at least the natural alignment
    /// of `T`.
    pub fn new(capacity: usize, alignment: usize) -> Result<Self> {
        if !alignment.is_power_of_two() {
            return Err(Error::not_power_of_two("alignment", alignment));
        }
        if alignment < mem::align_of::<T>() {
            return Err(Error::InvalidParameter(format!(
                "alignment must be at least {}, got {alignment}",
                mem::align_of::<T>()
            )));
        }

        if capacity == 0 || mem::size_of::<T>() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                len: 0,
                layout: None,
                _marker: PhantomData,
            });
        }

        let size = capacity
            .checked_mul(mem::size_of::<T>())
            .ok_or_else(|| Error::Memory(format!("scratch of {capacity} elements overflows")))?;
        let layout = Layout::from_size_align(size, alignment)
            .map_err(|e| Error::Memory(format!("invalid scratch layout: {e}")))?;

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc_zeroed(layout) } as *mut T;
        let ptr = NonNull::new(raw)
            .ok_or_else(|| Error::Memory(format!("failed to allocate {size} bytes of scratch")))?;

        Ok(Self {
            ptr,
            capacity,
            len: 0,
            layout: Some(layout),
            _marker: PhantomData,
        })
    }

    /// Get a slice of the used portion
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is valid for `capacity` initialised elements and len <= capacity.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Get a mutable slice of the used portion
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Change the used length without reallocating
    ///
    /// # Panics
    /// If `new_len > capacity`
    #[inline]
    pub fn resize(&mut self, new_len: usize) {
        assert!(new_len <= self.capacity, "Cannot resize beyond capacity");
        self.len = new_len;
    }

    /// Zero the used portion and reset the length
    fn clear(&mut self) {
        self.as_mut_slice().fill(T::zeroed());
        self.len = 0;
    }

    /// Get the capacity of the buffer
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the current length of the buffer
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Address of the first element
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }
}

impl<T: Pod> Drop for SharedMemory<T> {
    fn drop(&mut self) {
        if let Some(layout) = self.layout {
            // SAFETY: allocated in `new` with this exact layout.
            unsafe {
                dealloc(self.ptr.as_ptr() as *mut u8, layout);
            }
        }
    }
}

// Safety: SharedMemory owns its allocation exclusively
unsafe impl<T: Pod + Send> Send for SharedMemory<T> {}
// Safety: shared access only hands out &[T]
unsafe impl<T: Pod + Sync> Sync for SharedMemory<T> {}

/// Allocation counters for a [`ScratchPool`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers allocated fresh
    pub allocations: usize,
    /// Checkouts served from a pooled buffer
    pub reuses: usize,
    /// Buffers currently idle in the pool
    pub retained: usize,
}

/// Pool of scratch buffers shared by all groups of a launch
///
/// Maintains a pool of reusable buffers to minimize allocations.
/// Buffers are automatically returned to the pool when their guard drops.
pub struct ScratchPool<T: Pod> {
    buffers: Mutex<Vec<SharedMemory<T>>>,
    alignment: usize,
    max_buffers: usize,
    allocations: AtomicUsize,
    reuses: AtomicUsize,
}

impl<T: Pod + Send> ScratchPool<T> {
    /// Create a cache-line aligned pool keeping at most `max_buffers` idle buffers
    pub fn new(max_buffers: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::with_capacity(max_buffers)),
            alignment: CACHE_LINE.max(mem::align_of::<T>()),
            max_buffers,
            allocations: AtomicUsize::new(0),
            reuses: AtomicUsize::new(0),
        }
    }

    /// Create a pool with a specific alignment
    pub fn with_alignment(alignment: usize, max_buffers: usize) -> Result<Self> {
        // Validate once up front so checkout can only fail on allocation.
        SharedMemory::<T>::new(0, alignment)?;
        Ok(Self {
            alignment,
            ..Self::new(max_buffers)
        })
    }

    fn idle(&self) -> MutexGuard<'_, Vec<SharedMemory<T>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check out an exclusively owned, zeroed buffer of exactly `len` elements
    ///
    /// If a pooled buffer has sufficient capacity it is reused, otherwise a
    /// new one is allocated.
    pub fn checkout(&self, len: usize) -> Result<ScratchGuard<'_, T>> {
        let pooled = {
            let mut buffers = self.idle();
            buffers
                .iter()
                .position(|buf| buf.capacity() >= len)
                .map(|idx| buffers.swap_remove(idx))
        };

        let mut buffer = match pooled {
            Some(buffer) => {
                self.reuses.fetch_add(1, Ordering::Relaxed);
                buffer
            }
            None => {
                self.allocations.fetch_add(1, Ordering::Relaxed);
                SharedMemory::new(len, self.alignment)?
            }
        };
        buffer.resize(len);

        Ok(ScratchGuard {
            buffer: Some(buffer),
            pool: self,
        })
    }

    /// Return a buffer to the pool
    fn checkin(&self, mut buffer: SharedMemory<T>) {
        buffer.clear();
        let mut buffers = self.idle();
        if buffers.len() < self.max_buffers {
            buffers.push(buffer);
        }
        // Otherwise let it drop
    }

    /// Snapshot of the pool's counters
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            reuses: self.reuses.load(Ordering::Relaxed),
            retained: self.idle().len(),
        }
    }
}

/// RAII guard for a checked-out buffer
///
/// Dereferences to a slice of exactly the requested length and returns the
/// buffer to its pool when dropped.
pub struct ScratchGuard<'a, T: Pod + Send> {
    buffer: Option<SharedMemory<T>>,
    pool: &'a ScratchPool<T>,
}

impl<'a, T: Pod + Send> Drop for ScratchGuard<'a, T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.checkin(buffer);
        }
    }
}

impl<'a, T: Pod + Send> std::ops::Deref for ScratchGuard<'a, T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        match &self.buffer {
            Some(buffer) => buffer.as_slice(),
            None => &[],
        }
    }
}

impl<'a, T: Pod + Send> std::ops::DerefMut for ScratchGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.buffer {
            Some(buffer) => buffer.as_mut_slice(),
            None => &mut [],
        }
    }
}
