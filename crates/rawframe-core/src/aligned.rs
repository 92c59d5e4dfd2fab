//! Scratch buffers aligned for direct I/O.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::error::{RawFileError, Result};

/// Round `size` up to the next multiple of `alignment` (a power of two).
#[inline]
pub fn round_up(size: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (size + alignment - 1) & !(alignment - 1)
}

/// Zero-initialized heap region whose address and capacity are both
/// multiples of `alignment`.
///
/// Direct I/O requires the user buffer, the transfer length and the file
/// offset to be aligned to the device's logical block size, so every write
/// from a raw file session goes through one of these.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    capacity: usize,
    alignment: usize,
}

// Safety: AlignedBuffer owns its allocation exclusively.
unsafe impl Send for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocate at least `capacity` bytes aligned to `alignment`.
    /// Capacity is rounded up to the alignment unit.
    pub fn new(capacity: usize, alignment: usize) -> Result<Self> {
        if !alignment.is_power_of_two() {
            return Err(RawFileError::InvalidConfig(format!(
                "alignment {alignment} is not a power of two"
            )));
        }
        let failed = RawFileError::AllocationFailed {
            size: capacity,
            alignment,
        };
        let capacity = capacity
            .checked_add(alignment - 1)
            .map(|c| c & !(alignment - 1))
            .filter(|&c| c > 0)
            .ok_or(failed)?;

        let layout = Layout::from_size_align(capacity, alignment).map_err(|_| {
            RawFileError::AllocationFailed {
                size: capacity,
                alignment,
            }
        })?;

        // Safety: layout has non-zero size
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or(RawFileError::AllocationFailed {
            size: capacity,
            alignment,
        })?;

        Ok(Self {
            ptr,
            capacity,
            alignment,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// The whole allocation.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        // Safety: ptr is valid for capacity bytes
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // Safety: ptr is valid for capacity bytes and uniquely borrowed
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }

    /// Copy `data` to the start of the buffer and zero the tail up to the
    /// next alignment boundary. Returns the padded length, ready to hand to
    /// a direct-I/O write.
    pub fn stage(&mut self, data: &[u8]) -> Result<usize> {
        if data.len() > self.capacity {
            return Err(RawFileError::PayloadTooLarge {
                size: data.len(),
                capacity: self.capacity,
            });
        }
        let padded = round_up(data.len(), self.alignment);
        let slice = self.as_mut_slice();
        slice[..data.len()].copy_from_slice(data);
        slice[data.len()..padded].fill(0);
        Ok(padded)
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // Safety: ptr was allocated with exactly this layout in `new`
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, self.alignment);
            alloc::dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("capacity", &self.capacity)
            .field("alignment", &self.alignment)
            .finish()
    }
}
