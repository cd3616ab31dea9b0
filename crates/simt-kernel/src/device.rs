//! Device-resident input buffer

use simt_core::{Element, Error, Result};

/// A flat buffer whose first `len` elements are the input
///
/// Allocations on an accelerator are commonly rounded up, so the backing
/// storage may be longer than the logical input. Everything past `len` is
/// padding: the kernel must never read it.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSlice<'a, T: Element> {
    data: &'a [T],
    len: usize,
}

impl<'a, T: Element> DeviceSlice<'a, T> {
    /// Wrap `data`, of which only the first `len` elements are valid
    pub fn new(data: &'a [T], len: usize) -> Result<Self> {
        if len > data.len() {
            return Err(Error::size_mismatch(len, data.len(), "device slice"));
        }
        Ok(Self { data, len })
    }

    /// Number of valid elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are no valid elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Length of the backing allocation, padding included
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Element `index` if it lies inside the valid range
    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        if index < self.len {
            Some(self.data[index])
        } else {
            None
        }
    }

    /// The valid elements only
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        &self.data[..self.len]
    }
}

impl<'a, T: Element> From<&'a [T]> for DeviceSlice<'a, T> {
    fn from(data: &'a [T]) -> Self {
        Self {
            data,
            len: data.len(),
        }
    }
}

impl<'a, T: Element> From<&'a Vec<T>> for DeviceSlice<'a, T> {
    fn from(data: &'a Vec<T>) -> Self {
        Self::from(data.as_slice())
    }
}
