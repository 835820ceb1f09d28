//! Array element storage with small-buffer optimization.

use std::mem;

/// Size of a reference slot, in bytes.
pub const WORD_SIZE: usize = mem::size_of::<usize>();

/// Payloads at or below this many bytes live inside the array object.
pub const ARRAY_INLINE_NBYTES: usize = 8 * WORD_SIZE;

/// Number of reference slots that fit in the inline buffer.
pub const ARRAY_INLINE_NREFS: usize = ARRAY_INLINE_NBYTES / WORD_SIZE;

/// Storage for `len` elements of `T`, either inline (capacity `N`) or in a
/// separate boxed slice. The variant is chosen once, when the payload is
/// created, and never changes.
#[derive(Clone)]
pub enum Payload<T: Copy + Default, const N: usize> {
    Inline { len: usize, buf: [T; N] },
    Heap(Box<[T]>),
}

impl<T: Copy + Default, const N: usize> Payload<T, N> {
    /// Zero-filled payload of `len` elements whose logical size is `nbytes`.
    /// Inline iff `nbytes <= ARRAY_INLINE_NBYTES`.
    pub fn zeroed(len: usize, nbytes: usize) -> Self {
        if nbytes <= ARRAY_INLINE_NBYTES && len <= N {
            return Self::Inline {
                len,
                buf: [T::default(); N],
            };
        }
        Self::Heap(vec![T::default(); len].into_boxed_slice())
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Payload::Inline { .. })
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Payload::Inline { len, buf } => &buf[..*len],
            Payload::Heap(data) => data,
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Payload::Inline { len, buf } => &mut buf[..*len],
            Payload::Heap(data) => data,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes held outside the owning object.
    pub fn out_of_line_bytes(&self) -> usize {
        match self {
            Payload::Inline { .. } => 0,
            Payload::Heap(data) => data.len() * mem::size_of::<T>(),
        }
    }
}
