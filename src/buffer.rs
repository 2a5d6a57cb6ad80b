// SPDX-License-Identifier: EPL-2.0
//! Storage plus cursor plus declared byte order — equivalent in spirit to
//! `Storage` in the teacher library, generalized from a fixed big-endian
//! wire format to a caller-declared endianness, a writer/reader lifecycle
//! with an explicit `ready` flag, and a `max_size` growth cap.
//!
//! `Buffer` is purely storage and positioning; it does not know how to
//! interpret the bytes it holds beyond the fixed-width scalar encodings in
//! this file (`spec.md` §4.1/§4.2). String/container encodings live in
//! [`crate::composite`].

use crate::error::Error;

/// Declared byte order of a buffer's multi-octet fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
}

/// A cursor-based, bounds-checked byte buffer with a declared byte order.
///
/// The same type serves as both writer and reader: a writer starts empty
/// and grows up to `max_size` until [`Buffer::finalize`] truncates storage
/// to the cursor and marks it ready; a reader starts either fully loaded
/// ([`Buffer::from_bytes`], ready immediately) or empty and fed
/// incrementally via [`Buffer::append`] until a final chunk arrives.
#[derive(Debug)]
pub struct Buffer {
    buf: Vec<u8>,
    cursor: usize,
    endian: Endian,
    ready: bool,
    max_size: usize,
}

const HEADER_RESERVE_CHUNK: usize = 24;

impl Buffer {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// A fresh writer, empty, not yet ready, capped at `max_size` bytes.
    pub fn new_writer(endian: Endian, max_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            endian,
            ready: false,
            max_size,
        }
    }

    /// A reader over an already-complete byte vector. Ready immediately —
    /// all bytes are present at construction.
    pub fn from_bytes(bytes: Vec<u8>, endian: Endian) -> Self {
        Self {
            buf: bytes,
            cursor: 0,
            endian,
            ready: true,
            max_size: usize::MAX,
        }
    }

    /// A reader that will be fed incrementally via [`Buffer::append`]; not
    /// ready until a final chunk arrives.
    pub fn new_streaming_reader(endian: Endian) -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            endian,
            ready: false,
            max_size: usize::MAX,
        }
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to `pos`. Returns `false` (and leaves the cursor
    /// untouched) if `pos` is outside `[0, len()]`.
    pub fn set_cursor(&mut self, pos: usize) -> bool {
        if pos > self.buf.len() {
            return false;
        }
        self.cursor = pos;
        true
    }

    pub fn cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_to_end(&mut self) {
        self.cursor = self.buf.len();
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Bytes remaining to be read from the cursor to the end of storage.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.cursor)
    }

    /// An immutable view of `len` bytes starting at `start`. Returns an
    /// empty slice if the requested span falls outside the buffer — it
    /// never panics.
    pub fn borrow_bytes(&self, start: usize, len: usize) -> &[u8] {
        let end = match start.checked_add(len) {
            Some(e) if e <= self.buf.len() => e,
            _ => return &[],
        };
        &self.buf[start..end]
    }

    /// Consume the buffer, handing ownership of its bytes to the caller.
    /// The buffer is dropped; any previously returned `borrow_bytes` span
    /// must not outlive this call (the borrow checker enforces this).
    pub fn release_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Truncate storage to the cursor and mark the writer ready. No further
    /// writes are permitted afterward.
    pub fn finalize(&mut self) {
        self.buf.truncate(self.cursor);
        self.ready = true;
    }

    /// Feed more bytes into a streaming reader. `final_chunk` marks the
    /// buffer ready once appended; appending after `ready` is an error.
    pub fn append(&mut self, data: &[u8], final_chunk: bool) -> Result<(), Error> {
        if self.ready {
            return Err(Error::BufferOverflow {
                requested: data.len(),
                max_size: self.buf.len(),
            });
        }
        self.buf.extend_from_slice(data);
        if final_chunk {
            self.ready = true;
        }
        Ok(())
    }

    /// Mark a streaming reader ready without appending further bytes — for
    /// a caller that already appended its last chunk via
    /// `append(data, false)` and only later learns the stream is complete,
    /// without resubmitting an empty final chunk through [`Buffer::append`].
    pub fn mark_final(&mut self) {
        self.ready = true;
    }

    // -----------------------------------------------------------------------
    // Low-level read/write primitives
    // -----------------------------------------------------------------------

    /// Write `bytes` at the cursor, growing storage if the cursor runs past
    /// the current end (overwriting in place otherwise, which is how the
    /// envelope's header back-fill works). Fails without moving the cursor
    /// if the write would exceed `max_size` or the buffer is already ready.
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        if self.ready {
            return Err(Error::BufferOverflow {
                requested: bytes.len(),
                max_size: self.max_size,
            });
        }
        let end = self
            .cursor
            .checked_add(bytes.len())
            .ok_or(Error::BufferOverflow {
                requested: bytes.len(),
                max_size: self.max_size,
            })?;
        if end > self.max_size {
            return Err(Error::BufferOverflow {
                requested: end,
                max_size: self.max_size,
            });
        }
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(())
    }

    /// Reserve `n` bytes of header room at the cursor without writing any
    /// meaningful content (used by the envelope's two-pass write).
    pub(crate) fn reserve(&mut self, n: usize) -> Result<(), Error> {
        self.write_raw(&vec![0u8; n])
    }

    fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let end = self.cursor.checked_add(N).ok_or(Error::BufferUnderflow {
            requested: N,
            remaining: self.remaining(),
        })?;
        if end > self.buf.len() {
            return Err(Error::BufferUnderflow {
                requested: N,
                remaining: self.remaining(),
            });
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(&self.buf[self.cursor..end]);
        self.cursor = end;
        Ok(arr)
    }

    /// Read `n` raw bytes as an owned `Vec`, used by the composite codec
    /// for string/byte-run payloads.
    pub(crate) fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        let end = self.cursor.checked_add(n).ok_or(Error::BufferUnderflow {
            requested: n,
            remaining: self.remaining(),
        })?;
        if end > self.buf.len() {
            return Err(Error::BufferUnderflow {
                requested: n,
                remaining: self.remaining(),
            });
        }
        let out = self.buf[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(out)
    }

    pub(crate) fn write_slice(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.write_raw(bytes)
    }

    // -----------------------------------------------------------------------
    // Scalar codec — unsigned byte
    // -----------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.read_fixed::<1>()?[0])
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.write_raw(&[value])
    }

    // -----------------------------------------------------------------------
    // Scalar codec — signed byte
    // -----------------------------------------------------------------------

    pub fn read_i8(&mut self) -> Result<i8, Error> {
        Ok(self.read_fixed::<1>()?[0] as i8)
    }

    pub fn write_i8(&mut self, value: i8) -> Result<(), Error> {
        self.write_raw(&[value as u8])
    }

    // -----------------------------------------------------------------------
    // Scalar codec — bool
    // -----------------------------------------------------------------------

    /// Any non-zero octet decodes as `true` (spec §4.2).
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_u8(if value { 1 } else { 0 })
    }
}

macro_rules! impl_scalar {
    ($read:ident, $write:ident, $t:ty, $n:expr) => {
        impl Buffer {
            /// Read a fixed-width value in the buffer's declared endianness.
            pub fn $read(&mut self) -> Result<$t, Error> {
                let bytes = self.read_fixed::<$n>()?;
                Ok(match self.endian {
                    Endian::Big => <$t>::from_be_bytes(bytes),
                    Endian::Little => <$t>::from_le_bytes(bytes),
                })
            }

            /// Write a fixed-width value in the buffer's declared endianness.
            pub fn $write(&mut self, value: $t) -> Result<(), Error> {
                let bytes = match self.endian {
                    Endian::Big => value.to_be_bytes(),
                    Endian::Little => value.to_le_bytes(),
                };
                self.write_raw(&bytes)
            }
        }
    };
}

impl_scalar!(read_u16, write_u16, u16, 2);
impl_scalar!(read_i16, write_i16, i16, 2);
impl_scalar!(read_u32, write_u32, u32, 4);
impl_scalar!(read_i32, write_i32, i32, 4);
impl_scalar!(read_u64, write_u64, u64, 8);
impl_scalar!(read_i64, write_i64, i64, 8);
impl_scalar!(read_f32, write_f32, f32, 4);
impl_scalar!(read_f64, write_f64, f64, 8);
