// SPDX-License-Identifier: EPL-2.0
//! Type-directed encode/decode of strings, optionals, unions, pairs,
//! tuples, fixed arrays, sequences, sets, maps, and bitsets on top of
//! [`crate::buffer::Buffer`] (`spec.md` §4.3).
//!
//! The dispatch is closed over an enumerated set of shapes rather than a
//! generic fallback: [`Wire`] is implemented only for the types this
//! module names, so an unsupported shape is a compile error, never a
//! silent raw-memory encoding (`spec.md` §9, "forbid silent fall-through
//! to a raw-memory codec").

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;

use crate::buffer::Buffer;
use crate::error::Error;
use crate::wide;

/// The canonical wire encoding of any sequence or string length: always an
/// unsigned 64-bit value, regardless of the host counter's width
/// (`spec.md` §3, "Canonical size type").
impl Buffer {
    pub fn write_size(&mut self, n: u64) -> Result<(), Error> {
        self.write_u64(n)
    }

    pub fn read_size(&mut self) -> Result<u64, Error> {
        self.read_u64()
    }

    /// Read a `SizeWire` and narrow it to `usize`, failing with
    /// [`Error::SizeOverflow`] rather than truncating if it doesn't fit.
    /// `usize` is 64-bit on every mainstream target this crate runs on, so
    /// in practice this call never actually rejects a valid `SizeWire` —
    /// see [`Buffer::read_size_u32`] for a host counter that genuinely can
    /// overflow.
    pub fn read_size_usize(&mut self) -> Result<usize, Error> {
        let n = self.read_size()?;
        usize::try_from(n).map_err(|_| Error::SizeOverflow { value: n })
    }

    /// Read a `SizeWire` and narrow it to `u32`, failing with
    /// [`Error::SizeOverflow`] rather than truncating if it doesn't fit
    /// (`spec.md` §3 "Canonical size type": "decoding into a host counter
    /// narrower than 64 bits, values exceeding the host maximum are a
    /// fatal error"). Intended for callers whose host counter is fixed at
    /// 32 bits regardless of the machine's pointer width — e.g. a length
    /// field in a record whose own wire shape only has room for a `u32`.
    pub fn read_size_u32(&mut self) -> Result<u32, Error> {
        let n = self.read_size()?;
        u32::try_from(n).map_err(|_| Error::SizeOverflow { value: n })
    }

    /// A conservative capacity hint for a container of `count` elements:
    /// bounded by `count` but never more than the bytes actually left to
    /// read, so a malicious huge length prefix cannot force an unbounded
    /// allocation before the first element read fails (`spec.md` §8,
    /// "Length-prefix safety").
    fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.remaining())
    }

    /// Write a length-prefixed raw byte run (the common shape behind both
    /// `String` and the wide-string bridge).
    pub(crate) fn write_byte_run(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.write_size(bytes.len() as u64)?;
        self.write_slice(bytes)
    }

    pub(crate) fn read_byte_run(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_size_usize()?;
        self.read_vec(len)
    }

    // -------------------------------------------------------------------
    // String (UTF-8)
    // -------------------------------------------------------------------

    /// No UTF-8 validation beyond what `String` itself requires — the wire
    /// contract places validity on the caller (`spec.md` §4.3, "String").
    pub fn write_string(&mut self, s: &str) -> Result<(), Error> {
        self.write_byte_run(s.as_bytes())
    }

    pub fn read_string(&mut self) -> Result<String, Error> {
        let bytes = self.read_byte_run()?;
        String::from_utf8(bytes).map_err(|e| {
            Error::InvalidUtf8(crate::error::WideStringError::Truncated {
                offset: e.utf8_error().valid_up_to(),
            })
        })
    }

    // -------------------------------------------------------------------
    // Wide string (UTF-16 host form)
    // -------------------------------------------------------------------

    pub fn write_wide_string_utf16(&mut self, units: &[u16]) -> Result<(), Error> {
        let scalars = wide::utf16_to_scalars(units).map_err(Error::InvalidSurrogate)?;
        self.write_byte_run(wide::scalars_to_utf8(&scalars).as_bytes())
    }

    pub fn read_wide_string_utf16(&mut self) -> Result<Vec<u16>, Error> {
        let bytes = self.read_byte_run()?;
        let scalars = wide::utf8_to_scalars(&bytes).map_err(Error::InvalidUtf8)?;
        Ok(wide::scalars_to_utf16(&scalars))
    }

    // -------------------------------------------------------------------
    // Wide string (UTF-32 host form)
    // -------------------------------------------------------------------

    pub fn write_wide_string_utf32(&mut self, units: &[u32]) -> Result<(), Error> {
        wide::validate_utf32_scalars(units).map_err(Error::InvalidSurrogate)?;
        self.write_byte_run(wide::scalars_to_utf8(units).as_bytes())
    }

    pub fn read_wide_string_utf32(&mut self) -> Result<Vec<u32>, Error> {
        let bytes = self.read_byte_run()?;
        wide::utf8_to_scalars(&bytes).map_err(Error::InvalidUtf8)
    }

    // -------------------------------------------------------------------
    // Discriminated union
    // -------------------------------------------------------------------

    /// Write the `SizeWire` tag selecting one of `alternatives`; the caller
    /// writes the selected payload afterward.
    pub fn write_union_tag(&mut self, index: u64) -> Result<(), Error> {
        self.write_size(index)
    }

    /// Read the union tag, failing with [`Error::InvalidVariantIndex`] if
    /// it names a variant outside `0..alternatives`.
    pub fn read_union_tag(&mut self, alternatives: usize) -> Result<u64, Error> {
        let index = self.read_size()?;
        if index >= alternatives as u64 {
            return Err(Error::InvalidVariantIndex {
                index,
                alternatives,
            });
        }
        Ok(index)
    }

    // -------------------------------------------------------------------
    // Bitset<N>, N <= 64
    // -------------------------------------------------------------------

    /// Width in octets of the smallest of {1, 2, 4, 8} that holds `n` bits.
    const fn bitset_width(n: u32) -> usize {
        if n <= 8 {
            1
        } else if n <= 16 {
            2
        } else if n <= 32 {
            4
        } else {
            8
        }
    }

    pub fn write_bitset(&mut self, bits: u64, n: u32) -> Result<(), Error> {
        debug_assert!(n <= 64);
        let masked = if n >= 64 { bits } else { bits & ((1u64 << n) - 1) };
        match Self::bitset_width(n) {
            1 => self.write_u8(masked as u8),
            2 => self.write_u16(masked as u16),
            4 => self.write_u32(masked as u32),
            _ => self.write_u64(masked),
        }
    }

    pub fn read_bitset(&mut self, n: u32) -> Result<u64, Error> {
        debug_assert!(n <= 64);
        let raw = match Self::bitset_width(n) {
            1 => self.read_u8()? as u64,
            2 => self.read_u16()? as u64,
            4 => self.read_u32()? as u64,
            _ => self.read_u64()?,
        };
        Ok(if n >= 64 { raw } else { raw & ((1u64 << n) - 1) })
    }
}

/// A closed, type-directed codec: implemented only for the enumerated
/// shapes in `spec.md` §4.3, never via a generic/reflective default.
pub trait Wire: Sized {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error>;
    fn read_from(buf: &mut Buffer) -> Result<Self, Error>;
}

macro_rules! impl_wire_scalar {
    ($t:ty, $read:ident, $write:ident) => {
        impl Wire for $t {
            fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
                buf.$write(*self)
            }
            fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
                buf.$read()
            }
        }
    };
}

impl_wire_scalar!(u8, read_u8, write_u8);
impl_wire_scalar!(i8, read_i8, write_i8);
impl_wire_scalar!(u16, read_u16, write_u16);
impl_wire_scalar!(i16, read_i16, write_i16);
impl_wire_scalar!(u32, read_u32, write_u32);
impl_wire_scalar!(i32, read_i32, write_i32);
impl_wire_scalar!(u64, read_u64, write_u64);
impl_wire_scalar!(i64, read_i64, write_i64);
impl_wire_scalar!(f32, read_f32, write_f32);
impl_wire_scalar!(f64, read_f64, write_f64);

impl Wire for bool {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_bool(*self)
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        buf.read_bool()
    }
}

impl Wire for String {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_string(self)
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        buf.read_string()
    }
}

// Optional<T> — a bool present flag followed by T iff present.
impl<T: Wire> Wire for Option<T> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        match self {
            Some(inner) => {
                buf.write_bool(true)?;
                inner.write_to(buf)
            }
            None => buf.write_bool(false),
        }
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        if buf.read_bool()? {
            Ok(Some(T::read_from(buf)?))
        } else {
            Ok(None)
        }
    }
}

// Pair<A, B> — fields in declared order, no prefix.
impl<A: Wire, B: Wire> Wire for (A, B) {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        self.0.write_to(buf)?;
        self.1.write_to(buf)
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let a = A::read_from(buf)?;
        let b = B::read_from(buf)?;
        Ok((a, b))
    }
}

macro_rules! impl_wire_tuple {
    ($($name:ident),+) => {
        impl<$($name: Wire),+> Wire for ($($name,)+) {
            fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
                #[allow(non_snake_case)]
                let ($(ref $name,)+) = *self;
                $($name.write_to(buf)?;)+
                Ok(())
            }
            fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
                Ok(($($name::read_from(buf)?,)+))
            }
        }
    };
}

impl_wire_tuple!(T0, T1, T2);
impl_wire_tuple!(T0, T1, T2, T3);
impl_wire_tuple!(T0, T1, T2, T3, T4);
impl_wire_tuple!(T0, T1, T2, T3, T4, T5);

// Fixed array[N] of T — N encodings of T, no length prefix (N is static).
impl<T: Wire, const N: usize> Wire for [T; N] {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        for item in self {
            item.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::read_from(buf)?);
        }
        // `items.len() == N` always holds here, so this cannot fail.
        items
            .try_into()
            .map_err(|_| Error::AllocationFailure)
    }
}

// Variable sequence (vector) of T.
impl<T: Wire> Wire for Vec<T> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for item in self {
            item.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = Vec::with_capacity(buf.capacity_hint(count));
        for _ in 0..count {
            out.push(T::read_from(buf)?);
        }
        Ok(out)
    }
}

// Variable sequence (deque) of T.
impl<T: Wire> Wire for VecDeque<T> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for item in self {
            item.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = VecDeque::with_capacity(buf.capacity_hint(count));
        for _ in 0..count {
            out.push_back(T::read_from(buf)?);
        }
        Ok(out)
    }
}

// Variable sequence (list) of T.
impl<T: Wire> Wire for LinkedList<T> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for item in self {
            item.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = LinkedList::new();
        for _ in 0..count {
            out.push_back(T::read_from(buf)?);
        }
        Ok(out)
    }
}

// Set<T> (ordered) — same wire form as a sequence; duplicates tolerated.
impl<T: Wire + Ord> Wire for BTreeSet<T> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for item in self {
            item.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = BTreeSet::new();
        for _ in 0..count {
            out.insert(T::read_from(buf)?);
        }
        Ok(out)
    }
}

// Unordered-set<T>.
impl<T: Wire + Eq + Hash> Wire for HashSet<T> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for item in self {
            item.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = HashSet::with_capacity(buf.capacity_hint(count));
        for _ in 0..count {
            out.insert(T::read_from(buf)?);
        }
        Ok(out)
    }
}

// Map<K, V> (ordered) — count, then count (K, V) pairs; first write of a
// duplicate key wins.
impl<K: Wire + Ord, V: Wire> Wire for BTreeMap<K, V> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for (k, v) in self {
            k.write_to(buf)?;
            v.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = BTreeMap::new();
        for _ in 0..count {
            let k = K::read_from(buf)?;
            let v = V::read_from(buf)?;
            out.entry(k).or_insert(v);
        }
        Ok(out)
    }
}

// Unordered-map<K, V>.
impl<K: Wire + Eq + Hash, V: Wire> Wire for HashMap<K, V> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_size(self.len() as u64)?;
        for (k, v) in self {
            k.write_to(buf)?;
            v.write_to(buf)?;
        }
        Ok(())
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        let count = buf.read_size_usize()?;
        let mut out = HashMap::with_capacity(buf.capacity_hint(count));
        for _ in 0..count {
            let k = K::read_from(buf)?;
            let v = V::read_from(buf)?;
            out.entry(k).or_insert(v);
        }
        Ok(out)
    }
}

/// A fixed-width set of up to 64 flags, wire-encoded as the smallest
/// of {1, 2, 4, 8} octets that holds `N` bits (`spec.md` §4.3, "Bitset").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitset<const N: u32>(pub u64);

impl<const N: u32> Wire for Bitset<N> {
    fn write_to(&self, buf: &mut Buffer) -> Result<(), Error> {
        buf.write_bitset(self.0, N)
    }
    fn read_from(buf: &mut Buffer) -> Result<Self, Error> {
        Ok(Bitset(buf.read_bitset(N)?))
    }
}
