// SPDX-License-Identifier: EPL-2.0
//! The error taxonomy from `spec.md` §7. Every fallible operation in this
//! crate returns `Result<_, Error>` — no panics, no exceptions crossing the
//! public API, matching the teacher's own exclusively `Result`-returning
//! surface (`TraciError` in the original `Fundacio-i2CAT-traci-rs`).

use std::path::PathBuf;

use crate::buffer::Endian;

/// Classified reasons a wide-string (UTF-16/UTF-32 host form) conversion
/// can fail, surfaced through [`Error::InvalidUtf8`] and
/// [`Error::InvalidSurrogate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WideStringError {
    #[error("lone UTF-8 continuation byte at offset {offset}")]
    LoneContinuation { offset: usize },

    #[error("overlong UTF-8 encoding at offset {offset}")]
    Overlong { offset: usize },

    #[error("UTF-8 encoded surrogate U+{value:04X} at offset {offset}")]
    EncodedSurrogate { value: u32, offset: usize },

    #[error("truncated or stray-continuation UTF-8 sequence at offset {offset}")]
    Truncated { offset: usize },

    #[error("code point U+{value:X} exceeds U+10FFFF")]
    CodePointTooLarge { value: u32 },

    #[error("invalid UTF-8 lead byte 0x{byte:02X} at offset {offset}")]
    InvalidLeadByte { byte: u8, offset: usize },

    #[error("lone surrogate U+{value:04X} in wide input")]
    LoneSurrogate { value: u32 },

    #[error("reversed surrogate pair (low surrogate without preceding high surrogate)")]
    ReversedSurrogatePair,
}

/// The full error taxonomy a decode or encode operation can surface.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("buffer underflow: requested {requested} bytes but only {remaining} remain")]
    BufferUnderflow { requested: usize, remaining: usize },

    #[error("buffer overflow: write of {requested} total bytes would exceed max_size {max_size}")]
    BufferOverflow { requested: usize, max_size: usize },

    #[error("allocation failure while growing buffer storage")]
    AllocationFailure,

    #[error("invalid endian: reader declared {expected:?}, header declared {found:?}")]
    InvalidEndian { expected: Endian, found: Endian },

    #[error("invalid id: expected {expected}, found {found}")]
    InvalidId { expected: u16, found: u16 },

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u8, found: u8 },

    #[error("size mismatch: header declared body_size {expected}, body consumed {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch: header declared {expected}, recomputed {computed}")]
    ChecksumMismatch { expected: i32, computed: i32 },

    #[error("invalid utf-8: {0}")]
    InvalidUtf8(WideStringError),

    #[error("invalid surrogate: {0}")]
    InvalidSurrogate(WideStringError),

    #[error("size overflow: wire value {value} does not fit the host counter")]
    SizeOverflow { value: u64 },

    #[error("invalid variant index {index}: only {alternatives} alternatives declared")]
    InvalidVariantIndex { index: u64, alternatives: usize },

    #[error("null input")]
    NullInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },
}
