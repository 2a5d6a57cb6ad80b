// SPDX-License-Identifier: EPL-2.0
//! The UTF-8 ⇄ wide-string (UTF-16 / UTF-32 host form) bridge.
//!
//! Wide strings are always carried on the wire as UTF-8 (`spec.md` §4.3).
//! This module owns the validated conversion in both directions, isolated
//! from [`crate::composite`] because the validation rules are the single
//! trickiest piece of the whole codec: reject overlong encodings, reject
//! UTF-8-encoded surrogates, reject out-of-range code points, reject
//! truncated/stray continuation bytes on decode; reject lone surrogates and
//! reversed pairs on encode.
//!
//! `std::str::from_utf8` already enforces strict UTF-8, but it collapses
//! every rejection into one opaque `Utf8Error` — not enough to produce the
//! classified [`WideStringError`] variants `spec.md` §7/§8 call for, so the
//! decoder here is hand-rolled.

use crate::error::WideStringError;

const SURROGATE_LOW: u32 = 0xD800;
const SURROGATE_HIGH: u32 = 0xDFFF;
const MAX_SCALAR: u32 = 0x10FFFF;

/// Decode a raw UTF-8 byte run into Unicode scalar values, classifying the
/// exact way malformed input fails.
pub fn utf8_to_scalars(bytes: &[u8]) -> Result<Vec<u32>, WideStringError> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        let (len, mut cp, min_cp) = if b0 < 0x80 {
            (1usize, b0 as u32, 0u32)
        } else if (0x80..=0xBF).contains(&b0) {
            return Err(WideStringError::LoneContinuation { offset: i });
        } else if (0xC2..=0xDF).contains(&b0) {
            (2, (b0 & 0x1F) as u32, 0x80)
        } else if (0xE0..=0xEF).contains(&b0) {
            (3, (b0 & 0x0F) as u32, 0x800)
        } else if (0xF0..=0xF4).contains(&b0) {
            (4, (b0 & 0x07) as u32, 0x1_0000)
        } else {
            // 0xC0, 0xC1 (always-overlong lead bytes) and 0xF5..=0xFF.
            return Err(WideStringError::InvalidLeadByte { byte: b0, offset: i });
        };

        if i + len > bytes.len() {
            return Err(WideStringError::Truncated { offset: i });
        }
        for k in 1..len {
            let b = bytes[i + k];
            if b & 0xC0 != 0x80 {
                return Err(WideStringError::Truncated { offset: i });
            }
            cp = (cp << 6) | (b & 0x3F) as u32;
        }

        if cp < min_cp {
            return Err(WideStringError::Overlong { offset: i });
        }
        if (SURROGATE_LOW..=SURROGATE_HIGH).contains(&cp) {
            return Err(WideStringError::EncodedSurrogate { value: cp, offset: i });
        }
        if cp > MAX_SCALAR {
            return Err(WideStringError::CodePointTooLarge { value: cp });
        }

        out.push(cp);
        i += len;
    }
    Ok(out)
}

/// Encode Unicode scalar values (already validated — never a surrogate,
/// never out of range) as a UTF-8 `String`.
pub fn scalars_to_utf8(scalars: &[u32]) -> String {
    let mut s = String::with_capacity(scalars.len());
    for &cp in scalars {
        if let Some(c) = char::from_u32(cp) {
            s.push(c);
        }
    }
    s
}

/// Combine UTF-16 code units into Unicode scalar values, rejecting lone or
/// reversed surrogates.
pub fn utf16_to_scalars(units: &[u16]) -> Result<Vec<u32>, WideStringError> {
    let mut out = Vec::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        let u = units[i] as u32;
        if (0xD800..=0xDBFF).contains(&u) {
            let low = units.get(i + 1).copied().map(|v| v as u32);
            match low {
                Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
                    let combined = 0x1_0000 + (((u - 0xD800) << 10) | (low - 0xDC00));
                    out.push(combined);
                    i += 2;
                }
                _ => return Err(WideStringError::LoneSurrogate { value: u }),
            }
        } else if (0xDC00..=0xDFFF).contains(&u) {
            return Err(WideStringError::ReversedSurrogatePair);
        } else {
            out.push(u);
            i += 1;
        }
    }
    Ok(out)
}

/// Split Unicode scalar values into UTF-16 code units, emitting surrogate
/// pairs for non-BMP code points.
pub fn scalars_to_utf16(scalars: &[u32]) -> Vec<u16> {
    let mut out = Vec::with_capacity(scalars.len());
    for &cp in scalars {
        if cp < 0x1_0000 {
            out.push(cp as u16);
        } else {
            let c = cp - 0x1_0000;
            out.push((0xD800 + (c >> 10)) as u16);
            out.push((0xDC00 + (c & 0x3FF)) as u16);
        }
    }
    out
}

/// Validate that every UTF-32 code unit is a legal Unicode scalar value
/// (not in the surrogate range, not beyond U+10FFFF) before encoding.
pub fn validate_utf32_scalars(units: &[u32]) -> Result<(), WideStringError> {
    for &u in units {
        if (SURROGATE_LOW..=SURROGATE_HIGH).contains(&u) {
            return Err(WideStringError::LoneSurrogate { value: u });
        }
        if u > MAX_SCALAR {
            return Err(WideStringError::CodePointTooLarge { value: u });
        }
    }
    Ok(())
}
