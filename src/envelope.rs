// SPDX-License-Identifier: EPL-2.0
//! The versioned frame wrapped around every record's body: a 24-octet
//! header naming checksum, id, version, flags, body size and timestamp,
//! followed by the body itself (`spec.md` §3 "Header", §4.4 "Envelope").
//!
//! Writing is a two-pass operation: reserve header room, write the body,
//! rewind, back-fill the header fields, then back-fill the checksum over
//! the header tail plus body before restoring the cursor to the end of
//! the frame. This mirrors the teacher's own header-then-body framing in
//! `Storage::new_for_writing`/`finish_writing`, generalized from TraCI's
//! fixed command-length prefix to this crate's full versioned header.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::buffer::{Buffer, Endian};
use crate::error::Error;
use crate::logger::{Location, Logger, Severity};

/// Fixed width of the header in octets (checksum 4 + id 2 + version 1 +
/// flags 1 + body_size 8 + timestamp 8).
pub const HEADER_LEN: usize = 4 + 2 + 1 + 1 + 8 + 8;

/// The 1-octet bitfield carried at header offset 7.
///
/// | bit | meaning |
/// |---|---|
/// | 0 | 0 = big-endian payload, 1 = little-endian payload |
/// | 1 | checksum enabled |
/// | 2 | timestamp enabled |
/// | 3-4 | compression algorithm selector (0-3; 0 = none; others reserved) |
/// | 5-6 | encryption algorithm selector (0-3; 0 = none; others reserved) |
/// | 7 | strict-mode (version mismatch is fatal rather than warned) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags(u8);

impl Flags {
    const ENDIAN_BIT: u8 = 0b0000_0001;
    const CHECKSUM_BIT: u8 = 0b0000_0010;
    const TIMESTAMP_BIT: u8 = 0b0000_0100;
    const COMPRESSION_SHIFT: u8 = 3;
    const COMPRESSION_MASK: u8 = 0b0001_1000;
    const ENCRYPTION_SHIFT: u8 = 5;
    const ENCRYPTION_MASK: u8 = 0b0110_0000;
    const STRICT_BIT: u8 = 0b1000_0000;

    fn build(endian: Endian, checksum_enabled: bool, timestamp_enabled: bool, strict_mode: bool) -> Self {
        let mut byte = 0u8;
        if matches!(endian, Endian::Little) {
            byte |= Self::ENDIAN_BIT;
        }
        if checksum_enabled {
            byte |= Self::CHECKSUM_BIT;
        }
        if timestamp_enabled {
            byte |= Self::TIMESTAMP_BIT;
        }
        if strict_mode {
            byte |= Self::STRICT_BIT;
        }
        Flags(byte)
    }

    fn to_byte(self) -> u8 {
        self.0
    }

    fn from_byte(byte: u8) -> Self {
        Flags(byte)
    }

    pub fn little_endian(self) -> bool {
        self.0 & Self::ENDIAN_BIT != 0
    }

    pub fn checksum_enabled(self) -> bool {
        self.0 & Self::CHECKSUM_BIT != 0
    }

    pub fn timestamp_enabled(self) -> bool {
        self.0 & Self::TIMESTAMP_BIT != 0
    }

    /// Reserved for a future compression feature; this crate never sets a
    /// nonzero selector and never interprets one on read.
    pub fn compression(self) -> u8 {
        (self.0 & Self::COMPRESSION_MASK) >> Self::COMPRESSION_SHIFT
    }

    /// Reserved for a future encryption feature; see [`Flags::compression`].
    pub fn encryption(self) -> u8 {
        (self.0 & Self::ENCRYPTION_MASK) >> Self::ENCRYPTION_SHIFT
    }

    pub fn strict_mode(self) -> bool {
        self.0 & Self::STRICT_BIT != 0
    }
}

/// The decoded header of a frame.
///
/// `checksum`/`timestamp` are `None` when their respective flag bit is
/// clear — the wire's "0 means absent" sentinel, surfaced as an `Option`
/// rather than a raw possibly-zero field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub version: u8,
    pub flags: Flags,
    pub body_size: u64,
    pub checksum: Option<i32>,
    pub timestamp: Option<i64>,
}

/// Options governing how a frame is written. Checksum and timestamp are
/// enabled by default, matching the write algorithm's default behavior;
/// `strict_mode` is recorded in the header for the reader to honor.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeWriteOptions {
    pub checksum_enabled: bool,
    pub timestamp_enabled: bool,
    pub strict_mode: bool,
}

impl Default for EnvelopeWriteOptions {
    fn default() -> Self {
        EnvelopeWriteOptions {
            checksum_enabled: true,
            timestamp_enabled: true,
            strict_mode: false,
        }
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A deterministic rolling hash seeded with `body_size`, folding in every
/// octet of `range` (`spec.md` §4.4 "Checksum"). The result is remapped
/// from 0 to 1 so a checksum of exactly zero never appears on the wire —
/// zero is reserved for "checksum absent".
pub fn checksum(body_size: u64, range: &[u8]) -> i32 {
    let mut h: i32 = body_size as i32;
    for &byte in range {
        h = h.wrapping_mul(31).wrapping_add(byte as i32);
    }
    if h == 0 {
        1
    } else {
        h
    }
}

/// Write a complete frame — header followed by a body `body_fn` emits in
/// place — at the writer's current cursor. This is the literal two-pass
/// design from `spec.md` §4.4: reserve header room, invoke the body
/// writer exactly once on the *same* buffer (so the header reservation and
/// the body share one `max_size` budget rather than each paying for it
/// separately), then rewind and back-fill the header and checksum. The
/// buffer's declared endianness is what gets recorded in the header's
/// endian flag bit, so a reader can detect a mismatch.
pub fn write_envelope_with(
    buf: &mut Buffer,
    id: u16,
    version: u8,
    options: EnvelopeWriteOptions,
    body_fn: impl FnOnce(&mut Buffer) -> Result<(), Error>,
) -> Result<(), Error> {
    let p0 = buf.cursor();
    buf.reserve(HEADER_LEN)?;
    let body_start = buf.cursor();
    body_fn(buf)?;
    let p1 = buf.cursor();
    let body_size = (p1 - body_start) as u64;

    let flags = Flags::build(buf.endian(), options.checksum_enabled, options.timestamp_enabled, options.strict_mode);
    let timestamp = if options.timestamp_enabled { now_millis() } else { 0 };

    buf.set_cursor(p0);
    buf.write_i32(0)?; // checksum placeholder
    buf.write_u16(id)?;
    buf.write_u8(version)?;
    buf.write_u8(flags.to_byte())?;
    buf.write_u64(body_size)?;
    buf.write_i64(timestamp)?;
    debug_assert_eq!(buf.cursor(), body_start);

    if options.checksum_enabled {
        let sum = checksum(body_size, buf.borrow_bytes(p0 + 4, p1 - (p0 + 4)));
        buf.set_cursor(p0);
        buf.write_i32(sum)?;
    }

    buf.set_cursor(p1);
    Ok(())
}

/// Write a complete frame — header followed by an already-materialized
/// `body` — at the writer's current cursor. A thin convenience wrapper
/// over [`write_envelope_with`] for callers that already hold the body as
/// a byte slice; prefer [`write_envelope_with`] when the body can instead
/// be emitted directly into the framing buffer, since that avoids
/// budgeting `max_size` twice across two separate buffers.
pub fn write_envelope(
    buf: &mut Buffer,
    id: u16,
    version: u8,
    body: &[u8],
    options: EnvelopeWriteOptions,
) -> Result<(), Error> {
    write_envelope_with(buf, id, version, options, |b| b.write_slice(body))
}

/// Decode the 24-octet header at the cursor, advancing the cursor past it
/// without invoking any body handler (`spec.md` §4.4 "A deserialize_header
/// operation ... advances the cursor past the 24 bytes").
pub fn peek_header(buf: &mut Buffer) -> Result<Header, Error> {
    read_header(buf)
}

fn read_header(buf: &mut Buffer) -> Result<Header, Error> {
    let raw_checksum = buf.read_i32()?;
    let id = buf.read_u16()?;
    let version = buf.read_u8()?;
    let flags = Flags::from_byte(buf.read_u8()?);
    let body_size = buf.read_u64()?;
    let raw_timestamp = buf.read_i64()?;
    Ok(Header {
        id,
        version,
        flags,
        body_size,
        checksum: if flags.checksum_enabled() { Some(raw_checksum) } else { None },
        timestamp: if flags.timestamp_enabled() { Some(raw_timestamp) } else { None },
    })
}

/// Read and fully validate a frame against a target record's `id`/
/// `version`: header, then exactly `body_size` bytes of body, then
/// checksum comparison if the header's checksum bit is set.
///
/// A version mismatch is fatal only when the header's strict-mode flag is
/// set; otherwise it is logged as a warning and decoding proceeds
/// (`spec.md` §4.4 step 4, §7 "VersionMismatch"). Every other mismatch is
/// unconditionally fatal and is logged at error severity before this
/// function returns.
pub fn read_envelope(
    buf: &mut Buffer,
    expect_id: u16,
    expect_version: u8,
    logger: &dyn Logger,
) -> Result<(Header, Vec<u8>), Error> {
    let header_start = buf.cursor();
    let header = read_header(buf)?;

    let found_endian = if header.flags.little_endian() { Endian::Little } else { Endian::Big };
    if found_endian != buf.endian() {
        let err = Error::InvalidEndian {
            expected: buf.endian(),
            found: found_endian,
        };
        log_error(logger, "read_envelope", &err);
        return Err(err);
    }

    if header.id != expect_id {
        let err = Error::InvalidId {
            expected: expect_id,
            found: header.id,
        };
        log_error(logger, "read_envelope", &err);
        return Err(err);
    }

    if header.version != expect_version {
        let mismatch = Error::VersionMismatch {
            expected: expect_version,
            found: header.version,
        };
        if header.flags.strict_mode() {
            log_error(logger, "read_envelope", &mismatch);
            return Err(mismatch);
        }
        log_warn(logger, "read_envelope", &mismatch);
    }

    let body_len = usize::try_from(header.body_size).map_err(|_| Error::SizeOverflow {
        value: header.body_size,
    })?;
    if body_len > buf.remaining() {
        let err = Error::BufferUnderflow {
            requested: body_len,
            remaining: buf.remaining(),
        };
        log_error(logger, "read_envelope", &err);
        return Err(err);
    }

    let c0 = buf.cursor();
    let body = buf.read_vec(body_len)?;
    let c1 = buf.cursor();

    let actual_size = (c1 - c0) as u64;
    if actual_size != header.body_size {
        let err = Error::SizeMismatch {
            expected: header.body_size,
            actual: actual_size,
        };
        log_error(logger, "read_envelope", &err);
        return Err(err);
    }

    if let Some(expected_checksum) = header.checksum {
        let computed = checksum(header.body_size, buf.borrow_bytes(header_start + 4, c1 - (header_start + 4)));
        if computed != expected_checksum {
            let err = Error::ChecksumMismatch {
                expected: expected_checksum,
                computed,
            };
            log_error(logger, "read_envelope", &err);
            return Err(err);
        }
    }

    Ok((header, body))
}

fn log_error(logger: &dyn Logger, function: &'static str, err: &Error) {
    logger.log(
        Severity::Error,
        Location {
            file: file!(),
            function,
            line: line!(),
        },
        &err.to_string(),
    );
}

fn log_warn(logger: &dyn Logger, function: &'static str, err: &Error) {
    logger.log(
        Severity::Warn,
        Location {
            file: file!(),
            function,
            line: line!(),
        },
        &err.to_string(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NoopLogger;

    #[test]
    fn round_trip_preserves_header_and_body() {
        let mut w = Buffer::new_writer(Endian::Little, 1 << 16);
        write_envelope(&mut w, 7, 1, b"hello", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let bytes = w.release_bytes();
        assert_eq!(bytes.len(), HEADER_LEN + 5);

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let (header, body) = read_envelope(&mut r, 7, 1, &NoopLogger).unwrap();
        assert_eq!(header.id, 7);
        assert_eq!(header.version, 1);
        assert!(header.checksum.is_some());
        assert!(header.timestamp.is_some());
        assert_eq!(body, b"hello");
    }

    #[test]
    fn two_frames_back_to_back() {
        let mut w = Buffer::new_writer(Endian::Big, 1 << 16);
        write_envelope(&mut w, 1, 1, b"aa", EnvelopeWriteOptions::default()).unwrap();
        write_envelope(&mut w, 2, 1, b"bbb", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Big);
        let (h1, b1) = read_envelope(&mut r, 1, 1, &NoopLogger).unwrap();
        assert_eq!(h1.id, 1);
        assert_eq!(b1, b"aa");
        let (h2, b2) = read_envelope(&mut r, 2, 1, &NoopLogger).unwrap();
        assert_eq!(h2.id, 2);
        assert_eq!(b2, b"bbb");
    }

    #[test]
    fn endian_mismatch_rejected() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        write_envelope(&mut w, 1, 1, b"x", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Big);
        let err = read_envelope(&mut r, 1, 1, &NoopLogger).unwrap_err();
        assert!(matches!(err, Error::InvalidEndian { .. }));
    }

    #[test]
    fn id_mismatch_is_fatal() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        write_envelope(&mut w, 1, 1, b"x", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let err = read_envelope(&mut r, 99, 1, &NoopLogger).unwrap_err();
        assert!(matches!(err, Error::InvalidId { expected: 99, found: 1 }));
    }

    #[test]
    fn non_strict_version_mismatch_warns_but_succeeds() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        let options = EnvelopeWriteOptions {
            strict_mode: false,
            ..EnvelopeWriteOptions::default()
        };
        write_envelope(&mut w, 1, 3, b"x", options).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let (header, body) = read_envelope(&mut r, 1, 7, &NoopLogger).unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(body, b"x");
    }

    #[test]
    fn strict_mode_version_mismatch_is_fatal() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        let options = EnvelopeWriteOptions {
            strict_mode: true,
            ..EnvelopeWriteOptions::default()
        };
        write_envelope(&mut w, 1, 3, b"x", options).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let err = read_envelope(&mut r, 1, 7, &NoopLogger).unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { expected: 7, found: 3 }));
    }

    #[test]
    fn corrupted_body_fails_checksum() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        write_envelope(&mut w, 1, 1, b"hello", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let mut bytes = w.release_bytes();
        bytes[HEADER_LEN] ^= 0xFF;

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let err = read_envelope(&mut r, 1, 1, &NoopLogger).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn checksum_disabled_skips_validation_even_when_corrupted() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        let options = EnvelopeWriteOptions {
            checksum_enabled: false,
            ..EnvelopeWriteOptions::default()
        };
        write_envelope(&mut w, 1, 1, b"hello", options).unwrap();
        w.finalize();
        let mut bytes = w.release_bytes();
        bytes[HEADER_LEN] ^= 0xFF;

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let (header, body) = read_envelope(&mut r, 1, 1, &NoopLogger).unwrap();
        assert!(header.checksum.is_none());
        assert_eq!(body.len(), 5);
    }

    #[test]
    fn truncated_body_fails_before_checksum_check() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        write_envelope(&mut w, 1, 1, b"hello world", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let mut bytes = w.release_bytes();
        bytes.truncate(HEADER_LEN + 3);

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let err = read_envelope(&mut r, 1, 1, &NoopLogger).unwrap_err();
        assert!(matches!(err, Error::BufferUnderflow { .. }));
    }

    #[test]
    fn checksum_is_never_zero() {
        assert_ne!(checksum(0, &[]), 0);
        assert_ne!(checksum(4, &[0, 0, 0, 0]), 0);
    }

    #[test]
    fn peek_header_advances_cursor_past_header_only() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        write_envelope(&mut w, 3, 2, b"data", EnvelopeWriteOptions::default()).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let header = peek_header(&mut r).unwrap();
        assert_eq!(header.id, 3);
        assert_eq!(r.cursor(), HEADER_LEN);
    }

    #[test]
    fn timestamp_disabled_is_none() {
        let mut w = Buffer::new_writer(Endian::Little, 1024);
        let options = EnvelopeWriteOptions {
            timestamp_enabled: false,
            ..EnvelopeWriteOptions::default()
        };
        write_envelope(&mut w, 1, 1, b"x", options).unwrap();
        w.finalize();
        let bytes = w.release_bytes();

        let mut r = Buffer::from_bytes(bytes, Endian::Little);
        let (header, _) = read_envelope(&mut r, 1, 1, &NoopLogger).unwrap();
        assert!(header.timestamp.is_none());
    }
}
