// SPDX-License-Identifier: EPL-2.0
//! The `Record` surface: a typed payload that knows its own `id` and
//! `version` and rides inside an [`crate::envelope`] frame. This is the
//! layer application code actually calls (`spec.md` §4.5, "Record
//! surface") — `Wire` and `Buffer` stay low-level building blocks
//! underneath it, the same way the teacher's `Scope` subscription helpers
//! sit on top of its raw `Storage` primitives.

use crate::buffer::{Buffer, Endian};
use crate::composite::Wire;
use crate::envelope::{self, EnvelopeWriteOptions, Header};
use crate::error::Error;
use crate::logger::{Logger, NoopLogger};

/// A value that can be framed as a self-describing envelope: it names the
/// `id` and `version` that identify its wire shape, and defers the
/// field-level encoding to [`Buffer`]. The envelope, not the record, owns
/// the header (`spec.md` §3, "the envelope owns and injects it").
pub trait Record: Sized {
    /// Identifies this record's shape on the wire; pick a value unique
    /// within the protocol the caller is implementing.
    const ID: u16;
    /// Bumped when the wire shape changes in a way old readers can't parse.
    const VERSION: u8;

    fn serialize_body(&self, writer: &mut Buffer) -> Result<(), Error>;
    fn deserialize_body(reader: &mut Buffer) -> Result<Self, Error>;
}

/// Encode any [`Record`] implementor using its own declared `id` and
/// `version` and the given write options (checksum/timestamp/strict-mode).
///
/// Header and body share a single writer (and therefore a single
/// `max_size` budget) — `serialize_body` is invoked directly on the frame
/// buffer after the header is reserved, matching `spec.md` §4.4's two-pass
/// design literally rather than composing two independently-capped buffers.
pub fn encode<T: Record>(
    value: &T,
    endian: Endian,
    max_size: usize,
    options: EnvelopeWriteOptions,
) -> Result<Vec<u8>, Error> {
    let mut buf = Buffer::new_writer(endian, max_size);
    envelope::write_envelope_with(&mut buf, T::ID, T::VERSION, options, |w| value.serialize_body(w))?;
    buf.finalize();
    Ok(buf.release_bytes())
}

/// Decode a frame as a specific [`Record`] implementor, validating the
/// header against `T::ID`/`T::VERSION` (`spec.md` §4.4 "Deserialize").
/// Rejections and non-strict version warnings are reported through
/// `logger`; pass [`NoopLogger`] to discard them.
pub fn decode<T: Record>(bytes: Vec<u8>, endian: Endian, logger: &dyn Logger) -> Result<(Header, T), Error> {
    let mut buf = Buffer::from_bytes(bytes, endian);
    let (header, body) = envelope::read_envelope(&mut buf, T::ID, T::VERSION, logger)?;
    let mut body_buf = Buffer::from_bytes(body, endian);
    let value = T::deserialize_body(&mut body_buf)?;
    Ok((header, value))
}

/// Decode a frame as a specific [`Record`] implementor, discarding any
/// warnings a non-strict version mismatch would otherwise surface.
pub fn decode_quiet<T: Record>(bytes: Vec<u8>, endian: Endian) -> Result<T, Error> {
    decode::<T>(bytes, endian, &NoopLogger).map(|(_, value)| value)
}

/// Peek a frame's header without decoding its body — useful for routing
/// on `id` before deciding which [`Record`] type to parse the body as.
pub fn peek_header(bytes: &[u8], endian: Endian) -> Result<Header, Error> {
    let mut buf = Buffer::from_bytes(bytes.to_vec(), endian);
    envelope::peek_header(&mut buf)
}

/// Write `value`'s full envelope (header + body) directly into `writer` at
/// the current cursor — the actual mechanism behind `spec.md` §4.3 "Nested
/// Record": "the nested record writes its own envelope". Unlike [`encode`],
/// this never produces a standalone `Vec<u8>` or an extra length prefix; the
/// parent's body literally contains the child's 24-octet header and body in
/// place. Call this from inside a parent [`Record`]'s `serialize_body`.
pub fn serialize_nested<T: Record>(
    value: &T,
    writer: &mut Buffer,
    options: EnvelopeWriteOptions,
) -> Result<(), Error> {
    envelope::write_envelope_with(writer, T::ID, T::VERSION, options, |w| value.serialize_body(w))
}

/// Read a nested [`Record`]'s full envelope directly from `reader` at the
/// current cursor — the counterpart to [`serialize_nested`]. Call this from
/// inside a parent [`Record`]'s `deserialize_body`.
pub fn deserialize_nested<T: Record>(reader: &mut Buffer, logger: &dyn Logger) -> Result<T, Error> {
    let (_, body) = envelope::read_envelope(reader, T::ID, T::VERSION, logger)?;
    let mut body_buf = Buffer::from_bytes(body, reader.endian());
    T::deserialize_body(&mut body_buf)
}

/// Frame an ad hoc [`Wire`] value under an explicit `id`/`version` pair,
/// for callers that would rather not define a dedicated [`Record`] type
/// for every message shape. Shares a single writer between header and
/// body for the same reason [`encode`] does.
pub fn encode_value<T: Wire>(
    value: &T,
    id: u16,
    version: u8,
    endian: Endian,
    max_size: usize,
    options: EnvelopeWriteOptions,
) -> Result<Vec<u8>, Error> {
    let mut buf = Buffer::new_writer(endian, max_size);
    envelope::write_envelope_with(&mut buf, id, version, options, |w| value.write_to(w))?;
    buf.finalize();
    Ok(buf.release_bytes())
}

/// Decode a frame produced by [`encode_value`], validating against the
/// expected `id`/`version`.
pub fn decode_value<T: Wire>(
    bytes: Vec<u8>,
    endian: Endian,
    expect_id: u16,
    expect_version: u8,
    logger: &dyn Logger,
) -> Result<(Header, T), Error> {
    let mut buf = Buffer::from_bytes(bytes, endian);
    let (header, body) = envelope::read_envelope(&mut buf, expect_id, expect_version, logger)?;
    let mut body_buf = Buffer::from_bytes(body, endian);
    let value = T::read_from(&mut body_buf)?;
    Ok((header, value))
}
