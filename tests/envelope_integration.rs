// SPDX-License-Identifier: EPL-2.0
//! End-to-end coverage of the framing layer: golden byte vectors for the
//! worked scenarios, cross-endian interop, and envelope validation under
//! deliberate corruption.

use std::collections::{BTreeMap, HashMap};

use typewire::buffer::{Buffer, Endian};
use typewire::composite::Wire;
use typewire::envelope::{self, EnvelopeWriteOptions, HEADER_LEN};
use typewire::{record, Error, NoopLogger};

#[test]
fn golden_vector_scalar_envelope_little_endian() {
    let mut w = Buffer::new_writer(Endian::Little, 1 << 16);
    envelope::write_envelope(&mut w, 0x0102, 5, &[0xAA, 0xBB], EnvelopeWriteOptions::default()).unwrap();
    w.finalize();
    let bytes = w.release_bytes();

    assert_eq!(bytes.len(), HEADER_LEN + 2);
    assert_eq!(&bytes[4..6], &[0x02, 0x01]); // id, little-endian, at offset 4
    assert_eq!(bytes[6], 5); // version at offset 6
    assert_eq!(bytes[7] & 0x01, 0x01); // flags bit 0: little-endian payload

    let mut r = Buffer::from_bytes(bytes, Endian::Little);
    let (header, body) = envelope::read_envelope(&mut r, 0x0102, 5, &NoopLogger).unwrap();
    assert_eq!(header.id, 0x0102);
    assert_eq!(body, vec![0xAA, 0xBB]);
}

#[test]
fn golden_vector_scalar_envelope_big_endian() {
    let mut w = Buffer::new_writer(Endian::Big, 1 << 16);
    envelope::write_envelope(&mut w, 0x0102, 5, &[0xAA, 0xBB], EnvelopeWriteOptions::default()).unwrap();
    w.finalize();
    let bytes = w.release_bytes();

    assert_eq!(&bytes[4..6], &[0x01, 0x02]); // id, big-endian
    assert_eq!(bytes[7] & 0x01, 0x00); // flags bit 0: big-endian payload

    let mut r = Buffer::from_bytes(bytes, Endian::Big);
    let (header, body) = envelope::read_envelope(&mut r, 0x0102, 5, &NoopLogger).unwrap();
    assert_eq!(header.id, 0x0102);
    assert_eq!(body, vec![0xAA, 0xBB]);
}

#[test]
fn cross_endian_header_declares_mismatch() {
    let mut w = Buffer::new_writer(Endian::Little, 1024);
    envelope::write_envelope(&mut w, 1, 1, b"body", EnvelopeWriteOptions::default()).unwrap();
    w.finalize();
    let bytes = w.release_bytes();

    let mut r = Buffer::from_bytes(bytes, Endian::Big);
    let err = envelope::read_envelope(&mut r, 1, 1, &NoopLogger).unwrap_err();
    assert!(matches!(err, Error::InvalidEndian { .. }));
}

#[test]
fn nested_composite_record_round_trip() {
    #[derive(Debug, PartialEq)]
    struct Profile {
        id: u64,
        scores: Vec<f64>,
        metadata: BTreeMap<String, String>,
        aliases: HashMap<String, u32>,
    }

    impl typewire::Record for Profile {
        const ID: u16 = 200;
        const VERSION: u8 = 2;

        fn serialize_body(&self, writer: &mut Buffer) -> Result<(), Error> {
            self.id.write_to(writer)?;
            self.scores.write_to(writer)?;
            self.metadata.write_to(writer)?;
            self.aliases.write_to(writer)
        }

        fn deserialize_body(reader: &mut Buffer) -> Result<Self, Error> {
            Ok(Profile {
                id: u64::read_from(reader)?,
                scores: Vec::<f64>::read_from(reader)?,
                metadata: BTreeMap::<String, String>::read_from(reader)?,
                aliases: HashMap::<String, u32>::read_from(reader)?,
            })
        }
    }

    let mut metadata = BTreeMap::new();
    metadata.insert("role".to_string(), "admin".to_string());
    let mut aliases = HashMap::new();
    aliases.insert("primary".to_string(), 1u32);

    let profile = Profile {
        id: 9001,
        scores: vec![1.5, 2.25, 3.125],
        metadata,
        aliases,
    };

    let bytes = record::encode(&profile, Endian::Little, 1 << 20, EnvelopeWriteOptions::default()).unwrap();
    let decoded: Profile = record::decode_quiet(bytes, Endian::Little).unwrap();
    assert_eq!(profile, decoded);
}

#[test]
fn size_prefix_truncation_does_not_allocate_past_remaining_bytes() {
    // A length prefix of u64::MAX must not cause an attempted allocation;
    // the read should fail cleanly once the declared count exceeds what's
    // actually left in the buffer.
    let mut w = Buffer::new_writer(Endian::Little, 1024);
    w.write_size(u64::MAX).unwrap();
    w.finalize();
    let bytes = w.release_bytes();

    let mut r = Buffer::from_bytes(bytes, Endian::Little);
    let err = Vec::<u8>::read_from(&mut r).unwrap_err();
    assert!(matches!(err, Error::BufferUnderflow { .. } | Error::SizeOverflow { .. }));
}

#[test]
fn envelope_rejects_frame_with_wrong_id() {
    let mut w = Buffer::new_writer(Endian::Little, 1024);
    envelope::write_envelope(&mut w, 1, 1, b"x", EnvelopeWriteOptions::default()).unwrap();
    w.finalize();
    let bytes = w.release_bytes();

    let mut r = Buffer::from_bytes(bytes, Endian::Little);
    let err = envelope::read_envelope(&mut r, 99, 1, &NoopLogger).unwrap_err();
    assert!(matches!(err, Error::InvalidId { expected: 99, found: 1 }));
}

#[test]
fn envelope_rejects_frame_with_wrong_version_in_strict_mode() {
    let mut w = Buffer::new_writer(Endian::Little, 1024);
    let options = EnvelopeWriteOptions {
        strict_mode: true,
        ..EnvelopeWriteOptions::default()
    };
    envelope::write_envelope(&mut w, 1, 3, b"x", options).unwrap();
    w.finalize();
    let bytes = w.release_bytes();

    let mut r = Buffer::from_bytes(bytes, Endian::Little);
    let err = envelope::read_envelope(&mut r, 1, 7, &NoopLogger).unwrap_err();
    assert!(matches!(err, Error::VersionMismatch { expected: 7, found: 3 }));
}

#[test]
fn envelope_idempotence_decode_then_reencode_matches_original() {
    let mut w = Buffer::new_writer(Endian::Little, 1024);
    envelope::write_envelope(&mut w, 1, 1, b"stable body", EnvelopeWriteOptions::default()).unwrap();
    w.finalize();
    let original = w.release_bytes();

    let mut r = Buffer::from_bytes(original.clone(), Endian::Little);
    let (header, body) = envelope::read_envelope(&mut r, 1, 1, &NoopLogger).unwrap();

    let mut w2 = Buffer::new_writer(Endian::Little, 1024);
    let options = EnvelopeWriteOptions {
        checksum_enabled: header.checksum.is_some(),
        timestamp_enabled: false, // timestamp is wall-clock, excluded from this comparison
        strict_mode: header.flags.strict_mode(),
    };
    envelope::write_envelope(&mut w2, header.id, header.version, &body, options).unwrap();
    w2.finalize();
    let reencoded = w2.release_bytes();

    // Same body bytes land at the same offset regardless of the timestamp value.
    assert_eq!(&original[HEADER_LEN..], &reencoded[HEADER_LEN..]);
}
