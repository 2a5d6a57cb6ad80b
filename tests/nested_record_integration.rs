// SPDX-License-Identifier: EPL-2.0
//! A record whose body embeds another record's *own* envelope in place —
//! as opposed to nesting plain `Wire` containers (covered by
//! `envelope_integration.rs`'s `nested_composite_record_round_trip`). This
//! exercises `spec.md` §4.3 "Nested Record": "the nested record writes its
//! own envelope", via `record::serialize_nested`/`record::deserialize_nested`.

use typewire::buffer::{Buffer, Endian};
use typewire::composite::Wire;
use typewire::envelope::EnvelopeWriteOptions;
use typewire::{record, Error, NoopLogger, Record};

#[derive(Debug, PartialEq)]
struct Address {
    street: String,
    zip: u32,
}

impl Record for Address {
    const ID: u16 = 2;
    const VERSION: u8 = 1;

    fn serialize_body(&self, writer: &mut Buffer) -> Result<(), Error> {
        self.street.write_to(writer)?;
        self.zip.write_to(writer)
    }

    fn deserialize_body(reader: &mut Buffer) -> Result<Self, Error> {
        Ok(Address {
            street: String::read_from(reader)?,
            zip: u32::read_from(reader)?,
        })
    }
}

#[derive(Debug, PartialEq)]
struct Customer {
    name: String,
    home: Address,
    work: Address,
}

impl Record for Customer {
    const ID: u16 = 3;
    const VERSION: u8 = 1;

    fn serialize_body(&self, writer: &mut Buffer) -> Result<(), Error> {
        self.name.write_to(writer)?;
        // Each nested record writes its own 24-octet header plus body
        // directly into this same buffer — no extra length prefix, no
        // separate byte vector.
        record::serialize_nested(&self.home, writer, EnvelopeWriteOptions::default())?;
        record::serialize_nested(&self.work, writer, EnvelopeWriteOptions::default())
    }

    fn deserialize_body(reader: &mut Buffer) -> Result<Self, Error> {
        let name = String::read_from(reader)?;
        let home = record::deserialize_nested::<Address>(reader, &NoopLogger)?;
        let work = record::deserialize_nested::<Address>(reader, &NoopLogger)?;
        Ok(Customer { name, home, work })
    }
}

#[test]
fn nested_record_embeds_its_own_header_in_the_parent_body() {
    let customer = Customer {
        name: "Ada".to_string(),
        home: Address {
            street: "1 Analytical Engine Way".to_string(),
            zip: 10001,
        },
        work: Address {
            street: "2 Difference Engine Ave".to_string(),
            zip: 20002,
        },
    };

    let bytes = record::encode(&customer, Endian::Little, 1 << 16, EnvelopeWriteOptions::default()).unwrap();
    let decoded: Customer = record::decode_quiet(bytes, Endian::Little).unwrap();
    assert_eq!(customer, decoded);
}

#[test]
fn nested_record_id_mismatch_is_rejected() {
    use typewire::envelope;

    // Hand-write a Customer body whose "home" slot declares the wrong id.
    let mut w = Buffer::new_writer(Endian::Little, 1 << 16);
    "Bob".to_string().write_to(&mut w).unwrap();
    envelope::write_envelope(&mut w, 99, 1, b"bogus-body", EnvelopeWriteOptions::default()).unwrap();
    w.finalize();
    let body_only = w.release_bytes();

    // Frame it under Customer's own id/version so the outer envelope is valid.
    let mut frame = Buffer::new_writer(Endian::Little, 1 << 16);
    envelope::write_envelope(&mut frame, Customer::ID, Customer::VERSION, &body_only, EnvelopeWriteOptions::default())
        .unwrap();
    frame.finalize();
    let bytes = frame.release_bytes();

    let err = record::decode_quiet::<Customer>(bytes, Endian::Little).unwrap_err();
    assert!(matches!(err, Error::InvalidId { expected: Address::ID, found: 99 }));
}
