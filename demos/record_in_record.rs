// SPDX-License-Identifier: EPL-2.0
//! A record embedding another record's full envelope in its own body —
//! `record::serialize_nested`/`record::deserialize_nested`, as distinct
//! from `nested_records.rs`'s plain `Wire` container nesting.

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
}

impl Record for Customer {
    const ID: u16 = 3;
    const VERSION: u8 = 1;

    fn serialize_body(&self, writer: &mut Buffer) -> Result<(), Error> {
        self.name.write_to(writer)?;
        record::serialize_nested(&self.home, writer, EnvelopeWriteOptions::default())
    }

    fn deserialize_body(reader: &mut Buffer) -> Result<Self, Error> {
        let name = String::read_from(reader)?;
        let home = record::deserialize_nested::<Address>(reader, &NoopLogger)?;
        Ok(Customer { name, home })
    }
}

fn main() {
    let customer = Customer {
        name: "Ada".to_string(),
        home: Address {
            street: "1 Analytical Engine Way".to_string(),
            zip: 10001,
        },
    };

    let bytes = record::encode(&customer, Endian::Little, 1 << 16, EnvelopeWriteOptions::default())
        .expect("encode should not fail for a well-formed payload");
    println!("encoded {} bytes (includes a full nested header+body)", bytes.len());

    let decoded: Customer =
        record::decode_quiet(bytes, Endian::Little).expect("decode should recover the customer");
    assert_eq!(decoded, customer);
    println!("{:?}", decoded);
}
