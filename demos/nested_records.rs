// SPDX-License-Identifier: EPL-2.0
//! A record whose body is itself a composite of nested `Wire` types,
//! demonstrating the closed set of shapes: a map, an optional, and a
//! fixed-size array all inside a single frame.

use std::collections::BTreeMap;

use typewire::buffer::{Buffer, Endian};
use typewire::envelope::EnvelopeWriteOptions;
use typewire::{record, Error, Record, Wire};

#[derive(Debug, PartialEq)]
struct SensorReading {
    station_id: u32,
    samples: [f32; 4],
    tags: BTreeMap<String, String>,
    note: Option<String>,
}

impl Record for SensorReading {
    const ID: u16 = 42;
    const VERSION: u8 = 1;

    fn serialize_body(&self, writer: &mut Buffer) -> Result<(), Error> {
        self.station_id.write_to(writer)?;
        self.samples.write_to(writer)?;
        self.tags.write_to(writer)?;
        self.note.write_to(writer)
    }

    fn deserialize_body(reader: &mut Buffer) -> Result<Self, Error> {
        let station_id = u32::read_from(reader)?;
        let samples = <[f32; 4]>::read_from(reader)?;
        let tags = BTreeMap::<String, String>::read_from(reader)?;
        let note = Option::<String>::read_from(reader)?;
        Ok(SensorReading {
            station_id,
            samples,
            tags,
            note,
        })
    }
}

fn main() {
    let mut tags = BTreeMap::new();
    tags.insert("site".to_string(), "north-gate".to_string());

    let reading = SensorReading {
        station_id: 11,
        samples: [20.1, 20.4, 20.6, 20.3],
        tags,
        note: Some("calibrated".to_string()),
    };

    let bytes = record::encode(&reading, Endian::Little, 1 << 16, EnvelopeWriteOptions::default())
        .expect("encode should not fail for a well-formed payload");
    println!("encoded {} bytes", bytes.len());

    let decoded: SensorReading =
        record::decode_quiet(bytes, Endian::Little).expect("decode should recover the reading");
    assert_eq!(decoded, reading);
    println!("{:?}", decoded);
}
