// SPDX-License-Identifier: EPL-2.0
//! Frames a single value, prints the wire bytes, then decodes it back.

use typewire::buffer::Endian;
use typewire::envelope::EnvelopeWriteOptions;
use typewire::{record, NoopLogger};

fn main() {
    let payload = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
    let bytes = record::encode_value(&payload, 1, 1, Endian::Little, 1 << 20, EnvelopeWriteOptions::default())
        .expect("encode should not fail for a well-formed payload");

    println!("encoded {} bytes: {:02x?}", bytes.len(), bytes);

    let (header, decoded): (typewire::Header, Vec<String>) =
        record::decode_value(bytes, Endian::Little, 1, 1, &NoopLogger)
            .expect("decode should recover the original payload");

    println!("id={} version={} body={:?}", header.id, header.version, decoded);
    assert_eq!(decoded, payload);
}
