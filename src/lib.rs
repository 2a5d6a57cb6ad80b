// SPDX-License-Identifier: EPL-2.0
//! # typewire
//!
//! A compact, endian-aware binary serialization core: a cursor-based
//! [`Buffer`](buffer::Buffer), a closed type-directed codec
//! ([`Wire`](composite::Wire)) over primitives, strings, optionals, tuples,
//! fixed arrays, sequences, sets, maps and bitsets, and a versioned,
//! self-describing [`envelope`] frame with a rolling checksum.
//!
//! ## Quick start
//!
//! ```
//! use typewire::buffer::{Buffer, Endian};
//! use typewire::composite::Wire;
//!
//! let mut w = Buffer::new_writer(Endian::Little, 1 << 16);
//! 42i32.write_to(&mut w).unwrap();
//! "hello".to_string().write_to(&mut w).unwrap();
//! w.finalize();
//! let bytes = w.release_bytes();
//!
//! let mut r = Buffer::from_bytes(bytes, Endian::Little);
//! assert_eq!(i32::read_from(&mut r).unwrap(), 42);
//! assert_eq!(String::read_from(&mut r).unwrap(), "hello");
//! ```
//!
//! ## Framing a payload
//!
//! ```
//! use typewire::buffer::Endian;
//! use typewire::envelope::EnvelopeWriteOptions;
//! use typewire::record;
//!
//! let payload: Vec<i32> = vec![1, 2, 3];
//! let bytes = record::encode_value(&payload, 7, 1, Endian::Little, 1 << 20, EnvelopeWriteOptions::default()).unwrap();
//!
//! let (header, decoded): (typewire::Header, Vec<i32>) =
//!     record::decode_value(bytes, Endian::Little, 7, 1, &typewire::logger::NoopLogger).unwrap();
//! assert_eq!(header.id, 7);
//! assert_eq!(decoded, payload);
//! ```

pub mod buffer;
pub mod composite;
pub mod envelope;
pub mod error;
pub mod io;
pub mod logger;
pub mod record;
pub mod wide;

pub use buffer::{Buffer, Endian};
pub use composite::{Bitset, Wire};
pub use envelope::{EnvelopeWriteOptions, Flags, Header};
pub use error::{Error, WideStringError};
pub use logger::{Location, Logger, NoopLogger, Severity};
pub use record::Record;
