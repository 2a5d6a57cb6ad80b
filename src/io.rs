// SPDX-License-Identifier: EPL-2.0
//! Small filesystem helpers for loading an encoded frame from disk. Kept
//! separate from [`crate::envelope`]/[`crate::record`] so those stay
//! transport-agnostic — a caller embedding this crate over a socket never
//! needs to link this module in (`spec.md` §6, "ambient I/O helpers").

use std::fs;
use std::path::Path;

use crate::error::Error;

/// Read an entire file into memory, translating a not-found error into
/// [`Error::FileNotFound`] rather than the generic [`Error::Io`] variant so
/// callers can match on it without inspecting the wrapped `io::Error` kind.
pub fn read_file_to_bytes(path: impl AsRef<Path>) -> Result<Vec<u8>, Error> {
    let path = path.as_ref();
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })
}

/// Write `bytes` to `path`, creating or truncating it as needed.
pub fn write_bytes_to_file(path: impl AsRef<Path>, bytes: &[u8]) -> Result<(), Error> {
    fs::write(path, bytes).map_err(Error::Io)
}
