// SPDX-License-Identifier: EPL-2.0
//! The logger collaborator — a sink the core calls into on warnings and
//! fatal decode conditions. Never a global facade: every call site holds an
//! explicit `&dyn Logger`, injected by the caller (see `spec.md` §6
//! "Logger collaborator" and the Design Notes entry on replacing a global
//! stderr sink with dependency injection).

use std::fmt;

/// Severity of a single log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Debug => write!(f, "DEBUG"),
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Source location triple attached to every log call, mirroring the
/// `(file, function, line)` triple from `spec.md` §6.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

/// Build a [`Location`] tagged with the calling function's name.
///
/// `file!()` and `line!()` are supplied by the compiler at the call site;
/// the function name has no equivalent builtin, so callers name themselves.
#[macro_export]
macro_rules! location {
    ($function:expr) => {
        $crate::logger::Location {
            file: file!(),
            function: $function,
            line: line!(),
        }
    };
}

/// The injected logging sink. Implementors must be safe to hold behind a
/// shared reference across a single decode call; the core never stores a
/// `Logger` beyond the lifetime of the call that receives it.
pub trait Logger: Send + Sync {
    fn log(&self, severity: Severity, location: Location, message: &str);
}

/// A logger that discards everything. The default when a caller doesn't
/// care to wire one up (spec: "provision of a no-op logger is acceptable").
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _severity: Severity, _location: Location, _message: &str) {}
}

/// Bridges onto the `log` crate's global facade, for embedders who already
/// initialize a `log` subscriber and would rather not thread a bespoke
/// logger through every call. Additive only — the core never calls `log::*`
/// macros itself, only through an injected `&dyn Logger`.
#[cfg(feature = "log-facade")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeLogger;

#[cfg(feature = "log-facade")]
impl Logger for LogFacadeLogger {
    fn log(&self, severity: Severity, location: Location, message: &str) {
        let level = match severity {
            Severity::Debug => log::Level::Debug,
            Severity::Warn => log::Level::Warn,
            Severity::Error => log::Level::Error,
        };
        log::log!(
            target: location.function,
            level,
            "{}:{} {}",
            location.file,
            location.line,
            message
        );
    }
}
