//! Conformance harness: runs an external reference scorer per series and
//! diffs its dump against the engine's standings.

pub mod checks;
pub mod dump;
mod export;
mod runner;

pub use checks::{check_series, check_skipper, Mismatch, MismatchKind, SkipperView};
pub use dump::{DumpValue, ReferenceDump, ReferenceRecord};
pub use export::ReferenceInput;
pub use runner::{
    check_series_with_reference, run_all, write_atomic, ReferenceCommand, SeriesCheck,
    SeriesOutcome, BOATS_FILE, DUMP_FILE, SERIES_FILE,
};
