//! Verification of cut output: key-frame cadence and metadata preservation

pub mod metadata_diff;
pub mod verifier;

pub use metadata_diff::{DiffEntry, DiffKind, DiffLine, MetadataDiffer, MetadataReport};
pub use verifier::{GopCadenceValidator, DEFAULT_GOP_CADENCE};
