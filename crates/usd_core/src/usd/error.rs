//! Error taxonomy for the USDA reader (spec.md §7).
//!
//! Three channels: warnings (accumulated, never fatal), per-Prim errors
//! (accumulated, fatal only when `allow_unknown_prims = false` and the Prim
//! type is unrecognized), and fatal errors that abort `Read` /
//! `ReconstructStage` immediately.

use thiserror::Error;

/// The fixed failure taxonomy from spec.md §7.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReaderError {
    #[error("[USDA] malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("[USDA] invalid prim name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("[USDA] metadata key '{key}' expected {expected}, got {observed}")]
    InvalidMetadataType {
        key: String,
        expected: String,
        observed: String,
    },

    #[error("[USDA] unknown metadata key '{key}' (ignored)")]
    UnknownMetadataKey { key: String },

    #[error("[USDA] invalid list-edit qualifier for '{key}': {qualifier}")]
    InvalidListEditQualifier { key: String, qualifier: String },

    #[error("[USDA] unknown token '{token}' for enumerated field '{field}'")]
    UnknownEnumToken { field: String, token: String },

    #[error("[USDA] unknown prim type '{type_name}'")]
    UnknownPrimType { type_name: String },

    #[error("[USDA] unknown API schema '{name}'")]
    UnknownApiSchema { name: String },

    #[error("[USDA] schema reconstruction failed for type '{type_name}': {message}")]
    SchemaReconstructFailed { type_name: String, message: String },

    #[error("[USDA] index {index} out of range (store size {size})")]
    IndexOutOfRange { index: u32, size: usize },

    #[error("[USDA] duplicate variant child at index {index} in variant set '{variant_set}'")]
    DuplicateVariantChild { variant_set: String, index: u32 },

    #[error("[USDA] resource limit exceeded: {limit} (value {value}, max {max})")]
    ResourceLimitExceeded {
        limit: &'static str,
        value: usize,
        max: usize,
    },

    #[error("[USDA] invalid state: {0}")]
    StateViolation(String),
}

pub type ReaderResult<T> = Result<T, ReaderError>;

/// Accumulates warnings and per-Prim errors for a single `Read` call,
/// exposed via `Reader::warnings()` / `Reader::prim_errors()`.
#[derive(Default, Debug, Clone)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub prim_errors: Vec<String>,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn prim_error(&mut self, message: impl Into<String>) {
        self.prim_errors.push(message.into());
    }
}
