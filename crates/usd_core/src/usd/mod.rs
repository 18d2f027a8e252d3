//! USDA reading and Stage reconstruction.
//!
//! A line-based scanner drives a small set of callback-shaped registration
//! points (stage metadata, prim construction, PrimSpec construction) which
//! populate flat, index-addressed stores; a bottom-up reconstruction pass
//! then turns those stores into a typed `Stage` (or an untyped `Layer`, for
//! the composition-arc path).
//!
//! ## Supported
//!
//! - USDA (ASCII) text parsing of `def`/`over`/`class` blocks, metadata,
//!   variant sets, and the closed schema set in [`prim::PrimPayload`].
//! - Bottom-up tree reconstruction with variant splicing.
//! - The untyped `PrimSpec`/`Layer` path used for composition arcs.
//!
//! ## Not Yet Supported
//!
//! - USDC binary decoding.
//! - Composition evaluation (references/payloads/sublayers are recorded,
//!   never resolved or merged).
//! - Time-sample interpolation.
//! - Multi-threaded parsing (`numThreads` is accepted but unused).

pub mod config;
pub mod error;
pub mod lexer;
pub mod meta;
pub mod path;
pub mod prim;
pub mod reader;
pub mod reconstruct;
pub mod schema;
pub mod store;
pub mod value;

pub use config::ReaderConfig;
pub use error::{Diagnostics, ReaderError, ReaderResult};
pub use meta::{Kind, PlaybackMode, PrimMeta};
pub use path::{ListEditQualifier, Path, Specifier};
pub use prim::{Layer, Prim, PrimPayload, PrimSpec, Stage, StageMeta};
pub use reader::{LoadState, Reader};
pub use value::{Property, PropertyMap, PropertyValue, Reference};
