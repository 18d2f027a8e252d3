//! USDA reading and Stage reconstruction for Universal Scene Description assets.
//!
//! - **Reader facade**: [`usd::Reader`], driven through `read`,
//!   `reconstruct_stage`, and `get_as_layer`.
//! - **Typed scene graph**: [`usd::Stage`], [`usd::Prim`], [`usd::PrimPayload`].
//! - **Composition-arc path**: [`usd::Layer`], [`usd::PrimSpec`].
//!
//! # Example
//!
//! ```ignore
//! use usd_core::{LoadState, Reader, ReaderConfig};
//!
//! let mut reader = Reader::new(ReaderConfig::default());
//! reader.read(LoadState::Toplevel, &content)?;
//! let stage = reader.reconstruct_stage()?;
//! for prim in &stage.root_prims {
//!     println!("{} ({})", prim.path, prim.payload.type_name());
//! }
//! ```

pub mod usd;

pub use usd::{
    Diagnostics, Kind, Layer, ListEditQualifier, LoadState, Path, PlaybackMode, Prim, PrimMeta,
    PrimPayload, PrimSpec, Property, PropertyMap, PropertyValue, Reader, ReaderConfig,
    ReaderError, ReaderResult, Reference, Specifier, Stage, StageMeta,
};
