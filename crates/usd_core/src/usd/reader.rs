//! `Reader`: the public facade tying the lexer, stores, and reconstruction
//! pass together (spec.md §4.1, §6).
//!
//! Mirrors how `bif_core::usd::loader::SceneBuilder` is constructed with a
//! name and driven through a small number of public methods, rather than
//! exposing the internal stores directly.

use log::{debug, warn};

use crate::usd::config::ReaderConfig;
use crate::usd::error::{Diagnostics, ReaderError, ReaderResult};
use crate::usd::lexer::Lexer;
use crate::usd::meta::decode_stage_meta;
use crate::usd::prim::{Layer, Stage, StageMeta};
use crate::usd::reconstruct::{construct_prim_spec_tree, construct_prim_tree};
use crate::usd::store::{PrimNodeStore, PrimSpecStore};

/// Why this document is being read, mirroring spec.md §6's registration
/// points: a top-level stage load behaves differently from a load that
/// will be spliced in as a composition arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadState {
    Toplevel,
    Reference,
    SubLayer,
    Payload,
}

/// Drives a single USDA document through the parse → store → reconstruct
/// pipeline. One `Reader` corresponds to one document.
pub struct Reader {
    config: ReaderConfig,
    base_dir: Option<String>,
    load_state: Option<LoadState>,
    node_store: PrimNodeStore,
    spec_store: PrimSpecStore,
    stage_meta: StageMeta,
    stage: Option<Stage>,
    diagnostics: Diagnostics,
    error: Option<ReaderError>,
    memory_estimate_bytes: usize,
}

impl Reader {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            base_dir: None,
            load_state: None,
            node_store: PrimNodeStore::new(),
            spec_store: PrimSpecStore::new(),
            stage_meta: StageMeta::default(),
            stage: None,
            diagnostics: Diagnostics::default(),
            error: None,
            memory_estimate_bytes: 0,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Bookkeeping only: prefixes relative asset paths surfaced in
    /// `Reference` records. No file I/O or path resolution happens here —
    /// that is out of scope (spec.md §2).
    pub fn set_base_dir(&mut self, dir: impl Into<String>) {
        self.base_dir = Some(dir.into());
    }

    pub fn base_dir(&self) -> Option<&str> {
        self.base_dir.as_deref()
    }

    /// Parse `content`, populating the internal `PrimNode`/`PrimSpec`
    /// stores and the stage-metadata callback's raw data. Does not itself
    /// build the typed tree — call `reconstruct_stage()` / `get_as_layer()`
    /// afterward.
    pub fn read(&mut self, load_state: LoadState, content: &str) -> ReaderResult<()> {
        self.load_state = Some(load_state);
        debug!("Reader::read: load_state={load_state:?}, {} bytes", content.len());

        self.memory_estimate_bytes = self.memory_estimate_bytes.saturating_add(content.len());
        if self.memory_estimate_bytes > self.config.max_allowed_memory_bytes() {
            let e = ReaderError::ResourceLimitExceeded {
                limit: "maxAllowedMemoryInMB",
                value: self.memory_estimate_bytes,
                max: self.config.max_allowed_memory_bytes(),
            };
            self.error = Some(e.clone());
            return Err(e);
        }

        let lexer = Lexer::new(content, &self.config);
        let raw_meta = match load_state {
            LoadState::Toplevel | LoadState::SubLayer => {
                lexer.scan_stage(&mut self.node_store, &mut self.diagnostics)
            }
            LoadState::Reference | LoadState::Payload => {
                lexer.scan_layer(&mut self.spec_store, &mut self.diagnostics)
            }
        };

        let raw_meta = match raw_meta {
            Ok(m) => m,
            Err(e) => {
                self.error = Some(e.clone());
                return Err(e);
            }
        };

        let mut warnings = Vec::new();
        let stage_meta = match decode_stage_meta(&raw_meta, &mut warnings) {
            Ok(m) => m,
            Err(e) => {
                self.error = Some(e.clone());
                return Err(e);
            }
        };
        for w in warnings {
            warn!("{w}");
            self.diagnostics.warn(w);
        }
        self.stage_meta = stage_meta;

        Ok(())
    }

    /// Build the typed Prim tree from whatever has been parsed so far
    /// (spec.md §4.7). Idempotent: calling it again re-runs reconstruction.
    pub fn reconstruct_stage(&mut self) -> ReaderResult<&Stage> {
        let roots = construct_prim_tree(&self.node_store, self.config.allow_unknown_prims, &mut self.diagnostics)?;
        self.stage = Some(Stage {
            meta: self.stage_meta.clone(),
            root_prims: roots,
        });
        Ok(self.stage.as_ref().unwrap())
    }

    pub fn get_stage(&self) -> Option<&Stage> {
        self.stage.as_ref()
    }

    /// Build an untyped `Layer` from the composition-arc path (spec.md
    /// §4.8). One-shot: a second call after a successful first call is a
    /// `StateViolation` (the underlying store has already been consumed).
    pub fn get_as_layer(&mut self) -> ReaderResult<Layer> {
        if self.spec_store.is_consumed() {
            let e = ReaderError::StateViolation("GetAsLayer called more than once".to_string());
            self.error = Some(e.clone());
            return Err(e);
        }
        let root_specs = construct_prim_spec_tree(&self.spec_store)?;
        self.spec_store.mark_consumed();
        Ok(Layer {
            meta: self.stage_meta.clone(),
            root_specs,
        })
    }

    pub fn error(&self) -> Option<&ReaderError> {
        self.error.as_ref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.diagnostics.warnings
    }

    pub fn prim_errors(&self) -> &[String] {
        &self.diagnostics.prim_errors
    }

    pub fn memory_estimate_bytes(&self) -> usize {
        self.memory_estimate_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stage_reconstructs_to_no_roots() {
        let mut reader = Reader::new(ReaderConfig::default());
        reader.read(LoadState::Toplevel, "").unwrap();
        let stage = reader.reconstruct_stage().unwrap();
        assert!(stage.root_prims.is_empty());
    }

    #[test]
    fn single_xform_round_trips() {
        let mut reader = Reader::new(ReaderConfig::default());
        reader
            .read(LoadState::Toplevel, "def Xform \"World\"\n{\n}\n")
            .unwrap();
        let stage = reader.reconstruct_stage().unwrap();
        assert_eq!(stage.root_prims.len(), 1);
        assert_eq!(stage.root_prims[0].path, "/World");
    }

    #[test]
    fn get_as_layer_is_one_shot() {
        let mut reader = Reader::new(ReaderConfig::default());
        reader
            .read(LoadState::Reference, "def Xform \"World\"\n{\n}\n")
            .unwrap();
        assert!(reader.get_as_layer().is_ok());
        let err = reader.get_as_layer();
        assert!(matches!(err, Err(ReaderError::StateViolation(_))));
    }

    #[test]
    fn unknown_prim_type_model_fallback() {
        let mut reader = Reader::new(ReaderConfig::default());
        reader
            .read(LoadState::Toplevel, "def MadeUpSchema \"Thing\"\n{\n}\n")
            .unwrap();
        let stage = reader.reconstruct_stage().unwrap();
        assert!(matches!(
            stage.root_prims[0].payload,
            crate::usd::prim::PrimPayload::Model
        ));
        assert_eq!(reader.warnings().len(), 1);
        assert_eq!(stage.root_prims[0].prim_type_name.as_deref(), Some("MadeUpSchema"));
    }

    #[test]
    fn stage_metadata_is_decoded_not_dropped() {
        let content = concat!(
            "(\n",
            "    doc = \"A scene\"\n",
            "    upAxis = \"Y\"\n",
            "    defaultPrim = \"World\"\n",
            "    metersPerUnit = 0.01\n",
            "    playbackMode = \"loop\"\n",
            ")\n",
            "\n",
            "def Xform \"World\"\n{\n}\n",
        );
        let mut reader = Reader::new(ReaderConfig::default());
        reader.read(LoadState::Toplevel, content).unwrap();
        let stage = reader.reconstruct_stage().unwrap();
        assert_eq!(stage.meta.doc.as_deref(), Some("A scene"));
        assert_eq!(stage.meta.up_axis, Some('Y'));
        assert_eq!(stage.meta.default_prim.as_deref(), Some("World"));
        assert_eq!(stage.meta.meters_per_unit, Some(0.01));
        assert_eq!(stage.meta.playback_mode, Some(crate::usd::meta::PlaybackMode::Loop));
    }

    #[test]
    fn bad_playback_mode_errors_at_read_time() {
        let content = "(\n    playbackMode = \"sometimes\"\n)\n";
        let mut reader = Reader::new(ReaderConfig::default());
        let err = reader.read(LoadState::Toplevel, content);
        assert!(matches!(err, Err(ReaderError::UnknownEnumToken { .. })));
    }
}
