//! `PrimNode`/`PrimSpecNode` arenas (spec.md §4.2, §4.4): flat,
//! index-addressed stores of partially-reconstructed prims, built while the
//! lexer is still scanning and consumed afterward by the bottom-up
//! reconstruction pass.
//!
//! An index-addressed Vec is used instead of a pointer graph because a
//! child's parent index is known (the parser assigns it depth-first) before
//! the child's own body has been parsed — a plain tree of `Rc<RefCell<..>>`
//! would need interior mutability at every level for no benefit.

use std::collections::BTreeMap;

use crate::usd::error::{ReaderError, ReaderResult};
use crate::usd::meta::PrimMeta;
use crate::usd::path::Specifier;
use crate::usd::value::PropertyMap;

/// Index into a `PrimNodeStore`. `None` parent means "child of the pseudo-root".
pub type NodeIndex = u32;

/// One variant inside a `variantSet` block, keyed by variant name.
#[derive(Clone, Debug, Default)]
pub struct VariantNode {
    pub meta: PrimMeta,
    pub properties: PropertyMap,
    /// Indices into the owning `PrimNodeStore`, in authored order.
    pub prim_children: Vec<NodeIndex>,
}

/// A partially-reconstructed prim: known identity and raw properties, but
/// children are still indices (not yet linked into a tree) and the typed
/// `PrimPayload` has not yet been built from `properties`.
#[derive(Clone, Debug)]
pub struct PrimNode {
    pub name: String,
    pub specifier: Specifier,
    pub type_name: Option<String>,
    pub meta: PrimMeta,
    pub properties: PropertyMap,
    pub parent: Option<NodeIndex>,
    /// Set when this node was declared inside a `variantSet` block rather
    /// than as an ordinary child; reconstruction splices it exclusively
    /// into the variant and never into `children` (spec.md §4.7).
    pub parent_is_variant: Option<(NodeIndex, String, String)>,
    pub children: Vec<NodeIndex>,
    /// variantSet name -> variant name -> VariantNode
    pub variant_node_map: BTreeMap<String, BTreeMap<String, VariantNode>>,
}

impl PrimNode {
    fn new(name: impl Into<String>, specifier: Specifier, parent: Option<NodeIndex>) -> Self {
        Self {
            name: name.into(),
            specifier,
            type_name: None,
            meta: PrimMeta::default(),
            properties: PropertyMap::new(),
            parent,
            parent_is_variant: None,
            children: Vec::new(),
            variant_node_map: BTreeMap::new(),
        }
    }
}

/// Flat arena of `PrimNode`s, built depth-first by the lexer/reader as it
/// walks a `def`/`over`/`class` block (spec.md §4.2).
#[derive(Clone, Debug, Default)]
pub struct PrimNodeStore {
    nodes: Vec<PrimNode>,
}

impl PrimNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new node and, if it has a parent, register it in the
    /// parent's `children` list. Returns the new node's index.
    pub fn allocate(&mut self, name: impl Into<String>, specifier: Specifier, parent: Option<NodeIndex>) -> ReaderResult<NodeIndex> {
        if let Some(p) = parent {
            self.get(p)?;
        }
        let idx = self.nodes.len() as NodeIndex;
        self.nodes.push(PrimNode::new(name, specifier, parent));
        if let Some(p) = parent {
            self.nodes[p as usize].children.push(idx);
        }
        Ok(idx)
    }

    /// Allocate a node that lives inside a variant, registering it in the
    /// owning node's `variant_node_map` rather than its `children`.
    pub fn allocate_in_variant(
        &mut self,
        name: impl Into<String>,
        specifier: Specifier,
        owner: NodeIndex,
        variant_set: impl Into<String>,
        variant: impl Into<String>,
    ) -> ReaderResult<NodeIndex> {
        self.get(owner)?;
        let idx = self.nodes.len() as NodeIndex;
        let variant_set = variant_set.into();
        let variant = variant.into();
        let mut node = PrimNode::new(name, specifier, Some(owner));
        node.parent_is_variant = Some((owner, variant_set.clone(), variant.clone()));
        self.nodes.push(node);

        let owner_node = &mut self.nodes[owner as usize];
        owner_node
            .variant_node_map
            .entry(variant_set)
            .or_default()
            .entry(variant)
            .or_default()
            .prim_children
            .push(idx);
        Ok(idx)
    }

    pub fn get(&self, idx: NodeIndex) -> ReaderResult<&PrimNode> {
        self.nodes.get(idx as usize).ok_or(ReaderError::IndexOutOfRange {
            index: idx,
            size: self.nodes.len(),
        })
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> ReaderResult<&mut PrimNode> {
        let size = self.nodes.len();
        self.nodes
            .get_mut(idx as usize)
            .ok_or(ReaderError::IndexOutOfRange { index: idx, size })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root-level nodes: those with no parent.
    pub fn roots(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| i as NodeIndex)
            .collect()
    }
}

/// The untyped counterpart of `PrimNode`, used by the composition-arc /
/// `GetAsLayer` path (spec.md §4.8) where no typed reconstruction happens.
#[derive(Clone, Debug)]
pub struct PrimSpecNode {
    pub name: String,
    pub specifier: Specifier,
    pub type_name: Option<String>,
    pub meta: PrimMeta,
    pub properties: PropertyMap,
    pub parent: Option<NodeIndex>,
    pub children: Vec<NodeIndex>,
}

impl PrimSpecNode {
    fn new(name: impl Into<String>, specifier: Specifier, parent: Option<NodeIndex>) -> Self {
        Self {
            name: name.into(),
            specifier,
            type_name: None,
            meta: PrimMeta::default(),
            properties: PropertyMap::new(),
            parent,
            children: Vec::new(),
        }
    }
}

/// Arena for the untyped `PrimSpec` path. A `Reader` invalidates this store
/// after a single `GetAsLayer` call succeeds (spec.md §4.8: one-shot use),
/// tracked by `consumed`.
#[derive(Clone, Debug, Default)]
pub struct PrimSpecStore {
    nodes: Vec<PrimSpecNode>,
    consumed: bool,
}

impl PrimSpecStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, name: impl Into<String>, specifier: Specifier, parent: Option<NodeIndex>) -> ReaderResult<NodeIndex> {
        if let Some(p) = parent {
            self.get(p)?;
        }
        let idx = self.nodes.len() as NodeIndex;
        self.nodes.push(PrimSpecNode::new(name, specifier, parent));
        if let Some(p) = parent {
            self.nodes[p as usize].children.push(idx);
        }
        Ok(idx)
    }

    pub fn get(&self, idx: NodeIndex) -> ReaderResult<&PrimSpecNode> {
        self.nodes.get(idx as usize).ok_or(ReaderError::IndexOutOfRange {
            index: idx,
            size: self.nodes.len(),
        })
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> ReaderResult<&mut PrimSpecNode> {
        let size = self.nodes.len();
        self.nodes
            .get_mut(idx as usize)
            .ok_or(ReaderError::IndexOutOfRange { index: idx, size })
    }

    pub fn roots(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| i as NodeIndex)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Marks this store as consumed. Subsequent `GetAsLayer` calls must
    /// observe `is_consumed() == true` and return a `StateViolation`.
    pub fn mark_consumed(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_links_parent_child() {
        let mut store = PrimNodeStore::new();
        let root = store.allocate("World", Specifier::Def, None).unwrap();
        let child = store.allocate("Cube", Specifier::Def, Some(root)).unwrap();
        assert_eq!(store.get(root).unwrap().children, vec![child]);
        assert_eq!(store.get(child).unwrap().parent, Some(root));
    }

    #[test]
    fn allocate_in_variant_does_not_touch_children() {
        let mut store = PrimNodeStore::new();
        let root = store.allocate("World", Specifier::Def, None).unwrap();
        let vchild = store
            .allocate_in_variant("Geo", Specifier::Def, root, "shadingVariant", "red")
            .unwrap();
        assert!(store.get(root).unwrap().children.is_empty());
        let vmap = &store.get(root).unwrap().variant_node_map;
        assert_eq!(vmap["shadingVariant"]["red"].prim_children, vec![vchild]);
    }

    #[test]
    fn out_of_range_index_errors() {
        let store = PrimNodeStore::new();
        assert!(matches!(store.get(0), Err(ReaderError::IndexOutOfRange { .. })));
    }
}
