//! Bottom-up reconstruction (spec.md §4.7, §4.8): turns a flat
//! `PrimNodeStore`/`PrimSpecStore` into the typed `Stage`/`Layer` tree.
//!
//! Runs bottom-up (children before parents) because a parent's `Prim`
//! value embeds its children by value; there is no way to attach a child
//! after its parent has been built.

use std::collections::BTreeMap;

use crate::usd::error::{Diagnostics, ReaderError, ReaderResult};
use crate::usd::prim::{Prim, PrimSpec, VariantSetResult};
use crate::usd::schema::reconstruct_prim;
use crate::usd::store::{NodeIndex, PrimNode, PrimNodeStore, PrimSpecStore};

/// Build the typed `Prim` tree for every root in `store`, assigning
/// pre-order ids and absolute paths as it goes.
pub fn construct_prim_tree(
    store: &PrimNodeStore,
    allow_unknown_prims: bool,
    diags: &mut Diagnostics,
) -> ReaderResult<Vec<Prim>> {
    let mut next_id = 0u32;
    let mut roots = Vec::new();
    for idx in store.roots() {
        roots.push(build_prim(store, idx, "", allow_unknown_prims, &mut next_id, diags)?);
    }
    Ok(roots)
}

fn build_prim(
    store: &PrimNodeStore,
    idx: NodeIndex,
    parent_path: &str,
    allow_unknown_prims: bool,
    next_id: &mut u32,
    diags: &mut Diagnostics,
) -> ReaderResult<Prim> {
    let node = store.get(idx)?;
    let path = crate::usd::path::Path::append(parent_path, &node.name);

    // Pre-order: this node's id is reserved before descending into its
    // children/variants (spec.md §4.7, §8 — "a stable id equal to its
    // position in a pre-order traversal").
    let id = *next_id;
    *next_id += 1;

    let payload = match &node.type_name {
        Some(type_name) => match reconstruct_prim(type_name, &node.properties) {
            Ok(p) => p,
            Err(ReaderError::UnknownPrimType { type_name }) => {
                if allow_unknown_prims {
                    diags.warn(format!("[USDA] unknown prim type '{type_name}' at '{path}', falling back to Model"));
                    crate::usd::prim::PrimPayload::Model
                } else {
                    return Err(ReaderError::UnknownPrimType { type_name });
                }
            }
            Err(e) => return Err(e),
        },
        None => crate::usd::prim::PrimPayload::Model,
    };

    // Ordinary children (skips anything spliced exclusively into a variant;
    // `allocate_in_variant` never adds to `children`, so this list is
    // already "not in any variant" per spec.md §4.7).
    let mut children = Vec::with_capacity(node.children.len());
    for &child_idx in &node.children {
        children.push(build_prim(store, child_idx, &path, allow_unknown_prims, next_id, diags)?);
    }

    let variant_sets = build_variant_sets(store, node, &path, allow_unknown_prims, next_id, diags)?;

    Ok(Prim {
        id,
        name: node.name.clone(),
        path,
        specifier: node.specifier,
        prim_type_name: node.type_name.clone(),
        meta: node.meta.clone(),
        properties: node.properties.clone(),
        payload,
        children,
        variant_sets,
    })
}

fn build_variant_sets(
    store: &PrimNodeStore,
    node: &PrimNode,
    path: &str,
    allow_unknown_prims: bool,
    next_id: &mut u32,
    diags: &mut Diagnostics,
) -> ReaderResult<BTreeMap<String, VariantSetResult>> {
    let mut out = BTreeMap::new();

    for (vs_name, variants) in &node.variant_node_map {
        let mut seen_indices = std::collections::HashSet::new();
        let mut result = VariantSetResult {
            selected_variant: node.meta.variants.get(vs_name).cloned(),
            variants: BTreeMap::new(),
        };

        for (variant_name, variant_node) in variants {
            let mut children = Vec::with_capacity(variant_node.prim_children.len());
            for &child_idx in &variant_node.prim_children {
                // Duplicate-child detection (spec.md §4.7 edge case): the
                // same store index must not appear twice across variants
                // of the same variant set.
                if !seen_indices.insert(child_idx) {
                    return Err(ReaderError::DuplicateVariantChild {
                        variant_set: vs_name.clone(),
                        index: child_idx,
                    });
                }
                children.push(build_prim(store, child_idx, path, allow_unknown_prims, next_id, diags)?);
            }
            result.variants.insert(variant_name.clone(), children);
        }

        out.insert(vs_name.clone(), result);
    }

    Ok(out)
}

/// Build an untyped `PrimSpec` tree from a `PrimSpecStore` (spec.md §4.8).
/// No schema reconstruction happens here — this is the composition-arc path.
pub fn construct_prim_spec_tree(store: &PrimSpecStore) -> ReaderResult<Vec<PrimSpec>> {
    let mut roots = Vec::new();
    for idx in store.roots() {
        roots.push(build_prim_spec(store, idx)?);
    }
    Ok(roots)
}

fn build_prim_spec(store: &PrimSpecStore, idx: NodeIndex) -> ReaderResult<PrimSpec> {
    let node = store.get(idx)?;
    let mut children = Vec::with_capacity(node.children.len());
    for &child_idx in &node.children {
        children.push(build_prim_spec(store, child_idx)?);
    }
    Ok(PrimSpec {
        name: node.name.clone(),
        specifier: node.specifier,
        type_name: node.type_name.clone(),
        meta: node.meta.clone(),
        properties: node.properties.clone(),
        children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usd::path::Specifier;

    #[test]
    fn builds_single_root_with_preorder_ids() {
        let mut store = PrimNodeStore::new();
        let root = store.allocate("World", Specifier::Def, None).unwrap();
        store.allocate("Child", Specifier::Def, Some(root)).unwrap();

        let mut diags = Diagnostics::default();
        let roots = construct_prim_tree(&store, true, &mut diags).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, "/World");
        assert_eq!(roots[0].children[0].path, "/World/Child");
        // Pre-order: the root is visited (and assigned an id) before its
        // children, so it gets the lower id.
        assert_eq!(roots[0].id, 0);
        assert_eq!(roots[0].children[0].id, 1);
    }

    #[test]
    fn unknown_type_falls_back_to_model_with_warning() {
        let mut store = PrimNodeStore::new();
        let idx = store.allocate("Thing", Specifier::Def, None).unwrap();
        store.get_mut(idx).unwrap().type_name = Some("TotallyCustomSchema".to_string());

        let mut diags = Diagnostics::default();
        let roots = construct_prim_tree(&store, true, &mut diags).unwrap();
        assert!(matches!(roots[0].payload, crate::usd::prim::PrimPayload::Model));
        assert_eq!(diags.warnings.len(), 1);
    }

    #[test]
    fn unknown_type_errors_when_disallowed() {
        let mut store = PrimNodeStore::new();
        let idx = store.allocate("Thing", Specifier::Def, None).unwrap();
        store.get_mut(idx).unwrap().type_name = Some("TotallyCustomSchema".to_string());

        let mut diags = Diagnostics::default();
        let err = construct_prim_tree(&store, false, &mut diags);
        assert!(err.is_err());
    }

    #[test]
    fn duplicate_variant_child_index_errors() {
        let mut store = PrimNodeStore::new();
        let root = store.allocate("World", Specifier::Def, None).unwrap();
        let shared = store
            .allocate_in_variant("Geo", Specifier::Def, root, "shadingVariant", "red")
            .unwrap();
        // Manually register the same index under a second variant to
        // simulate the duplicate case (the lexer never does this itself).
        store
            .get_mut(root)
            .unwrap()
            .variant_node_map
            .get_mut("shadingVariant")
            .unwrap()
            .entry("blue".to_string())
            .or_default()
            .prim_children
            .push(shared);

        let mut diags = Diagnostics::default();
        let err = construct_prim_tree(&store, true, &mut diags);
        assert!(matches!(err, Err(ReaderError::DuplicateVariantChild { .. })));
    }
}
