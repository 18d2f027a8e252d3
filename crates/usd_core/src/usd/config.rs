//! Reader configuration (spec.md §6).

use serde::{Deserialize, Serialize};

/// Resource limits and behavior switches for a `Reader`.
///
/// `num_threads` is advisory only (spec.md §5): it is reserved for a future
/// binary-crate decoder and is never read by the USDA path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderConfig {
    pub num_threads: i32,
    pub max_prim_nest_level: usize,
    pub max_field_value_pairs: usize,
    pub max_token_length: usize,
    pub max_string_length: usize,
    pub max_element_size: usize,
    pub max_allowed_memory_in_mb: usize,
    pub allow_unknown_prims: bool,
    pub allow_unknown_api_schemas: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            num_threads: -1,
            max_prim_nest_level: 256,
            max_field_value_pairs: 4096,
            max_token_length: 4096,
            max_string_length: 64 * 1024 * 1024,
            max_element_size: 512,
            max_allowed_memory_in_mb: 16384,
            allow_unknown_prims: true,
            allow_unknown_api_schemas: true,
        }
    }
}

impl ReaderConfig {
    pub fn max_allowed_memory_bytes(&self) -> usize {
        self.max_allowed_memory_in_mb.saturating_mul(1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.num_threads, -1);
        assert_eq!(cfg.max_prim_nest_level, 256);
        assert_eq!(cfg.max_field_value_pairs, 4096);
        assert_eq!(cfg.max_token_length, 4096);
        assert_eq!(cfg.max_string_length, 64 * 1024 * 1024);
        assert_eq!(cfg.max_element_size, 512);
        assert_eq!(cfg.max_allowed_memory_in_mb, 16384);
        assert!(cfg.allow_unknown_prims);
        assert!(cfg.allow_unknown_api_schemas);
    }
}
