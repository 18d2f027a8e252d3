//! `PrimMetaDecoder` (spec.md §4.3): maps a raw metadata map to a structured
//! `PrimMeta`, validating the closed set of known keys.

use std::collections::BTreeMap;

use crate::usd::error::{ReaderError, ReaderResult};
use crate::usd::path::ListEditQualifier;
use crate::usd::prim::StageMeta;
use crate::usd::value::{PropertyValue, RawMetaEntry, RawMetaMap, Reference};

/// `kind` enum, spec.md §3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Subcomponent,
    Component,
    Model,
    Group,
    Assembly,
    SceneLibrary,
}

impl Kind {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "subcomponent" => Some(Kind::Subcomponent),
            "component" => Some(Kind::Component),
            "model" => Some(Kind::Model),
            "group" => Some(Kind::Group),
            "assembly" => Some(Kind::Assembly),
            "sceneLibrary" => Some(Kind::SceneLibrary),
            _ => None,
        }
    }
}

/// `playbackMode`, spec.md §3 and Open Question (c): only these two tokens
/// are accepted, everything else is `UnknownEnumToken`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum PlaybackMode {
    #[default]
    None,
    Loop,
}

impl PlaybackMode {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "none" => Some(PlaybackMode::None),
            "loop" => Some(PlaybackMode::Loop),
            _ => None,
        }
    }
}

/// A single `apiSchemas` list entry: API name + optional instance name.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiSchemaEntry {
    pub name: String,
    pub instance_name: Option<String>,
}

/// The closed set of API schema names this reader recognizes.
const KNOWN_API_SCHEMAS: &[&str] = &[
    "CollectionAPI",
    "MaterialBindingAPI",
    "GeomModelAPI",
    "PhysicsRigidBodyAPI",
    "SkelBindingAPI",
];

/// Structured metadata recognized by the reader (spec.md §3).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimMeta {
    pub active: Option<bool>,
    pub hidden: Option<bool>,
    pub kind: Option<Kind>,
    pub scene_name: Option<String>,
    pub display_name: Option<String>,
    pub custom_data: BTreeMap<String, PropertyValue>,
    pub asset_info: BTreeMap<String, PropertyValue>,
    pub variants: BTreeMap<String, String>,
    pub inherits: (Vec<String>, ListEditQualifier),
    pub specializes: (Vec<String>, ListEditQualifier),
    pub variant_sets: (Vec<String>, ListEditQualifier),
    pub api_schemas: (Vec<ApiSchemaEntry>, ListEditQualifier),
    pub references: (Vec<Reference>, ListEditQualifier),
    pub payload: (Vec<Reference>, ListEditQualifier),
    pub comment: Option<String>,
}

impl PrimMeta {
    fn is_default_kind() -> Kind {
        Kind::Component
    }
}

/// Decode a raw metadata map into a `PrimMeta`, per spec.md §4.3's rules.
///
/// Returns `Ok` with any unknown-key warnings pushed to `warnings`; returns
/// `Err` on the first hard type/enum/qualifier violation (spec.md §7:
/// these are fatal per-Prim errors, not warnings).
///
/// `allow_unknown_api_schemas` gates the `apiSchemas` behavior in §6: when
/// `true`, an unrecognized API name is dropped with a warning; when
/// `false`, it is a hard `UnknownApiSchema` error.
pub fn decode_prim_meta(
    raw: &RawMetaMap,
    warnings: &mut Vec<String>,
    allow_unknown_api_schemas: bool,
) -> ReaderResult<PrimMeta> {
    let mut meta = PrimMeta::default();
    let _ = PrimMeta::is_default_kind; // silence unused-assoc-fn lint; kept for docs

    for entry in raw {
        decode_one(entry, &mut meta, warnings, allow_unknown_api_schemas)?;
    }

    Ok(meta)
}

fn decode_one(
    entry: &RawMetaEntry,
    meta: &mut PrimMeta,
    warnings: &mut Vec<String>,
    allow_unknown_api_schemas: bool,
) -> ReaderResult<()> {
    let RawMetaEntry { key, qualifier, value } = entry;

    match key.as_str() {
        "active" => meta.active = Some(expect_bool(key, value)?),
        "hidden" => meta.hidden = Some(expect_bool(key, value)?),
        "kind" => {
            let token = expect_token(key, value)?;
            meta.kind = Some(Kind::parse(token).ok_or_else(|| ReaderError::UnknownEnumToken {
                field: "kind".to_string(),
                token: token.to_string(),
            })?);
        }
        "sceneName" => meta.scene_name = Some(expect_string(key, value)?.to_string()),
        "displayName" => meta.display_name = Some(expect_string(key, value)?.to_string()),
        "customData" => meta.custom_data = expect_dict(key, value)?,
        "assetInfo" => meta.asset_info = expect_dict(key, value)?,
        "variants" => {
            let dict = expect_dict(key, value)?;
            for (vs_name, v) in dict {
                let s = v.as_str().ok_or_else(|| ReaderError::InvalidMetadataType {
                    key: format!("variants.{vs_name}"),
                    expected: "string".to_string(),
                    observed: v.type_name().to_string(),
                })?;
                meta.variants.insert(vs_name, s.to_string());
            }
        }
        "inherits" => meta.inherits = (expect_path_list(key, value)?, *qualifier),
        "specializes" => meta.specializes = (expect_path_list(key, value)?, *qualifier),
        "variantSets" => meta.variant_sets = (expect_string_list(key, value)?, *qualifier),
        "apiSchemas" => {
            if !matches!(qualifier, ListEditQualifier::Prepend | ListEditQualifier::Explicit) {
                return Err(ReaderError::InvalidListEditQualifier {
                    key: key.clone(),
                    qualifier: format!("{qualifier:?}"),
                });
            }
            let names = expect_string_list(key, value)?;
            let mut entries = Vec::new();
            for name in names {
                let (schema, instance) = match name.split_once(':') {
                    Some((a, b)) => (a.to_string(), Some(b.to_string())),
                    None => (name.clone(), None),
                };
                if KNOWN_API_SCHEMAS.contains(&schema.as_str()) {
                    entries.push(ApiSchemaEntry {
                        name: schema,
                        instance_name: instance,
                    });
                } else if allow_unknown_api_schemas {
                    warnings.push(format!("[USDA] unknown API schema '{schema}' (dropped)"));
                } else {
                    return Err(ReaderError::UnknownApiSchema { name: schema });
                }
            }
            meta.api_schemas = (entries, *qualifier);
        }
        "references" => meta.references = (expect_reference_list(key, value)?, *qualifier),
        "payload" => meta.payload = (expect_reference_list(key, value)?, *qualifier),
        "comment" => meta.comment = Some(expect_string(key, value)?.to_string()),
        other => {
            warnings.push(format!("[USDA] unknown metadata key '{other}' (ignored)"));
        }
    }

    Ok(())
}

fn expect_bool(key: &str, value: &PropertyValue) -> ReaderResult<bool> {
    value.as_bool().ok_or_else(|| ReaderError::InvalidMetadataType {
        key: key.to_string(),
        expected: "bool".to_string(),
        observed: value.type_name().to_string(),
    })
}

fn expect_token<'a>(key: &str, value: &'a PropertyValue) -> ReaderResult<&'a str> {
    value.as_str().ok_or_else(|| ReaderError::InvalidMetadataType {
        key: key.to_string(),
        expected: "token".to_string(),
        observed: value.type_name().to_string(),
    })
}

fn expect_string<'a>(key: &str, value: &'a PropertyValue) -> ReaderResult<&'a str> {
    value.as_str().ok_or_else(|| ReaderError::InvalidMetadataType {
        key: key.to_string(),
        expected: "string".to_string(),
        observed: value.type_name().to_string(),
    })
}

fn expect_dict(key: &str, value: &PropertyValue) -> ReaderResult<BTreeMap<String, PropertyValue>> {
    match value {
        PropertyValue::Dict(d) => Ok(d.clone()),
        other => Err(ReaderError::InvalidMetadataType {
            key: key.to_string(),
            expected: "dictionary".to_string(),
            observed: other.type_name().to_string(),
        }),
    }
}

fn expect_string_list(key: &str, value: &PropertyValue) -> ReaderResult<Vec<String>> {
    match value {
        PropertyValue::StringArray(v) => Ok(v.clone()),
        PropertyValue::String(s) | PropertyValue::Token(s) => Ok(vec![s.clone()]),
        other => Err(ReaderError::InvalidMetadataType {
            key: key.to_string(),
            expected: "string[]".to_string(),
            observed: other.type_name().to_string(),
        }),
    }
}

fn expect_path_list(key: &str, value: &PropertyValue) -> ReaderResult<Vec<String>> {
    match value {
        PropertyValue::PathArray(v) => Ok(v.clone()),
        PropertyValue::Path(p) => Ok(vec![p.clone()]),
        other => Err(ReaderError::InvalidMetadataType {
            key: key.to_string(),
            expected: "path[]".to_string(),
            observed: other.type_name().to_string(),
        }),
    }
}

/// `references`/`payload`: accept a single Reference, a list, or a blocked
/// marker (→ empty list), per spec.md §3 & §4.3.
fn expect_reference_list(key: &str, value: &PropertyValue) -> ReaderResult<Vec<Reference>> {
    match value {
        PropertyValue::Blocked => Ok(Vec::new()),
        PropertyValue::Path(p) => Ok(vec![Reference {
            asset_path: p.clone(),
            ..Default::default()
        }]),
        PropertyValue::PathArray(v) => Ok(v
            .iter()
            .map(|p| Reference {
                asset_path: p.clone(),
                ..Default::default()
            })
            .collect()),
        other => Err(ReaderError::InvalidMetadataType {
            key: key.to_string(),
            expected: "reference or reference[]".to_string(),
            observed: other.type_name().to_string(),
        }),
    }
}

/// Validate a `playbackMode` token, used by the stage-metadata callback
/// (spec.md §4.6). Separate from `decode_prim_meta` because it is a
/// stage-level, not Prim-level, field.
pub fn parse_playback_mode(token: &str) -> Option<PlaybackMode> {
    PlaybackMode::parse(token)
}

fn expect_f64(key: &str, value: &PropertyValue) -> ReaderResult<f64> {
    value.as_f64().ok_or_else(|| ReaderError::InvalidMetadataType {
        key: key.to_string(),
        expected: "number".to_string(),
        observed: value.type_name().to_string(),
    })
}

/// Decode the closed set of stage-scope metadata keys (spec.md §3, §4.6)
/// into a `StageMeta`. This is a distinct decoder from `decode_prim_meta`:
/// the two key sets only partly overlap (`comment` is shared; `kind`,
/// `active`, `references`, ... are Prim-only, while `upAxis`,
/// `subLayers`, ... are stage-only), so dispatching stage text through the
/// Prim decoder would silently drop every stage-only key as "unknown".
pub fn decode_stage_meta(raw: &RawMetaMap, warnings: &mut Vec<String>) -> ReaderResult<StageMeta> {
    let mut meta = StageMeta::default();
    for entry in raw {
        decode_stage_one(entry, &mut meta, warnings)?;
    }
    Ok(meta)
}

fn decode_stage_one(entry: &RawMetaEntry, meta: &mut StageMeta, warnings: &mut Vec<String>) -> ReaderResult<()> {
    let RawMetaEntry { key, value, .. } = entry;

    match key.as_str() {
        "doc" => meta.doc = Some(expect_string(key, value)?.to_string()),
        "comment" => meta.comment = Some(expect_string(key, value)?.to_string()),
        "upAxis" => {
            let token = expect_token(key, value)?;
            let axis = token.chars().next().filter(|c| matches!(c, 'X' | 'Y' | 'Z'));
            meta.up_axis = Some(axis.ok_or_else(|| ReaderError::UnknownEnumToken {
                field: "upAxis".to_string(),
                token: token.to_string(),
            })?);
        }
        "subLayers" => meta.sub_layers = expect_string_list(key, value)?,
        "defaultPrim" => meta.default_prim = Some(expect_token(key, value)?.to_string()),
        "metersPerUnit" => meta.meters_per_unit = Some(expect_f64(key, value)?),
        "timeCodesPerSecond" => meta.time_codes_per_second = Some(expect_f64(key, value)?),
        "startTimeCode" => meta.start_time_code = Some(expect_f64(key, value)?),
        "endTimeCode" => meta.end_time_code = Some(expect_f64(key, value)?),
        "framesPerSecond" => meta.frames_per_second = Some(expect_f64(key, value)?),
        "autoPlay" => meta.auto_play = Some(expect_bool(key, value)?),
        "playbackMode" => {
            let token = expect_token(key, value)?;
            meta.playback_mode = Some(parse_playback_mode(token).ok_or_else(|| ReaderError::UnknownEnumToken {
                field: "playbackMode".to_string(),
                token: token.to_string(),
            })?);
        }
        "customLayerData" => meta.custom_layer_data = expect_dict(key, value)?,
        other => {
            warnings.push(format!("[USDA] unknown stage metadata key '{other}' (ignored)"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usd::path::ListEditQualifier;

    fn entry(key: &str, value: PropertyValue) -> RawMetaEntry {
        RawMetaEntry {
            key: key.to_string(),
            qualifier: ListEditQualifier::Explicit,
            value,
        }
    }

    #[test]
    fn decodes_known_scalar_fields() {
        let raw = vec![
            entry("active", PropertyValue::Bool(false)),
            entry("hidden", PropertyValue::Bool(true)),
            entry("kind", PropertyValue::Token("component".to_string())),
            entry("displayName", PropertyValue::String("Foo".to_string())),
        ];
        let mut warnings = Vec::new();
        let meta = decode_prim_meta(&raw, &mut warnings, true).unwrap();
        assert_eq!(meta.active, Some(false));
        assert_eq!(meta.hidden, Some(true));
        assert_eq!(meta.kind, Some(Kind::Component));
        assert_eq!(meta.display_name.as_deref(), Some("Foo"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_kind_token_errors() {
        let raw = vec![entry("kind", PropertyValue::Token("bogus".to_string()))];
        let mut warnings = Vec::new();
        let err = decode_prim_meta(&raw, &mut warnings, true).unwrap_err();
        assert!(matches!(err, ReaderError::UnknownEnumToken { .. }));
    }

    #[test]
    fn unknown_key_is_warning_not_error() {
        let raw = vec![entry("totallyMadeUp", PropertyValue::Bool(true))];
        let mut warnings = Vec::new();
        let meta = decode_prim_meta(&raw, &mut warnings, true).unwrap();
        assert_eq!(meta.active, None);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn api_schemas_rejects_append_qualifier() {
        let raw = vec![RawMetaEntry {
            key: "apiSchemas".to_string(),
            qualifier: ListEditQualifier::Append,
            value: PropertyValue::StringArray(vec!["CollectionAPI".to_string()]),
        }];
        let mut warnings = Vec::new();
        let err = decode_prim_meta(&raw, &mut warnings, true).unwrap_err();
        assert!(matches!(err, ReaderError::InvalidListEditQualifier { .. }));
    }

    #[test]
    fn api_schemas_drops_unknown_names_with_warning() {
        let raw = vec![RawMetaEntry {
            key: "apiSchemas".to_string(),
            qualifier: ListEditQualifier::Prepend,
            value: PropertyValue::StringArray(vec![
                "CollectionAPI".to_string(),
                "BogusAPI".to_string(),
            ]),
        }];
        let mut warnings = Vec::new();
        let meta = decode_prim_meta(&raw, &mut warnings, true).unwrap();
        assert_eq!(meta.api_schemas.0.len(), 1);
        assert_eq!(meta.api_schemas.0[0].name, "CollectionAPI");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn api_schemas_errors_on_unknown_name_when_disallowed() {
        let raw = vec![RawMetaEntry {
            key: "apiSchemas".to_string(),
            qualifier: ListEditQualifier::Prepend,
            value: PropertyValue::StringArray(vec!["BogusAPI".to_string()]),
        }];
        let mut warnings = Vec::new();
        let err = decode_prim_meta(&raw, &mut warnings, false).unwrap_err();
        assert!(matches!(err, ReaderError::UnknownApiSchema { name } if name == "BogusAPI"));
    }

    #[test]
    fn references_blocked_yields_empty_list() {
        let raw = vec![entry("references", PropertyValue::Blocked)];
        let mut warnings = Vec::new();
        let meta = decode_prim_meta(&raw, &mut warnings, true).unwrap();
        assert!(meta.references.0.is_empty());
    }

    #[test]
    fn references_single_value_promoted_to_list() {
        let raw = vec![entry(
            "references",
            PropertyValue::Path("./lucy.usda</Lucy>".to_string()),
        )];
        let mut warnings = Vec::new();
        let meta = decode_prim_meta(&raw, &mut warnings, true).unwrap();
        assert_eq!(meta.references.0.len(), 1);
    }

    #[test]
    fn decodes_stage_metadata_closed_set() {
        let raw = vec![
            entry("doc", PropertyValue::String("A scene".to_string())),
            entry("upAxis", PropertyValue::Token("Y".to_string())),
            entry(
                "subLayers",
                PropertyValue::StringArray(vec!["base.usda".to_string()]),
            ),
            entry("defaultPrim", PropertyValue::Token("World".to_string())),
            entry("metersPerUnit", PropertyValue::Float(0.01)),
            entry("timeCodesPerSecond", PropertyValue::Float(24.0)),
            entry("startTimeCode", PropertyValue::Float(1.0)),
            entry("endTimeCode", PropertyValue::Float(48.0)),
            entry("framesPerSecond", PropertyValue::Float(24.0)),
            entry("autoPlay", PropertyValue::Bool(true)),
            entry("playbackMode", PropertyValue::Token("loop".to_string())),
        ];
        let mut warnings = Vec::new();
        let meta = decode_stage_meta(&raw, &mut warnings).unwrap();
        assert_eq!(meta.doc.as_deref(), Some("A scene"));
        assert_eq!(meta.up_axis, Some('Y'));
        assert_eq!(meta.sub_layers, vec!["base.usda".to_string()]);
        assert_eq!(meta.default_prim.as_deref(), Some("World"));
        assert_eq!(meta.meters_per_unit, Some(0.01));
        assert_eq!(meta.time_codes_per_second, Some(24.0));
        assert_eq!(meta.start_time_code, Some(1.0));
        assert_eq!(meta.end_time_code, Some(48.0));
        assert_eq!(meta.frames_per_second, Some(24.0));
        assert_eq!(meta.auto_play, Some(true));
        assert_eq!(meta.playback_mode, Some(PlaybackMode::Loop));
        assert!(warnings.is_empty());
    }

    #[test]
    fn bad_playback_mode_token_errors() {
        let raw = vec![entry("playbackMode", PropertyValue::Token("sometimes".to_string()))];
        let mut warnings = Vec::new();
        let err = decode_stage_meta(&raw, &mut warnings).unwrap_err();
        assert!(matches!(err, ReaderError::UnknownEnumToken { field, .. } if field == "playbackMode"));
    }

    #[test]
    fn unknown_stage_key_is_warning_not_error() {
        let raw = vec![entry("totallyMadeUp", PropertyValue::Bool(true))];
        let mut warnings = Vec::new();
        let meta = decode_stage_meta(&raw, &mut warnings).unwrap();
        assert_eq!(meta.doc, None);
        assert_eq!(warnings.len(), 1);
    }
}
