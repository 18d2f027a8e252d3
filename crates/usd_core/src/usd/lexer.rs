//! Line-based USDA scanner (spec.md §2: the grammar/tokenizer itself is out
//! of scope, but the reader still needs a real scanner to drive the
//! callback protocol in `reader.rs`).
//!
//! Generalizes the teacher's `UsdaParser` (parser.rs): a `VecDeque` of
//! `(line_number, text)` consumed front-to-back, with lookahead via
//! push-front, rather than a nom/pest grammar. This module handles only
//! structural recognition — `def`/`over`/`class` headers, metadata
//! parenthesis blocks, `variantSet` blocks, and attribute/relationship
//! lines — and hands typed reconstruction off to `schema.rs`.

use std::collections::VecDeque;

use crate::usd::config::ReaderConfig;
use crate::usd::error::{Diagnostics, ReaderError, ReaderResult};
use crate::usd::meta::decode_prim_meta;
use crate::usd::path::{ListEditQualifier, Specifier};
use crate::usd::store::{NodeIndex, PrimNodeStore, PrimSpecStore};
use crate::usd::value::{Property, PropertyValue, RawMetaEntry, RawMetaMap};

/// Stage/layer-level metadata plus any `subLayers`, decoded from the
/// document's leading `(...)` block (spec.md §4.6).
#[derive(Clone, Debug, Default)]
pub struct DocumentHeader {
    pub raw_meta: RawMetaMap,
}

/// Scans USDA text front-to-back, feeding a `PrimNodeStore` (typed path) or
/// `PrimSpecStore` (untyped/layer path).
pub struct Lexer<'cfg> {
    lines: VecDeque<(usize, String)>,
    config: &'cfg ReaderConfig,
}

impl<'cfg> Lexer<'cfg> {
    pub fn new(content: &str, config: &'cfg ReaderConfig) -> Self {
        let lines: VecDeque<_> = content
            .lines()
            .enumerate()
            .map(|(i, s)| (i + 1, s.to_string()))
            .collect();
        Self { lines, config }
    }

    fn next_significant(&mut self) -> Option<(usize, String)> {
        loop {
            let (num, line) = self.lines.pop_front()?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Some((num, line));
        }
    }

    fn push_back(&mut self, item: (usize, String)) {
        self.lines.push_front(item);
    }

    /// Whether `s`'s brackets/braces/parens (ignoring quoted text) are
    /// balanced — i.e. this looks like a complete statement rather than the
    /// first line of a multi-line array/dict literal.
    fn is_balanced(s: &str) -> bool {
        let mut depth = 0i32;
        let mut in_quotes = false;
        for c in s.chars() {
            match c {
                '"' => in_quotes = !in_quotes,
                '[' | '(' | '{' if !in_quotes => depth += 1,
                ']' | ')' | '}' if !in_quotes => depth -= 1,
                _ => {}
            }
        }
        depth <= 0
    }

    /// Join `first` with however many following lines are needed to
    /// balance its brackets, so array/dict literals spanning multiple
    /// lines (e.g. `float3[] points = [\n  (0,0,0),\n  ...\n]`) parse as a
    /// single statement.
    fn collect_statement(&mut self, first: String) -> String {
        let mut acc = first;
        while !Self::is_balanced(&acc) {
            match self.lines.pop_front() {
                Some((_, line)) => {
                    acc.push(' ');
                    acc.push_str(line.trim());
                }
                None => break,
            }
        }
        acc
    }

    /// Consume the document's leading `(...)` header block, if present.
    fn parse_header(&mut self, diags: &mut Diagnostics) -> ReaderResult<DocumentHeader> {
        let mut header = DocumentHeader::default();
        let Some((_, line)) = self.next_significant() else {
            return Ok(header);
        };
        let trimmed = line.trim();
        if !trimmed.starts_with('(') {
            self.push_back((0, line));
            return Ok(header);
        }
        if trimmed.ends_with(')') && trimmed.len() > 1 {
            header.raw_meta = self.parse_meta_body_single_line(&trimmed[1..trimmed.len() - 1])?;
            return Ok(header);
        }
        header.raw_meta = self.parse_meta_block(diags)?;
        Ok(header)
    }

    /// Parse metadata entries until a line equal to `)` is found.
    fn parse_meta_block(&mut self, diags: &mut Diagnostics) -> ReaderResult<RawMetaMap> {
        let mut entries = Vec::new();
        loop {
            let Some((line_num, line)) = self.next_significant() else {
                return Err(ReaderError::MalformedInput {
                    line: 0,
                    message: "unterminated metadata block".to_string(),
                });
            };
            let trimmed = line.trim().to_string();
            if trimmed == ")" {
                break;
            }
            let full = self.collect_statement(trimmed);
            match self.parse_meta_line(&full, line_num) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => diags.warn(e.to_string()),
            }
            if entries.len() > self.config.max_field_value_pairs {
                return Err(ReaderError::ResourceLimitExceeded {
                    limit: "maxFieldValuePairs",
                    value: entries.len(),
                    max: self.config.max_field_value_pairs,
                });
            }
        }
        Ok(entries)
    }

    fn parse_meta_body_single_line(&self, body: &str) -> ReaderResult<RawMetaMap> {
        let mut entries = Vec::new();
        for stmt in split_top_level(body, ',') {
            if let Some(entry) = self.parse_meta_line(stmt.trim(), 0)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Parse one `key = value` or `qualifier key = value` metadata statement.
    fn parse_meta_line(&self, line: &str, line_num: usize) -> ReaderResult<Option<RawMetaEntry>> {
        let line = line.trim().trim_end_matches(',').trim();
        if line.is_empty() {
            return Ok(None);
        }
        let Some(eq) = line.find('=') else {
            return Ok(None);
        };
        let (lhs, rhs) = (line[..eq].trim(), line[eq + 1..].trim());

        let mut words: Vec<&str> = lhs.split_whitespace().collect();
        let qualifier = if words.len() > 1 {
            let q = ListEditQualifier::parse(words[0]).ok_or_else(|| ReaderError::MalformedInput {
                line: line_num,
                message: format!("unknown list-edit qualifier '{}'", words[0]),
            })?;
            words.remove(0);
            q
        } else {
            ListEditQualifier::Explicit
        };
        let key = words.join(" ");
        if key.is_empty() {
            return Err(ReaderError::MalformedInput {
                line: line_num,
                message: "missing metadata key".to_string(),
            });
        }
        let value = parse_value_literal(rhs, self.config)?;
        Ok(Some(RawMetaEntry { key, qualifier, value }))
    }

    /// Parse a `def`/`over`/`class Type "Name"` header into its parts.
    fn parse_header_line(line: &str) -> Option<(Specifier, Option<String>, String)> {
        let mut words = line.trim().split_whitespace();
        let specifier = Specifier::parse(words.next()?)?;
        let rest = &line.trim()[specifier.to_string().len()..].trim_start();

        let quote_start = rest.find('"')?;
        let after = &rest[quote_start + 1..];
        let quote_end = after.find('"')?;
        let name = after[..quote_end].to_string();

        let before_name = rest[..quote_start].trim();
        let type_name = if before_name.is_empty() {
            None
        } else {
            Some(before_name.to_string())
        };

        Some((specifier, type_name, name))
    }

    /// Parse a `variantSet "name" = { ... }` header.
    fn parse_variant_set_header(line: &str) -> Option<String> {
        let rest = line.trim().strip_prefix("variantSet")?.trim_start();
        let quote_start = rest.find('"')?;
        let after = &rest[quote_start + 1..];
        let quote_end = after.find('"')?;
        Some(after[..quote_end].to_string())
    }

    /// Parse a `"variantName" { ... }` block header inside a variantSet body.
    fn parse_variant_name_header(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if !trimmed.starts_with('"') {
            return None;
        }
        let after = &trimmed[1..];
        let end = after.find('"')?;
        Some(after[..end].to_string())
    }

    /// Scan a top-level stage and populate `store` with `PrimNode`s.
    /// Returns the decoded document header for the stage-metadata callback.
    pub fn scan_stage(mut self, store: &mut PrimNodeStore, diags: &mut Diagnostics) -> ReaderResult<RawMetaMap> {
        let header = self.parse_header(diags)?;
        self.scan_body(None, 0, store, diags)?;
        Ok(header.raw_meta)
    }

    /// Scan a document as a `Layer` (untyped `PrimSpec` path, spec.md §4.8).
    pub fn scan_layer(mut self, store: &mut PrimSpecStore, diags: &mut Diagnostics) -> ReaderResult<RawMetaMap> {
        let header = self.parse_header(diags)?;
        self.scan_spec_body(None, 0, store, diags)?;
        Ok(header.raw_meta)
    }

    fn scan_body(
        &mut self,
        parent: Option<NodeIndex>,
        depth: usize,
        store: &mut PrimNodeStore,
        diags: &mut Diagnostics,
    ) -> ReaderResult<()> {
        if depth > self.config.max_prim_nest_level {
            return Err(ReaderError::ResourceLimitExceeded {
                limit: "maxPrimNestLevel",
                value: depth,
                max: self.config.max_prim_nest_level,
            });
        }

        loop {
            let Some((line_num, raw_line)) = self.next_significant() else {
                return Ok(());
            };
            let trimmed = raw_line.trim().to_string();

            if trimmed == "}" {
                return Ok(());
            }

            if trimmed.starts_with("def ") || trimmed.starts_with("over ") || trimmed.starts_with("class ") {
                let Some((specifier, type_name, name)) = Self::parse_header_line(&trimmed) else {
                    diags.warn(format!("[USDA] malformed prim header at line {line_num}"));
                    continue;
                };
                crate::usd::path::validate_element_name(&name).map_err(|reason| ReaderError::InvalidName {
                    name: name.clone(),
                    reason,
                })?;

                let idx = store.allocate(name, specifier, parent)?;
                self.consume_metadata_and_body(idx, type_name, depth, store, diags)?;
                continue;
            }

            if trimmed.starts_with("variantSet ") || trimmed.starts_with("variantSet\"") {
                let Some(parent_idx) = parent else {
                    diags.warn(format!("[USDA] variantSet outside any prim at line {line_num}"));
                    self.skip_balanced_block()?;
                    continue;
                };
                let Some(vs_name) = Self::parse_variant_set_header(&trimmed) else {
                    diags.warn(format!("[USDA] malformed variantSet header at line {line_num}"));
                    continue;
                };
                self.scan_variant_set_body(parent_idx, vs_name, depth, store, diags)?;
                continue;
            }

            // Attribute / relationship line, or something we don't model structurally.
            if let Some(parent_idx) = parent {
                let full = self.collect_statement(trimmed);
                if let Some((name, prop)) = self.parse_property_line(&full, line_num, diags)? {
                    store.get_mut(parent_idx)?.properties.insert(name, prop);
                }
            }
        }
    }

    fn scan_spec_body(
        &mut self,
        parent: Option<NodeIndex>,
        depth: usize,
        store: &mut PrimSpecStore,
        diags: &mut Diagnostics,
    ) -> ReaderResult<()> {
        if depth > self.config.max_prim_nest_level {
            return Err(ReaderError::ResourceLimitExceeded {
                limit: "maxPrimNestLevel",
                value: depth,
                max: self.config.max_prim_nest_level,
            });
        }

        loop {
            let Some((line_num, raw_line)) = self.next_significant() else {
                return Ok(());
            };
            let trimmed = raw_line.trim().to_string();

            if trimmed == "}" {
                return Ok(());
            }

            if trimmed.starts_with("def ") || trimmed.starts_with("over ") || trimmed.starts_with("class ") {
                let Some((specifier, type_name, name)) = Self::parse_header_line(&trimmed) else {
                    diags.warn(format!("[USDA] malformed prim header at line {line_num}"));
                    continue;
                };
                crate::usd::path::validate_element_name(&name).map_err(|reason| ReaderError::InvalidName {
                    name: name.clone(),
                    reason,
                })?;

                let idx = store.allocate(name, specifier, parent)?;
                if let Some(t) = type_name {
                    store.get_mut(idx)?.type_name = Some(t);
                }

                let next = self.next_significant();
                let opens_meta = matches!(&next, Some((_, l)) if l.trim().starts_with('('));
                if opens_meta {
                    let raw = self.parse_meta_block_or_single(next.unwrap().1.trim())?;
                    let mut warnings = Vec::new();
                    store.get_mut(idx)?.meta = decode_prim_meta(&raw, &mut warnings, self.config.allow_unknown_api_schemas)?;
                    for w in warnings {
                        diags.warn(w);
                    }
                } else if let Some(item) = next {
                    self.push_back(item);
                }

                if let Some((_, l)) = self.next_significant() {
                    if l.trim() == "{" {
                        self.scan_spec_body(Some(idx), depth + 1, store, diags)?;
                    } else {
                        self.push_back((0, l));
                    }
                }
                continue;
            }

            if let Some(parent_idx) = parent {
                let full = self.collect_statement(trimmed);
                if let Some((name, prop)) = self.parse_property_line(&full, line_num, diags)? {
                    store.get_mut(parent_idx)?.properties.insert(name, prop);
                }
            }
        }
    }

    fn scan_variant_set_body(
        &mut self,
        owner: NodeIndex,
        variant_set: String,
        depth: usize,
        store: &mut PrimNodeStore,
        diags: &mut Diagnostics,
    ) -> ReaderResult<()> {
        // Consume the opening `{` if it wasn't on the header line.
        if let Some((_, l)) = self.next_significant() {
            if l.trim() != "{" {
                self.push_back((0, l));
            }
        }

        loop {
            let Some((_, raw_line)) = self.next_significant() else {
                return Ok(());
            };
            let trimmed = raw_line.trim().to_string();
            if trimmed == "}" {
                return Ok(());
            }
            let Some(variant_name) = Self::parse_variant_name_header(&trimmed) else {
                continue;
            };
            if let Some((_, l)) = self.next_significant() {
                if l.trim() != "{" {
                    self.push_back((0, l));
                }
            }
            self.scan_variant_body(owner, &variant_set, &variant_name, depth, store, diags)?;
        }
    }

    fn scan_variant_body(
        &mut self,
        owner: NodeIndex,
        variant_set: &str,
        variant_name: &str,
        depth: usize,
        store: &mut PrimNodeStore,
        diags: &mut Diagnostics,
    ) -> ReaderResult<()> {
        loop {
            let Some((line_num, raw_line)) = self.next_significant() else {
                return Ok(());
            };
            let trimmed = raw_line.trim().to_string();
            if trimmed == "}" {
                return Ok(());
            }
            if trimmed.starts_with("def ") || trimmed.starts_with("over ") || trimmed.starts_with("class ") {
                let Some((specifier, type_name, name)) = Self::parse_header_line(&trimmed) else {
                    diags.warn(format!("[USDA] malformed prim header at line {line_num}"));
                    continue;
                };
                let idx = store.allocate_in_variant(name, specifier, owner, variant_set, variant_name)?;
                self.consume_metadata_and_body(idx, type_name, depth + 1, store, diags)?;
            }
        }
    }

    /// After a `def Type "Name"` header, consume an optional metadata paren
    /// block, then the required `{ ... }` body.
    fn consume_metadata_and_body(
        &mut self,
        idx: NodeIndex,
        type_name: Option<String>,
        depth: usize,
        store: &mut PrimNodeStore,
        diags: &mut Diagnostics,
    ) -> ReaderResult<()> {
        if let Some(t) = type_name {
            store.get_mut(idx)?.type_name = Some(t);
        }

        let next = self.next_significant();
        let opens_meta = matches!(&next, Some((_, l)) if l.trim().starts_with('('));
        if opens_meta {
            let raw = self.parse_meta_block_or_single(next.unwrap().1.trim())?;
            let mut warnings = Vec::new();
            store.get_mut(idx)?.meta = decode_prim_meta(&raw, &mut warnings, self.config.allow_unknown_api_schemas)?;
            for w in warnings {
                diags.warn(w);
            }
        } else if let Some(item) = next {
            self.push_back(item);
        }

        if let Some((_, l)) = self.next_significant() {
            if l.trim() == "{" {
                self.scan_body(Some(idx), depth + 1, store, diags)?;
            } else {
                self.push_back((0, l));
            }
        }
        Ok(())
    }

    fn parse_meta_block_or_single(&mut self, header_line: &str) -> ReaderResult<RawMetaMap> {
        let trimmed = header_line.trim();
        if trimmed.ends_with(')') && trimmed.len() > 1 {
            return self.parse_meta_body_single_line(&trimmed[1..trimmed.len() - 1]);
        }
        let mut diags = Diagnostics::default();
        self.parse_meta_block(&mut diags)
    }

    fn skip_balanced_block(&mut self) -> ReaderResult<()> {
        let mut depth = 0i32;
        loop {
            let Some((_, line)) = self.next_significant() else {
                return Ok(());
            };
            let t = line.trim();
            if t.ends_with('{') {
                depth += 1;
            }
            if t == "}" {
                depth -= 1;
                if depth <= 0 {
                    return Ok(());
                }
            }
        }
    }

    /// Parse a single attribute/relationship declaration line, e.g.
    /// `float3[] points = [...]` or `rel material:binding = </Foo>`.
    fn parse_property_line(&self, line: &str, line_num: usize, diags: &mut Diagnostics) -> ReaderResult<Option<(String, Property)>> {
        let trimmed = line.trim().trim_end_matches(',');
        if trimmed.is_empty() || trimmed == "(" || trimmed == ")" {
            return Ok(None);
        }

        if let Some(rest) = trimmed.strip_prefix("rel ") {
            let Some(eq) = rest.find('=') else {
                return Ok(None);
            };
            let name = rest[..eq].trim().to_string();
            let rhs = rest[eq + 1..].trim();
            let targets = parse_target_list(rhs);
            return Ok(Some((name, Property::Relationship { targets })));
        }

        let Some(eq) = trimmed.find('=') else {
            return Ok(None);
        };
        let lhs = trimmed[..eq].trim();
        let rhs = trimmed[eq + 1..].trim();

        if rhs.len() > self.config.max_string_length {
            return Err(ReaderError::ResourceLimitExceeded {
                limit: "maxStringLength",
                value: rhs.len(),
                max: self.config.max_string_length,
            });
        }

        let mut lhs_words: Vec<&str> = lhs.split_whitespace().collect();
        let Some(name) = lhs_words.pop() else {
            return Ok(None);
        };
        let type_name = lhs_words.join(" ");

        if name.len() > self.config.max_token_length {
            diags.warn(format!(
                "[USDA] attribute name at line {line_num} exceeds maxTokenLength"
            ));
        }

        let value = if rhs.is_empty() || rhs == "None" {
            None
        } else {
            Some(parse_value_literal(rhs, self.config)?)
        };

        Ok(Some((
            name.to_string(),
            Property::Attribute {
                type_name,
                value,
            },
        )))
    }
}

fn parse_target_list(rhs: &str) -> Vec<String> {
    let rhs = rhs.trim();
    if let Some(inner) = rhs.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        split_top_level(inner, ',')
            .into_iter()
            .map(|s| s.trim().trim_matches(['<', '>']).to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else if !rhs.is_empty() {
        vec![rhs.trim_matches(['<', '>']).to_string()]
    } else {
        Vec::new()
    }
}

/// Split `s` on `sep`, ignoring separators nested inside `[]`, `()`, or `""`.
fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut current = String::new();
    for c in s.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' | '(' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' if !in_quotes => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && depth == 0 && !in_quotes => {
                out.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        out.push(current);
    }
    out
}

/// Parse a USDA value literal into a `PropertyValue`. Handles scalars,
/// bracketed arrays, `None` (→ `Blocked`), and bare dictionaries.
fn parse_value_literal(rhs: &str, config: &ReaderConfig) -> ReaderResult<PropertyValue> {
    let rhs = rhs.trim();

    if rhs == "None" {
        return Ok(PropertyValue::Blocked);
    }
    if rhs == "true" {
        return Ok(PropertyValue::Bool(true));
    }
    if rhs == "false" {
        return Ok(PropertyValue::Bool(false));
    }
    if rhs.starts_with('"') && rhs.ends_with('"') && rhs.len() >= 2 {
        return Ok(PropertyValue::String(rhs[1..rhs.len() - 1].to_string()));
    }
    if rhs.starts_with('@') {
        let inner = rhs.trim_matches('@');
        return Ok(PropertyValue::Path(inner.to_string()));
    }
    if rhs.starts_with('<') && rhs.ends_with('>') {
        return Ok(PropertyValue::Path(rhs[1..rhs.len() - 1].to_string()));
    }
    if rhs.starts_with('{') && rhs.ends_with('}') {
        return parse_dict_literal(&rhs[1..rhs.len() - 1], config);
    }
    if rhs.starts_with('(') && rhs.ends_with(')') {
        // Tuple literal: (x, y, z) or (x, y, z, w) — a vec3/quat.
        let parts: Vec<f64> = split_top_level(&rhs[1..rhs.len() - 1], ',')
            .iter()
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .collect();
        return match parts.len() {
            3 => Ok(PropertyValue::Vec3(parts[0] as f32, parts[1] as f32, parts[2] as f32)),
            4 => Ok(PropertyValue::Quat(
                parts[0] as f32,
                parts[1] as f32,
                parts[2] as f32,
                parts[3] as f32,
            )),
            _ => Err(ReaderError::MalformedInput {
                line: 0,
                message: format!("unsupported tuple arity in '{rhs}'"),
            }),
        };
    }
    if rhs.starts_with('[') && rhs.ends_with(']') {
        return parse_array_literal(&rhs[1..rhs.len() - 1], config);
    }
    if let Ok(i) = rhs.parse::<i64>() {
        return Ok(PropertyValue::Int(i));
    }
    if let Ok(f) = rhs.parse::<f64>() {
        return Ok(PropertyValue::Float(f));
    }
    // Bare token, e.g. an enum value used in metadata (`kind = component`).
    Ok(PropertyValue::Token(rhs.to_string()))
}

fn parse_dict_literal(body: &str, config: &ReaderConfig) -> ReaderResult<PropertyValue> {
    let mut map = std::collections::BTreeMap::new();
    for stmt in split_top_level(body, ',') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        let Some(eq) = stmt.find('=') else { continue };
        let lhs = stmt[..eq].trim();
        let rhs = stmt[eq + 1..].trim();
        // lhs may be `typeName key`; keep only the last token as the key.
        let key = lhs.split_whitespace().last().unwrap_or(lhs).trim_matches('"').to_string();
        map.insert(key, parse_value_literal(rhs, config)?);
    }
    Ok(PropertyValue::Dict(map))
}

fn parse_array_literal(body: &str, config: &ReaderConfig) -> ReaderResult<PropertyValue> {
    let items = split_top_level(body, ',');
    if items.iter().all(|s| s.trim().is_empty()) {
        return Ok(PropertyValue::IntArray(Vec::new()));
    }

    let first = items[0].trim();
    if first.starts_with('(') {
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            match parse_value_literal(item.trim(), config)? {
                PropertyValue::Vec3(x, y, z) => out.push((x, y, z)),
                _ => {
                    return Err(ReaderError::MalformedInput {
                        line: 0,
                        message: format!("expected vec3 array element, got '{item}'"),
                    })
                }
            }
        }
        return Ok(PropertyValue::Vec3Array(out));
    }
    if first.starts_with('"') {
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            let t = item.trim();
            out.push(t.trim_matches('"').to_string());
        }
        return Ok(PropertyValue::StringArray(out));
    }
    if first.starts_with('<') || first.starts_with('@') {
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            match parse_value_literal(item.trim(), config)? {
                PropertyValue::Path(p) => out.push(p),
                _ => {}
            }
        }
        return Ok(PropertyValue::PathArray(out));
    }
    if items.iter().any(|s| s.contains('.')) {
        let mut out = Vec::with_capacity(items.len());
        for item in &items {
            out.push(item.trim().parse::<f64>().map_err(|_| ReaderError::MalformedInput {
                line: 0,
                message: format!("invalid float literal '{item}'"),
            })?);
        }
        return Ok(PropertyValue::FloatArray(out));
    }
    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        out.push(item.trim().parse::<i64>().map_err(|_| ReaderError::MalformedInput {
            line: 0,
            message: format!("invalid int literal '{item}'"),
        })?);
    }
    Ok(PropertyValue::IntArray(out))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ReaderConfig {
        ReaderConfig::default()
    }

    #[test]
    fn scans_single_def_block() {
        let content = "def Xform \"World\"\n{\n}\n";
        let cfg = cfg();
        let lexer = Lexer::new(content, &cfg);
        let mut store = PrimNodeStore::new();
        let mut diags = Diagnostics::default();
        lexer.scan_stage(&mut store, &mut diags).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().name, "World");
    }

    #[test]
    fn scans_nested_def_and_attribute() {
        let content = "def Xform \"World\"\n{\n    def Sphere \"Ball\"\n    {\n        double radius = 2.5\n    }\n}\n";
        let cfg = cfg();
        let lexer = Lexer::new(content, &cfg);
        let mut store = PrimNodeStore::new();
        let mut diags = Diagnostics::default();
        lexer.scan_stage(&mut store, &mut diags).unwrap();
        assert_eq!(store.len(), 2);
        let ball = store.get(1).unwrap();
        assert_eq!(ball.name, "Ball");
        assert_eq!(ball.parent, Some(0));
        assert!(ball.properties.get_value("radius").is_some());
    }

    #[test]
    fn parses_int_array_literal() {
        let cfg = cfg();
        let v = parse_value_literal("[0, 1, 2, 3]", &cfg).unwrap();
        assert_eq!(v, PropertyValue::IntArray(vec![0, 1, 2, 3]));
    }

    #[test]
    fn parses_vec3_array_literal() {
        let cfg = cfg();
        let v = parse_value_literal("[(0, 0, 0), (1, 0, 0)]", &cfg).unwrap();
        assert_eq!(
            v,
            PropertyValue::Vec3Array(vec![(0.0, 0.0, 0.0), (1.0, 0.0, 0.0)])
        );
    }

    #[test]
    fn metadata_block_decodes_kind() {
        let content = "def Xform \"World\"\n(\n    kind = \"component\"\n)\n{\n}\n";
        let cfg = cfg();
        let lexer = Lexer::new(content, &cfg);
        let mut store = PrimNodeStore::new();
        let mut diags = Diagnostics::default();
        lexer.scan_stage(&mut store, &mut diags).unwrap();
        assert_eq!(
            store.get(0).unwrap().meta.kind,
            Some(crate::usd::meta::Kind::Component)
        );
    }

    #[test]
    fn nesting_over_limit_errors() {
        let mut cfg = cfg();
        cfg.max_prim_nest_level = 1;
        let content = "def Xform \"A\"\n{\n    def Xform \"B\"\n    {\n        def Xform \"C\"\n        {\n        }\n    }\n}\n";
        let lexer = Lexer::new(content, &cfg);
        let mut store = PrimNodeStore::new();
        let mut diags = Diagnostics::default();
        let err = lexer.scan_stage(&mut store, &mut diags);
        assert!(err.is_err());
    }
}
