//! USD path syntax: `/A/B.prop[target]`.
//!
//! The core only ever needs the prim part of a path; property and target
//! parts are carried through for round-tripping but never interpreted.

use std::fmt;

/// A parsed USD path, split into its prim / property / target sub-parts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    /// The prim part, e.g. `/A/B`. Always starts with `/` for absolute paths.
    pub prim_part: String,
    /// The property part, e.g. `prop`, if this path names an attribute or relationship.
    pub property_part: Option<String>,
    /// The relationship target, e.g. `target`, if present in `[...]`.
    pub target_part: Option<String>,
}

impl Path {
    /// Parse a raw path string as it appears in USDA text (`</A/B>`, `A/B.prop[target]`, ...).
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_start_matches('<').trim_end_matches('>');

        let (before_target, target_part) = match raw.find('[') {
            Some(start) => {
                let end = raw.find(']').unwrap_or(raw.len());
                (&raw[..start], Some(raw[start + 1..end].to_string()))
            }
            None => (raw, None),
        };

        let (prim_part, property_part) = match before_target.find('.') {
            Some(idx) => (
                before_target[..idx].to_string(),
                Some(before_target[idx + 1..].to_string()),
            ),
            None => (before_target.to_string(), None),
        };

        Self {
            prim_part,
            property_part,
            target_part,
        }
    }

    /// Whether this is an absolute path (starts with `/`).
    pub fn is_absolute(&self) -> bool {
        self.prim_part.starts_with('/')
    }

    /// Whether this path names only the pseudo-root (`/`).
    pub fn is_root(&self) -> bool {
        self.prim_part == "/"
    }

    /// Build an absolute prim path by appending an element name to a parent path.
    pub fn append(parent: &str, element: &str) -> String {
        if parent.is_empty() || parent == "/" {
            format!("/{element}")
        } else {
            format!("{parent}/{element}")
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prim_part)?;
        if let Some(p) = &self.property_part {
            write!(f, ".{p}")?;
        }
        if let Some(t) = &self.target_part {
            write!(f, "[{t}]")?;
        }
        Ok(())
    }
}

/// The kind of declaration a Prim header makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Specifier {
    #[default]
    Def,
    Over,
    Class,
}

impl Specifier {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "def" => Some(Specifier::Def),
            "over" => Some(Specifier::Over),
            "class" => Some(Specifier::Class),
            _ => None,
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Specifier::Def => "def",
            Specifier::Over => "over",
            Specifier::Class => "class",
        };
        write!(f, "{s}")
    }
}

/// How a list-valued metadata field composes with the same field in weaker layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ListEditQualifier {
    #[default]
    Explicit,
    Append,
    Prepend,
    Delete,
    Add,
    Reset,
}

impl ListEditQualifier {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "append" => Some(ListEditQualifier::Append),
            "prepend" => Some(ListEditQualifier::Prepend),
            "delete" => Some(ListEditQualifier::Delete),
            "add" => Some(ListEditQualifier::Add),
            "reset" => Some(ListEditQualifier::Reset),
            "explicit" | "" => Some(ListEditQualifier::Explicit),
            _ => None,
        }
    }
}

/// Validate a Prim element name per spec.md data-model invariants:
/// non-empty, no `/`, no `.`.
pub fn validate_element_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("prim name is empty".to_string());
    }
    if name.contains('/') {
        return Err(format!("prim name '{name}' must not contain '/'"));
    }
    if name.contains('.') {
        return Err(format!("prim name '{name}' must not contain '.'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_prim_only() {
        let p = Path::parse("/A/B");
        assert_eq!(p.prim_part, "/A/B");
        assert!(p.property_part.is_none());
        assert!(p.target_part.is_none());
    }

    #[test]
    fn parse_prim_prop_target() {
        let p = Path::parse("/A/B.prop[/Target]");
        assert_eq!(p.prim_part, "/A/B");
        assert_eq!(p.property_part.as_deref(), Some("prop"));
        assert_eq!(p.target_part.as_deref(), Some("/Target"));
    }

    #[test]
    fn parse_angle_bracket_form() {
        let p = Path::parse("</World/Lights/Key>");
        assert_eq!(p.prim_part, "/World/Lights/Key");
    }

    #[test]
    fn element_name_rules() {
        assert!(validate_element_name("Cube").is_ok());
        assert!(validate_element_name("").is_err());
        assert!(validate_element_name("A/B").is_err());
        assert!(validate_element_name("A.B").is_err());
    }
}
