//! Identifier paths: canonical addresses into the parameter tree.
//!
//! A path is a list of segments joined by the path delimiter. Each segment is
//! an identifier, optionally followed by the type delimiter and a declared
//! type (`customer:com.acme.Customer/firstName:java.lang.String`). Paths are
//! compared segment by segment, never as opaque strings.

use serde::{Deserialize, Serialize};

/// Separator used by the compact format for dotted attribute chains.
pub const CHAIN_SEPARATOR: char = '.';

/// The three delimiters an identifier path is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// Between ancestor segments.
    pub path: char,
    /// Within a dotted identifier or type chain.
    pub namespace: char,
    /// Between an identifier and its declared type.
    pub type_name: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Delimiters {
            path: '/',
            namespace: '.',
            type_name: ':',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub identifier: String,
    pub type_name: Option<String>,
}

impl PathSegment {
    /// Last namespace component of the identifier.
    pub fn local_name(&self, delimiters: &Delimiters) -> &str {
        self.identifier
            .rsplit(delimiters.namespace)
            .next()
            .unwrap_or(&self.identifier)
    }

    /// Identifiers must agree; types only when both sides declare one.
    fn same_node(&self, other: &PathSegment) -> bool {
        if self.identifier != other.identifier {
            return false;
        }
        match (&self.type_name, &other.type_name) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierPath {
    segments: Vec<PathSegment>,
}

impl IdentifierPath {
    pub fn parse(raw: &str, delimiters: &Delimiters) -> Self {
        let segments = raw
            .split(delimiters.path)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| match s.split_once(delimiters.type_name) {
                Some((id, ty)) => PathSegment {
                    identifier: id.trim().to_string(),
                    type_name: Some(ty.trim().to_string()).filter(|t| !t.is_empty()),
                },
                None => PathSegment {
                    identifier: s.to_string(),
                    type_name: None,
                },
            })
            .collect();
        IdentifierPath { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A path with more than one segment addresses a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// Local identifier of every segment, root first.
    pub fn identifier_chain<'a>(&'a self, delimiters: &Delimiters) -> Vec<&'a str> {
        self.segments
            .iter()
            .map(|s| s.local_name(delimiters))
            .collect()
    }

    /// The chain as written in compact comments: `customer.address.city`.
    pub fn dotted(&self, delimiters: &Delimiters) -> String {
        self.identifier_chain(delimiters)
            .join(&CHAIN_SEPARATOR.to_string())
    }

    pub fn same_target(&self, other: &IdentifierPath) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same_node(b))
    }

    pub fn render(&self, delimiters: &Delimiters) -> String {
        let mut out = String::new();
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(delimiters.path);
            }
            out.push_str(&seg.identifier);
            if let Some(ref ty) = seg.type_name {
                out.push(delimiters.type_name);
                out.push_str(ty);
            }
        }
        out
    }

    /// Path of an attribute declared below this one.
    pub fn child(&self, identifier: &str, type_name: Option<&str>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment {
            identifier: identifier.to_string(),
            type_name: type_name.map(str::to_string),
        });
        IdentifierPath { segments }
    }
}

/// Structural comparison of two raw paths.
pub fn same_path(a: &str, b: &str, delimiters: &Delimiters) -> bool {
    IdentifierPath::parse(a, delimiters).same_target(&IdentifierPath::parse(b, delimiters))
}

/// Split a dotted chain written in a comment (`p.first.name`).
pub fn split_chain(chain: &str) -> Vec<&str> {
    chain
        .split(CHAIN_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d() -> Delimiters {
        Delimiters::default()
    }

    #[test]
    fn parse_segments_with_types() {
        let path = IdentifierPath::parse("customer:com.acme.Customer/firstName:java.lang.String", &d());
        assert_eq!(path.depth(), 2);
        assert_eq!(path.segments()[0].identifier, "customer");
        assert_eq!(
            path.segments()[1].type_name.as_deref(),
            Some("java.lang.String")
        );
        assert!(path.is_nested());
    }

    #[test]
    fn dotted_chain_uses_local_names() {
        let path = IdentifierPath::parse("acme.customer:Customer/address:Address/city:String", &d());
        assert_eq!(path.dotted(&d()), "customer.address.city");
    }

    #[test]
    fn untyped_segment_matches_typed_segment() {
        assert!(same_path("p", "p:java.lang.String", &d()));
        assert!(!same_path("p:Integer", "p:String", &d()));
        assert!(!same_path("p", "p/first", &d()));
    }

    #[test]
    fn render_round_trips() {
        let raw = "p:Person/first:String";
        assert_eq!(IdentifierPath::parse(raw, &d()).render(&d()), raw);
    }

    #[test]
    fn custom_delimiters() {
        let delims = Delimiters {
            path: '.',
            namespace: ':',
            type_name: '-',
        };
        let path = IdentifierPath::parse("ns:order-Order.id-long", &delims);
        assert_eq!(path.identifier_chain(&delims), vec!["order", "id"]);
    }

    #[test]
    fn child_extends_path() {
        let root = IdentifierPath::parse("p:Person", &d());
        let child = root.child("first", Some("String"));
        assert_eq!(child.render(&d()), "p:Person/first:String");
    }

    #[test]
    fn split_chain_ignores_blanks() {
        assert_eq!(split_chain(" p . first "), vec!["p", "first"]);
    }
}
