//! Compact decoder: one entry per tag, parents found by position.
//!
//! Continuation and sub tags carry no reference to the parameter they
//! belong to. [`parent_index`] maps every segment to the nearest structural
//! tag above it in one forward pass; sub tags then walk their dotted chain
//! down from that parameter.

use super::Decoded;
use crate::comment::{Comment, Segment};
use crate::error::ParsingError;
use crate::escape::decode_text;
use crate::model::{
    Addressee, Documentation, Operation, Parameter, ThematicRole, CHECKING_OPERATIONS,
    ROLE_ACTION, ROLE_NONE, ROLE_RULE,
};
use crate::path::split_chain;
use crate::registry::find_role_by_name;
use crate::taglet::{classify, Block, TagKind, Taglet, RETURN};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static RE_ROLE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\[([A-Za-z][\w-]*)\]\s*(.*)$").unwrap());

const RULE_PREFIX: &str = "rule:";

/// The pieces of a tag's text: `identifier [ROLE] text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry<'t> {
    identifier: Option<&'t str>,
    role: Option<&'t str>,
    text: &'t str,
}

fn split_entry(text: &str, with_identifier: bool) -> Entry<'_> {
    let text = text.trim();
    let (identifier, rest) = if with_identifier && !text.starts_with('[') {
        match text.split_once(char::is_whitespace) {
            Some((id, rest)) => (Some(id), rest.trim_start()),
            None => (Some(text).filter(|t| !t.is_empty()), ""),
        }
    } else {
        (None, text)
    };
    match RE_ROLE_BRACKET.captures(rest) {
        Some(caps) => Entry {
            identifier,
            role: caps.get(1).map(|m| m.as_str()),
            text: caps.get(2).map_or("", |m| m.as_str()),
        },
        None => Entry {
            identifier,
            role: None,
            text: rest,
        },
    }
}

/// For each segment, the position of the nearest structural tag
/// (`@param`, `@return`, `@throws`) strictly before it.
pub fn parent_index(segments: &[Segment]) -> Vec<Option<usize>> {
    let mut last = None;
    segments
        .iter()
        .enumerate()
        .map(|(pos, seg)| {
            let parent = last;
            if seg
                .tag
                .as_deref()
                .is_some_and(|t| Block::from_structural(t).is_some())
            {
                last = Some(pos);
            }
            parent
        })
        .collect()
}

/// Entries decoded before a fatal segment, with the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDecode {
    pub decoded: Decoded,
    pub error: ParsingError,
}

enum Step {
    Entry(Documentation),
    Preserve,
    Skip,
}

#[derive(Debug, Clone)]
pub struct CompactDecoder {
    roles: Vec<ThematicRole>,
    primary: Addressee,
}

impl CompactDecoder {
    pub fn new(roles: Vec<ThematicRole>, addressees: &[Addressee]) -> Self {
        let primary = addressees
            .iter()
            .find(|a| a.primary)
            .cloned()
            .unwrap_or_else(Addressee::primary);
        CompactDecoder { roles, primary }
    }

    /// Decode a whole comment. Nothing is returned if any segment fails.
    pub fn decode(
        &self,
        comment: &Comment,
        operation: Option<&Operation>,
    ) -> Result<Decoded, ParsingError> {
        self.decode_partial(comment, operation)
            .map_err(|partial| partial.error)
    }

    /// Like [`decode`](Self::decode), but a failure carries the entries
    /// decoded up to the failing segment.
    pub fn decode_partial(
        &self,
        comment: &Comment,
        operation: Option<&Operation>,
    ) -> Result<Decoded, PartialDecode> {
        let segments = &comment.segments;
        let parents = parent_index(segments);
        let grid = comment
            .grid_name()
            .or_else(|| operation.and_then(|op| op.grid_name.as_deref()));

        let mut decoded = Decoded::default();
        for (pos, seg) in segments.iter().enumerate() {
            if seg.is_blank() {
                continue;
            }
            let step = match seg.tag {
                None => Ok(self.leading(seg, operation, grid)),
                Some(ref tag) => match classify(tag) {
                    TagKind::Grid => Ok(Step::Skip),
                    TagKind::Structural(block) => self.structural(block, seg, operation),
                    TagKind::Continuation(taglet) => {
                        self.continuation(taglet, pos, segments, &parents, operation)
                    }
                    TagKind::Other(name) => Ok(self.role_tag(name, seg)),
                },
            };
            match step {
                Ok(Step::Entry(doc)) => decoded.documentations.push(doc),
                Ok(Step::Preserve) => {
                    debug!(tag = seg.tag.as_deref(), "preserving tag");
                    decoded.additional_tags.push(seg.clone());
                }
                Ok(Step::Skip) => {}
                Err(error) => return Err(PartialDecode { decoded, error }),
            }
        }
        Ok(decoded)
    }

    fn entry(&self, role: Option<ThematicRole>, text: &str, target: Option<&str>) -> Step {
        let text = decode_text(text);
        let text = text.trim();
        if role.is_none() && text.is_empty() {
            debug!("empty entry skipped");
            return Step::Skip;
        }
        let mut doc = Documentation::addressed(role, &self.primary, text);
        doc.target = target.map(str::to_string);
        Step::Entry(doc)
    }

    /// A role named in a bracket. NONE means no role.
    fn bracket_role(&self, name: Option<&str>) -> Option<ThematicRole> {
        let name = name?;
        match find_role_by_name(&self.roles, name) {
            Some(role) if role.name == ROLE_NONE => None,
            Some(role) => Some(role.clone()),
            None => {
                warn!(role = name, "unrecognized thematic role, entry kept without role");
                None
            }
        }
    }

    /// The untagged leading sentence: RULE under a checking grid, ACTION
    /// when an operation owns the comment, NONE otherwise.
    fn leading(&self, seg: &Segment, operation: Option<&Operation>, grid: Option<&str>) -> Step {
        let mut text = seg.text.trim();
        let inferred = if grid == Some(CHECKING_OPERATIONS) {
            if text
                .get(..RULE_PREFIX.len())
                .is_some_and(|p| p.eq_ignore_ascii_case(RULE_PREFIX))
            {
                text = text[RULE_PREFIX.len()..].trim_start();
            }
            ROLE_RULE
        } else if operation.is_some() {
            ROLE_ACTION
        } else {
            ROLE_NONE
        };
        let role = find_role_by_name(&self.roles, inferred)
            .filter(|r| r.name != ROLE_NONE)
            .cloned();
        self.entry(role, text, None)
    }

    fn role_tag(&self, name: &str, seg: &Segment) -> Step {
        match find_role_by_name(&self.roles, name) {
            Some(role) => {
                let role = Some(role.clone()).filter(|r| r.name != ROLE_NONE);
                let text = decode_text(seg.text.trim());
                Step::Entry(Documentation::addressed(role, &self.primary, text.trim()))
            }
            None => Step::Preserve,
        }
    }

    fn param_entry(&self, entry: Entry<'_>, param: &Parameter) -> Step {
        if entry.role.is_none() && entry.text.is_empty() {
            return Step::Skip;
        }
        if entry.role.is_none() {
            info!(param = param.identifier(), "documentation without a role bracket");
        }
        self.entry(self.bracket_role(entry.role), entry.text, Some(&param.path))
    }

    fn structural(
        &self,
        block: Block,
        seg: &Segment,
        operation: Option<&Operation>,
    ) -> Result<Step, ParsingError> {
        let Some(op) = operation else {
            return Ok(Step::Preserve);
        };
        let entry = split_entry(&seg.text, block != Block::Return);
        let identifier = entry.identifier.unwrap_or("");
        let param = match block {
            Block::Param => op
                .find_input(identifier)
                .ok_or_else(|| ParsingError::mismatch(op.identifier(), identifier))?,
            Block::Return => op
                .return_parameter()
                .ok_or_else(|| ParsingError::mismatch(op.identifier(), RETURN))?,
            Block::Throws => match op.find_error(identifier) {
                Some(param) => param,
                None => return Ok(Step::Preserve),
            },
        };
        Ok(self.param_entry(entry, param))
    }

    fn continuation(
        &self,
        taglet: Taglet,
        pos: usize,
        segments: &[Segment],
        parents: &[Option<usize>],
        operation: Option<&Operation>,
    ) -> Result<Step, ParsingError> {
        let seg = &segments[pos];
        let Some(parent) = parents[pos].map(|p| &segments[p]) else {
            return Err(ParsingError::UnresolvedReference {
                tag: taglet.name().to_string(),
                position: pos,
            });
        };
        let Some(op) = operation else {
            return Ok(Step::Preserve);
        };

        let parent_word = parent.leading_word().unwrap_or("");
        let block = parent
            .tag
            .as_deref()
            .and_then(Block::from_structural)
            .unwrap_or(Block::Param);
        let base = match block {
            Block::Param => op
                .find_input(parent_word)
                .ok_or_else(|| ParsingError::mismatch(op.identifier(), parent_word))?,
            Block::Return => op
                .return_parameter()
                .ok_or_else(|| ParsingError::mismatch(op.identifier(), RETURN))?,
            Block::Throws => match op.find_error(parent_word) {
                Some(param) => param,
                None => return Ok(Step::Preserve),
            },
        };

        let entry = split_entry(&seg.text, taglet.is_sub() || block != Block::Return);
        if !taglet.is_sub() {
            return Ok(self.param_entry(entry, base));
        }

        let chain = entry.identifier.unwrap_or("");
        let mut names = split_chain(chain);
        if names.len() > 1 && names[0] == base.identifier() {
            names.remove(0);
        }
        let leaf = Some(base)
            .filter(|_| !names.is_empty())
            .and_then(|b| b.walk(&names))
            .ok_or_else(|| ParsingError::mismatch(op.identifier(), chain))?;
        Ok(self.param_entry(entry, leaf))
    }
}
