//! Compact encoder: one tag per entry, `[ROLE]` brackets, a single audience.

use super::{insert_separators, Call, Encoder};
use crate::comment::{Comment, Segment};
use crate::error::ParsingError;
use crate::escape::{escape_compact, BREAK_PLACEHOLDER};
use crate::model::{
    is_introduction, Addressee, Documentation, CHECKING_OPERATIONS, ROLE_ACTION, ROLE_RULE,
};
use crate::path::{Delimiters, IdentifierPath};
use crate::taglet::{role_tag, RETURN};
use tracing::debug;

const RULE_PREFIX: &str = "Rule: ";
const INFO_SUFFIX: &str = "info";
const BRACKET_ENTITY: &str = "&#91;";

#[derive(Debug, Clone)]
pub struct CompactEncoder {
    segments: Vec<Segment>,
    delimiters: Delimiters,
    primary: Addressee,
}

impl CompactEncoder {
    pub fn new(primary: Addressee) -> Self {
        CompactEncoder {
            segments: Vec::new(),
            delimiters: Delimiters::default(),
            primary,
        }
    }

    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Exactly one addressee, the primary one. Role-only entries pass.
    fn check(&self, doc: &Documentation) -> Result<(), ParsingError> {
        if doc.addressees.is_empty() && doc.texts.is_empty() {
            return Ok(());
        }
        if doc.addressees.len() != 1 || doc.texts.len() > 1 {
            return Err(ParsingError::FormatInvariantViolation {
                reason: format!(
                    "an entry with role \"{}\" has {} addressees, only \"{}\" is supported",
                    doc.role_name(),
                    doc.addressees.len().max(doc.texts.len()),
                    self.primary.name
                ),
            });
        }
        let name = &doc.addressees[0].name;
        if *name != self.primary.name || doc.texts.keys().any(|k| k != name) {
            return Err(ParsingError::FormatInvariantViolation {
                reason: format!(
                    "an entry with role \"{}\" is addressed to \"{}\", only \"{}\" is supported",
                    doc.role_name(),
                    name,
                    self.primary.name
                ),
            });
        }
        Ok(())
    }

    fn text_of(&self, doc: &Documentation) -> String {
        escape_compact(doc.text_for(&self.primary.name).trim())
    }

    fn append_element(&mut self, call: &Call<'_>) {
        let checking = call.grid_name == Some(CHECKING_OPERATIONS);
        let has_op = call.has_owning_operation();

        let intro = call.documentations.iter().position(|doc| {
            doc.has_role(ROLE_ACTION)
                || (checking && doc.has_role(ROLE_RULE))
                || is_introduction(doc, has_op)
        });

        // Intro first, other untagged sentences next, role tags last.
        let mut untagged: Vec<String> = Vec::new();
        let mut tagged: Vec<Segment> = Vec::new();
        for (i, doc) in call.documentations.iter().enumerate() {
            let text = self.text_of(doc);
            if Some(i) == intro {
                let text = if checking && doc.has_role(ROLE_RULE) {
                    format!("{}{}", RULE_PREFIX, text)
                } else {
                    text
                };
                untagged.insert(0, text);
            } else if doc.is_untyped() {
                untagged.push(text);
            } else if let Some(ref role) = doc.role {
                tagged.push(Segment::tagged(&role_tag(role), &text));
            }
        }

        self.segments.extend(
            untagged
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| Segment::untagged(t)),
        );
        self.segments.extend(tagged);
    }

    fn append_parameter(&mut self, call: &Call<'_>, tag: &str) -> Result<(), ParsingError> {
        call.check_target()?;
        if call.covered_by_additional_tag() {
            debug!(tag, param = call.param_name, "documented by a preserved tag, skipped");
            return Ok(());
        }

        let top_level_return = tag == RETURN || tag == format!("{}{}", RETURN, INFO_SUFFIX);

        if call.documentations.is_empty() {
            if crate::taglet::Block::from_structural(tag).is_some() {
                let name = if top_level_return { "" } else { call.param_name.unwrap_or("") };
                self.segments.push(Segment::tagged(tag, name));
            }
            return Ok(());
        }

        for (i, doc) in call.documentations.iter().enumerate() {
            let tag = if i == 0 {
                tag.to_string()
            } else {
                format!("{}{}", tag, INFO_SUFFIX)
            };

            let mut line = String::new();
            if !top_level_return {
                let chain = match call.param_name {
                    Some(name) => name.to_string(),
                    None => doc
                        .target
                        .as_deref()
                        .map(|t| IdentifierPath::parse(t, &self.delimiters).dotted(&self.delimiters))
                        .unwrap_or_default(),
                };
                line.push_str(&chain);
            }
            if let Some(ref role) = doc.role {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push('[');
                line.push_str(&role.name);
                line.push(']');
            }
            let mut text = self.text_of(doc);
            // Without a role, a leading bracket would be read back as one.
            if doc.role.is_none() && text.starts_with('[') {
                text.replace_range(..1, BRACKET_ENTITY);
            }
            if !text.is_empty() {
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(&text);
            }
            self.segments.push(Segment::tagged(&tag, &line));
        }
        Ok(())
    }
}

impl Encoder for CompactEncoder {
    fn append(&mut self, call: &Call<'_>) -> Result<(), ParsingError> {
        for doc in call.documentations {
            self.check(doc)?;
        }
        match call.tag {
            None => self.append_element(call),
            Some(tag) => self.append_parameter(call, tag)?,
        }
        Ok(())
    }

    fn append_tag(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn finish(&mut self) -> Comment {
        let segments = std::mem::take(&mut self.segments);
        let segments = merge(segments);
        let segments = segments.into_iter().map(split).collect();
        Comment::new(insert_separators(segments))
    }
}

/// Untagged text following another segment continues it.
fn merge(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for seg in segments {
        if seg.tag.is_none() && !seg.is_blank() {
            if let Some(prev) = out.iter_mut().rev().find(|s| !s.is_blank()) {
                prev.text.push('\n');
                prev.text.push_str(&seg.text);
                continue;
            }
        }
        out.push(seg);
    }
    out
}

/// Native line breaks become one output line each; every line but the last
/// carries the break marker so the parser can join them back. A line that
/// would start with `@` is escaped so it is not read as a tag.
fn split(mut seg: Segment) -> Segment {
    if !seg.text.contains('\n') && !(seg.tag.is_none() && seg.text.starts_with('@')) {
        return seg;
    }
    let lines: Vec<&str> = seg.text.lines().map(str::trim).collect();
    let last = lines.len().saturating_sub(1);
    let mut text = String::with_capacity(seg.text.len() + lines.len() * BREAK_PLACEHOLDER.len());
    for (i, line) in lines.iter().enumerate() {
        let opens_line = i > 0 || seg.tag.is_none();
        match line.strip_prefix('@') {
            Some(rest) if opens_line => {
                text.push_str("&#64;");
                text.push_str(rest);
            }
            _ => text.push_str(line),
        }
        if i < last {
            text.push_str(BREAK_PLACEHOLDER);
            text.push('\n');
        }
    }
    seg.text = text;
    seg
}
