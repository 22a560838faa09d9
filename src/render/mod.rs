//! Encoders, plus the drivers that walk a
//! signature tree and feed its documentation to an encoder.

pub mod compact;
pub mod rich;

use crate::codec::Codec;
use crate::comment::{Comment, Segment};
use crate::error::ParsingError;
use crate::model::{Artifact, Documentation, Interface, Operation, Parameter};
use crate::path::{split_chain, Delimiters, IdentifierPath};
use crate::taglet::{classify, Block, TagKind, RETURN, THEMATIC_GRID};

/// One encoder call: the entries of one parameter, the return value, one
/// declared error, or the element itself (`tag == None`).
#[derive(Debug, Clone, Copy)]
pub struct Call<'a> {
    pub documentations: &'a [Documentation],
    pub tag: Option<&'a str>,
    /// Dotted identifier chain of the documented parameter.
    pub param_name: Option<&'a str>,
    pub grid_name: Option<&'a str>,
    /// Tags preserved from an earlier decode; a call they already cover is skipped.
    pub additional_tags: &'a [Segment],
    pub operation: Option<&'a Operation>,
}

impl<'a> Call<'a> {
    /// The element's own entries.
    pub fn element(documentations: &'a [Documentation]) -> Self {
        Call {
            documentations,
            tag: None,
            param_name: None,
            grid_name: None,
            additional_tags: &[],
            operation: None,
        }
    }

    pub fn tagged(documentations: &'a [Documentation], tag: &'a str, param_name: &'a str) -> Self {
        Call {
            tag: Some(tag),
            param_name: Some(param_name),
            ..Call::element(documentations)
        }
    }

    pub fn within(mut self, operation: &'a Operation) -> Self {
        self.operation = Some(operation);
        self.grid_name = operation.grid_name.as_deref();
        self.additional_tags = &operation.additional_tags;
        self
    }

    pub fn has_owning_operation(&self) -> bool {
        self.operation.is_some()
    }

    /// The owning operation must have what the tag documents: an output for
    /// the return block, an input named by the chain's root for the param
    /// block. Declared errors are not checked; unknown ones are preserved
    /// when decoding.
    pub fn check_target(&self) -> Result<(), ParsingError> {
        let (Some(op), Some(tag)) = (self.operation, self.tag) else {
            return Ok(());
        };
        let block = match classify(tag) {
            TagKind::Structural(block) => Some(block),
            TagKind::Continuation(taglet) => taglet.block(),
            TagKind::Grid | TagKind::Other(_) => None,
        };
        match block {
            Some(Block::Return) if op.return_parameter().is_none() => {
                Err(ParsingError::mismatch(op.identifier(), RETURN))
            }
            Some(Block::Param) => {
                let root = self
                    .param_name
                    .and_then(|name| split_chain(name).first().copied())
                    .unwrap_or("");
                match op.find_input(root) {
                    Some(_) => Ok(()),
                    None => Err(ParsingError::mismatch(op.identifier(), root)),
                }
            }
            _ => Ok(()),
        }
    }

    /// Whether a preserved tag already documents this call's target.
    pub fn covered_by_additional_tag(&self) -> bool {
        let (Some(tag), Some(name)) = (self.tag, self.param_name) else {
            return false;
        };
        self.additional_tags
            .iter()
            .any(|seg| seg.is_tag(tag) && seg.leading_word() == Some(name))
    }
}

/// Builds one comment from a sequence of calls. Each value is good for one
/// comment; `finish` hands back the result and leaves the encoder empty.
pub trait Encoder {
    fn append(&mut self, call: &Call<'_>) -> Result<(), ParsingError>;

    /// Add a segment verbatim (preserved tags, the grid marker).
    fn append_tag(&mut self, segment: Segment);

    fn finish(&mut self) -> Comment;

    /// Nested attribute entries go into their root parameter's call instead
    /// of separate sub tags.
    fn flattens_attributes(&self) -> bool {
        false
    }
}

/// Layout group of a segment, for separator placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Intro,
    Roles,
    Params(Block),
    Grid,
}

fn section_of(segment: &Segment, previous: Option<Section>) -> Section {
    let Some(ref tag) = segment.tag else {
        return previous.unwrap_or(Section::Intro);
    };
    match classify(tag) {
        TagKind::Structural(block) => Section::Params(block),
        TagKind::Continuation(taglet) => taglet.block().map_or(Section::Grid, Section::Params),
        TagKind::Grid => Section::Grid,
        TagKind::Other(_) => Section::Roles,
    }
}

/// Insert one blank segment wherever the section changes. Never before the
/// first segment, after the last, next to an existing blank, or before the
/// grid marker.
pub(crate) fn insert_separators(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len() * 2);
    let mut previous: Option<Section> = None;

    for seg in segments {
        if seg.is_blank() {
            if out.last().is_some_and(|last| !last.is_blank()) {
                out.push(seg);
            }
            continue;
        }
        let section = section_of(&seg, previous);
        if let Some(prev) = previous {
            let changes = prev != section && section != Section::Grid;
            if changes && out.last().is_some_and(|last| !last.is_blank()) {
                out.push(Segment::blank());
            }
        }
        previous = Some(section);
        out.push(seg);
    }

    while out.last().is_some_and(Segment::is_blank) {
        out.pop();
    }
    out
}

// -- Drivers ------------------------------------------------------------------

fn emit_parameter(
    encoder: &mut dyn Encoder,
    op: &Operation,
    param: &Parameter,
    block: Block,
    delimiters: &Delimiters,
) -> Result<(), ParsingError> {
    let tag = block.structural_tag();

    if encoder.flattens_attributes() {
        let mut docs = Vec::new();
        param.visit(&mut |node, _| docs.extend(node.targeted_documentations()));
        return encoder.append(&Call::tagged(&docs, tag, param.identifier()).within(op));
    }

    let docs = param.targeted_documentations();
    encoder.append(&Call::tagged(&docs, tag, param.identifier()).within(op))?;

    let sub_tag = block.tag_for(true, 0);
    let mut nested: Vec<(String, Vec<Documentation>)> = Vec::new();
    param.visit(&mut |node, depth| {
        if depth > 0 && !node.info.documentations.is_empty() {
            let chain = IdentifierPath::parse(&node.path, delimiters).dotted(delimiters);
            nested.push((chain, node.targeted_documentations()));
        }
    });
    for (chain, docs) in &nested {
        encoder.append(&Call::tagged(docs, &sub_tag, chain).within(op))?;
    }
    Ok(())
}

/// Comment for one operation: its own entries, inputs, return value,
/// declared errors, preserved tags, then the thematic grid marker.
pub fn generate_operation(op: &Operation, codec: &dyn Codec) -> Result<Comment, ParsingError> {
    let mut encoder = codec.encoder();
    let delimiters = codec.delimiters();

    encoder.append(&Call::element(&op.info.documentations).within(op))?;

    if let Some(ref inputs) = op.inputs {
        for param in &inputs.parameters {
            emit_parameter(encoder.as_mut(), op, param, Block::Param, &delimiters)?;
        }
    }
    if let Some(ret) = op.return_parameter() {
        emit_parameter(encoder.as_mut(), op, ret, Block::Return, &delimiters)?;
    }
    for group in &op.errors {
        for param in &group.parameters {
            emit_parameter(encoder.as_mut(), op, param, Block::Throws, &delimiters)?;
        }
    }

    for seg in &op.additional_tags {
        encoder.append_tag(seg.clone());
    }
    if let Some(ref grid) = op.grid_name {
        encoder.append_tag(Segment::tagged(THEMATIC_GRID, grid));
    }

    Ok(encoder.finish())
}

/// Class-level comment for an interface, followed by the comments of its
/// operations and nested interfaces, keyed by qualified identifier.
pub fn generate_interface(
    iface: &Interface,
    codec: &dyn Codec,
) -> Result<Vec<(String, Comment)>, ParsingError> {
    let mut out = Vec::new();

    let mut encoder = codec.encoder();
    let call = Call {
        additional_tags: &iface.additional_tags,
        ..Call::element(&iface.info.documentations)
    };
    encoder.append(&call)?;
    for seg in &iface.additional_tags {
        encoder.append_tag(seg.clone());
    }
    out.push((iface.info.qualified_identifier.clone(), encoder.finish()));

    for op in &iface.operations {
        out.push((op.info.qualified_identifier.clone(), generate_operation(op, codec)?));
    }
    for nested in &iface.interfaces {
        out.extend(generate_interface(nested, codec)?);
    }
    Ok(out)
}

pub fn generate_artifact(
    artifact: &Artifact,
    codec: &dyn Codec,
) -> Result<Vec<(String, Comment)>, ParsingError> {
    let mut out = Vec::new();
    if !artifact.info.documentations.is_empty() {
        let mut encoder = codec.encoder();
        encoder.append(&Call::element(&artifact.info.documentations))?;
        out.push((artifact.info.qualified_identifier.clone(), encoder.finish()));
    }
    for iface in &artifact.interfaces {
        out.extend(generate_interface(iface, codec)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(segments: &[Segment]) -> Vec<String> {
        segments
            .iter()
            .map(|s| match s.tag {
                Some(ref t) => t.clone(),
                None if s.is_blank() => "-".to_string(),
                None => "text".to_string(),
            })
            .collect()
    }

    #[test]
    fn separators_between_sections_only() {
        let out = insert_separators(vec![
            Segment::untagged("Checks x."),
            Segment::tagged("param", "p"),
            Segment::tagged("return", ""),
        ]);
        assert_eq!(tags(&out), vec!["text", "-", "param", "-", "return"]);
    }

    #[test]
    fn no_separator_inside_a_block_or_before_grid() {
        let out = insert_separators(vec![
            Segment::tagged("param", "p [OBJECT] a"),
            Segment::tagged("paraminfo", "p [SOURCE] b"),
            Segment::tagged("subparam", "p.first [COMPARISON] c"),
            Segment::tagged("param", "q"),
            Segment::tagged(THEMATIC_GRID, "Checking Operations"),
        ]);
        assert_eq!(
            tags(&out),
            vec!["param", "paraminfo", "subparam", "param", THEMATIC_GRID]
        );
    }

    #[test]
    fn existing_blanks_are_not_doubled() {
        let out = insert_separators(vec![
            Segment::blank(),
            Segment::untagged("Intro."),
            Segment::blank(),
            Segment::blank(),
            Segment::tagged("source", "CRM"),
            Segment::blank(),
        ]);
        assert_eq!(tags(&out), vec!["text", "-", "source"]);
    }

    #[test]
    fn call_target_must_exist_in_operation() {
        let op = Operation::new("run").with_inputs(vec![Parameter::new("p", "Person")]);
        let err = Call::tagged(&[], "return", "result").within(&op).check_target().unwrap_err();
        assert_eq!(err, ParsingError::mismatch("run", "return"));
        assert!(Call::tagged(&[], "subreturn", "result.id").within(&op).check_target().is_err());

        let err = Call::tagged(&[], "param", "q").within(&op).check_target().unwrap_err();
        assert_eq!(err, ParsingError::mismatch("run", "q"));
        assert!(Call::tagged(&[], "subparam", "p.first").within(&op).check_target().is_ok());
        assert!(Call::tagged(&[], "throws", "IOException").within(&op).check_target().is_ok());
        assert!(Call::tagged(&[], "return", "result").check_target().is_ok());
    }

    #[test]
    fn call_skipped_when_tag_preserved() {
        let preserved = vec![Segment::tagged("throws", "IOException if the disk fails")];
        let call = Call {
            additional_tags: &preserved,
            ..Call::tagged(&[], "throws", "IOException")
        };
        assert!(call.covered_by_additional_tag());
        let other = Call {
            additional_tags: &preserved,
            ..Call::tagged(&[], "throws", "SQLException")
        };
        assert!(!other.covered_by_additional_tag());
    }
}
