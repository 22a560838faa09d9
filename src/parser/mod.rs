//! Decoders turning comment segments back into documentation entries.

pub mod attach;
pub mod compact;
pub mod legacy;
pub mod markup;
pub mod rich;

use crate::comment::Segment;
use crate::model::Documentation;
use crate::taglet::{classify, Block, TagKind, Taglet};
use serde::{Deserialize, Serialize};

/// Result of decoding one comment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decoded {
    pub documentations: Vec<Documentation>,
    /// Tags nothing in the model owns, kept verbatim.
    pub additional_tags: Vec<Segment>,
}

/// What the rich decoder does with one segment.
pub(crate) enum Body<'a> {
    Markup(&'a str),
    Skip,
    Preserve,
}

/// `@param`, `@throws` and their sub tags lead with an identifier; return
/// tags and untagged text are markup from the start.
pub(crate) fn plain_body(seg: &Segment) -> Body<'_> {
    let Some(ref tag) = seg.tag else {
        return Body::Markup(&seg.text);
    };
    match classify(tag) {
        TagKind::Grid => Body::Skip,
        TagKind::Structural(Block::Return) => Body::Markup(&seg.text),
        TagKind::Structural(_) => Body::Markup(seg.text_after_word()),
        TagKind::Continuation(Taglet::SubReturn) => Body::Markup(&seg.text),
        TagKind::Continuation(Taglet::SubParam | Taglet::SubThrows) => {
            Body::Markup(seg.text_after_word())
        }
        TagKind::Continuation(_) | TagKind::Other(_) => Body::Preserve,
    }
}
