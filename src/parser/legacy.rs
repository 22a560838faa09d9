//! Conversion of ordinary, unstructured comments.

use crate::comment::Comment;
use crate::escape::decode_text;
use crate::model::{Documentation, Operation};
use crate::registry::Registry;
use crate::taglet::{PARAM, RETURN, THROWS};

/// Turn a plain comment into roleless entries for the primary addressee.
///
/// The leading text documents the element, `@param x` and `@throws x`
/// document the named parameter and `@return` the return value. When the
/// operation is known, targets are its parameters' identifier paths; without
/// it they are the bare identifiers (`return` for the return value). Other
/// tags are dropped.
pub fn convert_plain(
    comment: &Comment,
    registry: &dyn Registry,
    operation: Option<&Operation>,
) -> Vec<Documentation> {
    let primary = registry.primary_addressee();
    let mut docs = Vec::new();

    for seg in comment.content() {
        let (target, text) = match seg.tag.as_deref() {
            None => (None, seg.text.as_str()),
            Some(PARAM) => {
                let id = seg.leading_word().unwrap_or("");
                let path = operation.and_then(|op| op.find_input(id)).map(|p| p.path.as_str());
                (Some(path.unwrap_or(id)), seg.text_after_word())
            }
            Some(THROWS) => {
                let id = seg.leading_word().unwrap_or("");
                let path = operation.and_then(|op| op.find_error(id)).map(|p| p.path.as_str());
                (Some(path.unwrap_or(id)), seg.text_after_word())
            }
            Some(RETURN) => {
                let path = operation
                    .and_then(Operation::return_parameter)
                    .map(|p| p.path.as_str());
                (Some(path.unwrap_or(RETURN)), seg.text.as_str())
            }
            Some(_) => continue,
        };

        let text = decode_text(text);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let doc = Documentation::addressed(None, &primary, text);
        docs.push(match target {
            Some(t) => doc.with_target(t),
            None => doc,
        });
    }
    docs
}
