//! Distribute decoded entries onto an operation's tree, and back.

use super::Decoded;
use crate::error::ParsingError;
use crate::model::{Documentation, Operation};
use crate::path::{Delimiters, IdentifierPath};

/// Replace the entries of `op` and its parameters with `docs`.
///
/// Entries without a target stay on the operation; the others go to the
/// parameter whose identifier path matches. Every target is checked before
/// anything is changed.
pub fn attach(op: &mut Operation, docs: Vec<Documentation>) -> Result<(), ParsingError> {
    attach_with(op, docs, &Delimiters::default())
}

pub fn attach_with(
    op: &mut Operation,
    docs: Vec<Documentation>,
    delimiters: &Delimiters,
) -> Result<(), ParsingError> {
    let mut resolved = Vec::with_capacity(docs.len());
    for doc in docs {
        let path = match doc.target {
            Some(ref target) => {
                let path = IdentifierPath::parse(target, delimiters);
                if op.find_by_path(&path, delimiters).is_none() {
                    return Err(ParsingError::mismatch(op.identifier(), target));
                }
                Some(path)
            }
            None => None,
        };
        resolved.push((path, doc));
    }

    op.info.documentations.clear();
    for param in op.parameters_mut() {
        param.clear_documentations();
    }

    for (path, doc) in resolved {
        match path {
            None => op.info.documentations.push(doc),
            Some(path) => {
                if let Some(param) = op.find_by_path_mut(&path, delimiters) {
                    param.info.documentations.push(doc);
                }
            }
        }
    }
    Ok(())
}

/// Attach a whole decode result, including its preserved tags.
pub fn apply(op: &mut Operation, decoded: Decoded) -> Result<(), ParsingError> {
    attach(op, decoded.documentations)?;
    op.additional_tags = decoded.additional_tags;
    Ok(())
}

/// All entries of `op` in tree order: the operation's own, then inputs,
/// outputs and errors depth-first, each pointing at its parameter.
pub fn collect(op: &Operation) -> Vec<Documentation> {
    let mut docs = op.info.documentations.clone();
    for param in op.parameters() {
        param.visit(&mut |node, _| docs.extend(node.targeted_documentations()));
    }
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Addressee, Parameter, ThematicRole};

    fn op() -> Operation {
        Operation::new("save")
            .with_inputs(vec![Parameter::new("p", "Person")
                .with_attribute(Parameter::new("first", "String"))])
            .with_output(Parameter::new("id", "long"))
    }

    fn doc(role: &str, target: Option<&str>) -> Documentation {
        let d = Documentation::addressed(Some(ThematicRole::new(role)), &Addressee::primary(), role);
        match target {
            Some(t) => d.with_target(t),
            None => d,
        }
    }

    #[test]
    fn entries_land_on_their_targets() {
        let mut op = op();
        attach(
            &mut op,
            vec![
                doc("ACTION", None),
                doc("OBJECT", Some("p")),
                doc("COMPARISON", Some("p/first:String")),
                doc("REPORT", Some("id:long")),
            ],
        )
        .unwrap();
        assert_eq!(op.info.documentations.len(), 1);
        let p = op.find_input("p").unwrap();
        assert_eq!(p.info.documentations[0].role_name(), "OBJECT");
        assert_eq!(p.attributes[0].info.documentations[0].role_name(), "COMPARISON");
        assert_eq!(op.return_parameter().unwrap().info.documentations.len(), 1);
    }

    #[test]
    fn unknown_target_changes_nothing() {
        let mut op = op().documented(doc("ACTION", None));
        let err = attach(&mut op, vec![doc("OBJECT", Some("q"))]).unwrap_err();
        assert_eq!(err, ParsingError::mismatch("save", "q"));
        assert_eq!(op.info.documentations.len(), 1);
    }

    #[test]
    fn attach_replaces_previous_entries() {
        let mut op = op();
        attach(&mut op, vec![doc("OBJECT", Some("p"))]).unwrap();
        attach(&mut op, vec![doc("SOURCE", Some("p"))]).unwrap();
        let p = op.find_input("p").unwrap();
        assert_eq!(p.info.documentations.len(), 1);
        assert_eq!(p.info.documentations[0].role_name(), "SOURCE");
    }

    #[test]
    fn collect_in_tree_order() {
        let mut op = op();
        attach(
            &mut op,
            vec![
                doc("REPORT", Some("id")),
                doc("COMPARISON", Some("p/first")),
                doc("OBJECT", Some("p")),
                doc("ACTION", None),
            ],
        )
        .unwrap();
        let roles: Vec<_> = collect(&op).iter().map(|d| d.role_name().to_string()).collect();
        assert_eq!(roles, vec!["ACTION", "OBJECT", "COMPARISON", "REPORT"]);
    }
}
