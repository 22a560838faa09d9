//! Rich encoder: every entry as an embedded table, any number of addressees.

use super::{insert_separators, Call, Encoder};
use crate::comment::{Comment, Segment};
use crate::error::ParsingError;
use crate::escape::{escape_cell, escape_html};
use crate::model::Documentation;
use crate::taglet::{RETURN, THROWS};

pub const TABLE_START: &str = r#"<table name="idocit" border="1" cellspacing="0">"#;
pub const TABLE_END: &str = "</table>";
pub const LABEL_ELEMENT: &str = "Element:";
pub const LABEL_ROLE: &str = "Role:";
const TABLE_SEPARATOR: &str = "\n<br />";

#[derive(Debug, Clone, Default)]
pub struct RichEncoder {
    segments: Vec<Segment>,
}

impl RichEncoder {
    pub fn new() -> Self {
        RichEncoder::default()
    }
}

/// One entry as a table; `None` when there is nothing to write.
pub fn table(doc: &Documentation) -> Option<String> {
    let written: Vec<_> = doc
        .addressees
        .iter()
        .filter(|a| !doc.text_for(&a.name).is_empty())
        .collect();
    if doc.role.is_none() && written.is_empty() {
        return None;
    }

    let mut out = String::from(TABLE_START);
    out.push('\n');
    if let Some(ref target) = doc.target {
        out.push_str(&row(LABEL_ELEMENT, &escape_html(target)));
    }
    if let Some(ref role) = doc.role {
        out.push_str(&row(LABEL_ROLE, &escape_html(&role.name)));
    }
    for addressee in written {
        out.push_str(&format!(
            "<tr><td><b>{}</b>:</td><td>{}</td></tr>\n",
            escape_html(&addressee.name),
            escape_cell(doc.text_for(&addressee.name))
        ));
    }
    out.push_str(TABLE_END);
    Some(out)
}

fn row(label: &str, value: &str) -> String {
    format!("<tr><td>{}</td><td>{}</td></tr>\n", label, value)
}

impl Encoder for RichEncoder {
    fn append(&mut self, call: &Call<'_>) -> Result<(), ParsingError> {
        call.check_target()?;
        if call.covered_by_additional_tag() {
            return Ok(());
        }
        let tables: Vec<String> = call.documentations.iter().filter_map(table).collect();
        let body = tables.join(TABLE_SEPARATOR);

        match call.tag {
            None if body.is_empty() => {}
            None => self.segments.push(Segment::untagged(&body)),
            Some(tag) => {
                let name = if tag == RETURN { "" } else { call.param_name.unwrap_or("") };
                let text = match (name.is_empty(), body.is_empty()) {
                    (_, true) => name.to_string(),
                    (true, false) => body,
                    (false, false) => format!("{}\n{}", name, body),
                };
                // Nested attributes travel in their root's tables.
                let structural = tag == RETURN || tag == THROWS || tag == crate::taglet::PARAM;
                if structural || !text.is_empty() {
                    self.segments.push(Segment::tagged(tag, &text));
                }
            }
        }
        Ok(())
    }

    fn append_tag(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    fn finish(&mut self) -> Comment {
        Comment::new(insert_separators(std::mem::take(&mut self.segments)))
    }

    fn flattens_attributes(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Addressee, ThematicRole};

    #[test]
    fn table_rows_in_order() {
        let mut doc = Documentation::addressed(
            Some(ThematicRole::new("OBJECT")),
            &Addressee::primary(),
            "a <list>\nof names",
        )
        .with_target("p:List");
        doc.set_text(&Addressee::new("Manager"), "names");
        doc.set_text(&Addressee::new("Architect"), "");

        assert_eq!(
            table(&doc).unwrap(),
            "<table name=\"idocit\" border=\"1\" cellspacing=\"0\">\n\
             <tr><td>Element:</td><td>p:List</td></tr>\n\
             <tr><td>Role:</td><td>OBJECT</td></tr>\n\
             <tr><td><b>Developer</b>:</td><td>a &lt;list&gt;<br/>of names</td></tr>\n\
             <tr><td><b>Manager</b>:</td><td>names</td></tr>\n\
             </table>"
        );
    }

    #[test]
    fn empty_entry_has_no_table() {
        assert!(table(&Documentation::new(None)).is_none());
    }

    #[test]
    fn entries_in_one_call_share_a_segment() {
        let dev = Addressee::primary();
        let docs = [
            Documentation::addressed(Some(ThematicRole::new("OBJECT")), &dev, "a"),
            Documentation::addressed(Some(ThematicRole::new("SOURCE")), &dev, "b"),
        ];
        let mut enc = RichEncoder::new();
        enc.append(&Call::tagged(&docs, "param", "p")).unwrap();
        let comment = enc.finish();
        assert_eq!(comment.segments.len(), 1);
        let text = &comment.segments[0].text;
        assert!(text.starts_with("p\n<table"));
        assert_eq!(text.matches(TABLE_START).count(), 2);
        assert!(text.contains("</table>\n<br /><table"));
    }

    #[test]
    fn undocumented_return_is_bare() {
        let mut enc = RichEncoder::new();
        enc.append(&Call::tagged(&[], "return", "result")).unwrap();
        assert_eq!(enc.finish().lines(), vec!["@return"]);
    }
}
