//! Rich decoder — reads the embedded tables back into entries.
//!
//! The markup events are folded with an explicit state value: which label
//! was seen last in the current row, the column, and the entry being built.

use super::markup::{tokenize, Event};
use super::{plain_body, Body, Decoded};
use crate::comment::Comment;
use crate::error::ParsingError;
use crate::escape::{decode_text, BREAK_PLACEHOLDER, TAB_PLACEHOLDER};
use crate::model::{Addressee, Documentation, ThematicRole};
use crate::registry::{find_addressee_by_name, find_role_by_name};
use crate::render::rich::{LABEL_ELEMENT, LABEL_ROLE};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    None,
    Element,
    Role,
    Addressee,
}

#[derive(Debug, Default)]
struct Fold {
    label: Option<Label>,
    column: usize,
    in_table: bool,
    addressee: Option<Addressee>,
    current: Documentation,
    batch: Vec<Documentation>,
}

#[derive(Debug, Clone, Default)]
pub struct RichDecoder {
    roles: Vec<ThematicRole>,
    addressees: Vec<Addressee>,
}

impl RichDecoder {
    pub fn new(roles: Vec<ThematicRole>, addressees: Vec<Addressee>) -> Self {
        RichDecoder { roles, addressees }
    }

    pub fn decode(&self, comment: &Comment) -> Result<Decoded, ParsingError> {
        let mut decoded = Decoded::default();
        for seg in comment.content() {
            match plain_body(seg) {
                Body::Markup(markup) => decoded
                    .documentations
                    .extend(self.decode_markup(markup)?),
                Body::Skip => {}
                Body::Preserve => {
                    debug!(tag = seg.tag.as_deref(), "preserving tag");
                    decoded.additional_tags.push(seg.clone());
                }
            }
        }
        Ok(decoded)
    }

    /// All tables in one piece of markup.
    pub fn decode_markup(&self, markup: &str) -> Result<Vec<Documentation>, ParsingError> {
        let events = tokenize(markup)?;
        let state = events
            .iter()
            .fold(Fold::default(), |state, event| self.step(state, event));

        let mut batch = state.batch;
        for doc in &mut batch {
            for text in doc.texts.values_mut() {
                *text = decode_text(text);
            }
            doc.target = doc.target.take().map(|t| decode_text(&t));
        }
        Ok(batch)
    }

    fn step(&self, mut s: Fold, event: &Event<'_>) -> Fold {
        match event {
            Event::Start(name) => match name.as_str() {
                "table" => {
                    s.in_table = true;
                    s.current = Documentation::default();
                    s.label = Some(Label::None);
                }
                "tr" => {
                    s.column = 0;
                    s.label = Some(Label::None);
                    s.addressee = None;
                }
                "td" => s.column += 1,
                "br" if self.collects(&s) => self.append(&mut s, BREAK_PLACEHOLDER),
                "tab" if self.collects(&s) => self.append(&mut s, TAB_PLACEHOLDER),
                _ => {}
            },
            Event::End(name) => match name.as_str() {
                "tr" => {
                    s.label = Some(Label::None);
                    s.addressee = None;
                }
                "table" if s.in_table => {
                    s.in_table = false;
                    s.label = None;
                    let doc = std::mem::take(&mut s.current);
                    s.batch.push(doc);
                }
                _ => {}
            },
            Event::Text(text) => {
                if s.in_table {
                    self.text(&mut s, text);
                }
            }
        }
        s
    }

    fn collects(&self, s: &Fold) -> bool {
        s.in_table && s.label == Some(Label::Addressee) && s.column == 2
    }

    fn append(&self, s: &mut Fold, text: &str) {
        if let Some(ref addressee) = s.addressee {
            s.current.append_text(addressee, text);
        }
    }

    fn text(&self, s: &mut Fold, text: &str) {
        match s.label.unwrap_or(Label::None) {
            Label::Element if s.column == 2 && !text.trim().is_empty() => {
                s.current.target = Some(text.trim().to_string());
                s.label = Some(Label::None);
            }
            Label::Role if s.column == 2 && !text.trim().is_empty() => {
                s.current.role = self.role(text.trim());
                s.label = Some(Label::None);
            }
            Label::Addressee if s.column == 2 => self.append(s, text),
            Label::None if s.column == 1 => {
                let value = text.trim();
                if value.is_empty() {
                    return;
                }
                if value == LABEL_ELEMENT {
                    s.label = Some(Label::Element);
                } else if value == LABEL_ROLE {
                    s.label = Some(Label::Role);
                } else {
                    let name = value.trim_end_matches(':').trim();
                    let addressee = self.addressee(name);
                    // Registered even if no text follows.
                    s.current.append_text(&addressee, "");
                    s.addressee = Some(addressee);
                    s.label = Some(Label::Addressee);
                }
            }
            _ => {}
        }
    }

    fn role(&self, name: &str) -> Option<ThematicRole> {
        let role = find_role_by_name(&self.roles, name).cloned();
        if role.is_none() {
            warn!(role = name, "unrecognized thematic role, entry kept without role");
        }
        role
    }

    fn addressee(&self, name: &str) -> Addressee {
        match find_addressee_by_name(&self.addressees, name) {
            Some(a) => a.clone(),
            None => {
                warn!(addressee = name, "unrecognized addressee");
                Addressee::new(name)
            }
        }
    }
}
