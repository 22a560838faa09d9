//! Markup tokenizer for the tables embedded in rich comments.
//!
//! Produces start, end and text events in document order and checks that
//! elements nest properly. Entities are left alone; text is raw.

use crate::error::ParsingError;
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<(/?)([A-Za-z][A-Za-z0-9]*)((?:\s+[^<>]*?)?)\s*(/?)>"#).unwrap()
});

/// Elements that never have content.
const VOID_ELEMENTS: &[&str] = &["br", "tab", "hr"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<'a> {
    Start(String),
    End(String),
    Text(&'a str),
}

pub fn tokenize(input: &str) -> Result<Vec<Event<'_>>, ParsingError> {
    let mut events = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let Some(lt) = rest.find('<') else {
            events.push(Event::Text(rest));
            break;
        };
        if lt > 0 {
            events.push(Event::Text(&rest[..lt]));
        }
        let offset = pos + lt;
        let caps = RE_TAG
            .captures(&input[offset..])
            .ok_or_else(|| ParsingError::markup(offset, "'<' does not start a tag"))?;

        let name = caps[2].to_ascii_lowercase();
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty() || VOID_ELEMENTS.contains(&name.as_str());

        if closing {
            if VOID_ELEMENTS.contains(&name.as_str()) {
                // `</br>` is tolerated and means nothing.
            } else if open.last() == Some(&name) {
                open.pop();
                events.push(Event::End(name));
            } else {
                let reason = match open.last() {
                    Some(expected) => format!("</{}> closes <{}>", name, expected),
                    None => format!("</{}> has no opening tag", name),
                };
                return Err(ParsingError::markup(offset, reason));
            }
        } else if self_closing {
            events.push(Event::Start(name.clone()));
            events.push(Event::End(name));
        } else {
            open.push(name.clone());
            events.push(Event::Start(name));
        }
        pos = offset + caps[0].len();
    }

    if let Some(unclosed) = open.last() {
        return Err(ParsingError::markup(input.len(), format!("<{}> is never closed", unclosed)));
    }
    Ok(events)
}
