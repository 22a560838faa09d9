//! Comment segments, the flat ordered form both codecs read and write.
//!
//! A segment is either untagged text (the leading sentence, or a blank
//! separator) or a `@tag` followed by its text.

use crate::taglet::THEMATIC_GRID;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static RE_TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][\w-]*)(?:\s+|$)(.*)$").unwrap());

static RE_TRAILING_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Segment {
    /// Tag name without the `@`.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl Segment {
    pub fn untagged(text: &str) -> Self {
        Segment {
            tag: None,
            text: text.to_string(),
        }
    }

    pub fn tagged(tag: &str, text: &str) -> Self {
        Segment {
            tag: Some(tag.to_string()),
            text: text.to_string(),
        }
    }

    pub fn blank() -> Self {
        Segment::default()
    }

    pub fn is_blank(&self) -> bool {
        self.tag.is_none() && self.text.trim().is_empty()
    }

    pub fn is_tag(&self, name: &str) -> bool {
        self.tag.as_deref() == Some(name)
    }

    /// First word of the text: the identifier of `@param` and `@throws`.
    pub fn leading_word(&self) -> Option<&str> {
        self.text.split_whitespace().next()
    }

    /// Text after the first word.
    pub fn text_after_word(&self) -> &str {
        let text = self.text.trim_start();
        match text.find(char::is_whitespace) {
            Some(pos) => text[pos..].trim_start(),
            None => "",
        }
    }

    pub fn render(&self) -> String {
        match self.tag {
            Some(ref tag) if self.text.trim().is_empty() => format!("@{}", tag),
            Some(ref tag) => format!("@{} {}", tag, self.text.trim()),
            None => self.text.trim().to_string(),
        }
    }
}

/// An ordered comment buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Comment {
    pub segments: Vec<Segment>,
}

impl Comment {
    pub fn new(segments: Vec<Segment>) -> Self {
        Comment { segments }
    }

    /// Split raw comment text into segments.
    ///
    /// Accepts `/** ... */` and `///` decoration. Lines before the first tag
    /// form the untagged leading segment; other untagged lines continue the
    /// segment above them.
    pub fn parse(text: &str) -> Self {
        let mut segments: Vec<Segment> = Vec::new();
        let mut after_blank = false;

        for raw in text.lines() {
            let line = strip_decoration(raw);
            if line.is_empty() {
                after_blank = true;
                continue;
            }

            if let Some(caps) = RE_TAG_LINE.captures(line) {
                segments.push(Segment::tagged(&caps[1], caps[2].trim()));
            } else if let Some(current) = segments.last_mut() {
                join_line(&mut current.text, line, after_blank);
            } else {
                segments.push(Segment::untagged(line));
            }
            after_blank = false;
        }

        Comment { segments }
    }

    /// One string per output line; blank segments become empty lines.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for seg in &self.segments {
            if seg.is_blank() {
                out.push(String::new());
                continue;
            }
            out.extend(seg.render().lines().map(|l| l.trim_end().to_string()));
        }
        out
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Render as a `/** ... */` block.
    pub fn render_block(&self) -> String {
        let mut out = String::from("/**\n");
        for line in self.lines() {
            if line.is_empty() {
                out.push_str(" *\n");
            } else {
                out.push_str(" * ");
                out.push_str(&line);
                out.push('\n');
            }
        }
        out.push_str(" */\n");
        out
    }

    /// Non-blank segments only.
    pub fn content(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|s| !s.is_blank())
    }

    pub fn grid_name(&self) -> Option<&str> {
        self.segments
            .iter()
            .find(|s| s.is_tag(THEMATIC_GRID))
            .map(|s| s.text.trim())
            .filter(|name| !name.is_empty())
    }
}

/// Classification name carried by the thematic grid marker, if any.
pub fn find_grid_name(comment: &Comment) -> Option<String> {
    comment.grid_name().map(str::to_string)
}

/// Remove `/**`, `*/`, a leading `*` and `///` or `//!`.
fn strip_decoration(line: &str) -> &str {
    let mut l = line.trim();
    if let Some(rest) = l.strip_prefix("/**") {
        l = rest;
    }
    if let Some(rest) = l.strip_suffix("*/") {
        l = rest;
    }
    l = l.trim();
    if let Some(rest) = l.strip_prefix("///").or_else(|| l.strip_prefix("//!")) {
        l = rest;
    } else if let Some(rest) = l.strip_prefix('*') {
        l = rest;
    }
    l.trim()
}

/// Wrapped lines join with a space, a line after a break marker joins
/// directly, and a paragraph break becomes a native newline.
fn join_line(text: &mut String, line: &str, after_blank: bool) {
    if text.is_empty() {
        text.push_str(line);
    } else if after_blank {
        text.push('\n');
        text.push_str(line);
    } else if RE_TRAILING_BREAK.is_match(text) {
        text.push_str(line);
    } else {
        text.push(' ');
        text.push_str(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_leading_sentence_and_tags() {
        let comment = Comment::parse(
            "/**\n * Checks x.\n *\n * @param p [OBJECT] the input\n *\n * @return\n */\n",
        );
        assert_eq!(
            comment.segments,
            vec![
                Segment::untagged("Checks x."),
                Segment::tagged("param", "p [OBJECT] the input"),
                Segment::tagged("return", ""),
            ]
        );
    }

    #[test]
    fn continuation_lines_join() {
        let comment = Comment::parse("@param p [OBJECT] first<br/>\nsecond\nwrapped");
        assert_eq!(comment.segments.len(), 1);
        assert_eq!(comment.segments[0].text, "p [OBJECT] first<br/>second wrapped");
    }

    #[test]
    fn triple_slash_decoration() {
        let comment = Comment::parse("/// Does things.\n/// @source CRM");
        assert_eq!(comment.segments[0], Segment::untagged("Does things."));
        assert_eq!(comment.segments[1], Segment::tagged("source", "CRM"));
    }

    #[test]
    fn render_block_marks_blank_lines() {
        let comment = Comment::new(vec![
            Segment::untagged("Intro."),
            Segment::blank(),
            Segment::tagged("return", ""),
        ]);
        assert_eq!(comment.render_block(), "/**\n * Intro.\n *\n * @return\n */\n");
    }

    #[test]
    fn grid_name_is_trimmed() {
        let comment = Comment::parse("Rule: x\n@thematicgrid  Checking Operations ");
        assert_eq!(find_grid_name(&comment).as_deref(), Some("Checking Operations"));
        assert_eq!(Comment::parse("text").grid_name(), None);
    }

    #[test]
    fn leading_word_and_rest() {
        let seg = Segment::tagged("param", "p  [OBJECT] text");
        assert_eq!(seg.leading_word(), Some("p"));
        assert_eq!(seg.text_after_word(), "[OBJECT] text");
        assert_eq!(Segment::tagged("param", "p").text_after_word(), "");
    }
}
