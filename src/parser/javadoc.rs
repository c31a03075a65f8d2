use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DocComment, Documented};

/// `{@link ...}`, `{@linkplain ...}`, `{@value ...}`; the argument is optional.
static INLINE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{@(linkplain|link|value)(?:\s+([^}]*))?\s*\}").expect("inline tag pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Link,
    LinkPlain,
    Value,
    See,
}

impl TagKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKind::Link => "link",
            TagKind::LinkPlain => "linkplain",
            TagKind::Value => "value",
            TagKind::See => "see",
        }
    }

    fn from_inline(name: &str) -> Option<Self> {
        match name {
            "link" => Some(TagKind::Link),
            "linkplain" => Some(TagKind::LinkPlain),
            "value" => Some(TagKind::Value),
            _ => None,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One cross-reference tag found in a doc comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    pub kind: TagKind,
    pub argument: String,
    /// 1-based source line of the tag.
    pub line: usize,
}

impl DocTag {
    /// `@see "text"` and `@see <a href=...>` are not references.
    pub fn is_literal(&self) -> bool {
        self.kind == TagKind::See
            && (self.argument.starts_with('"') || self.argument.starts_with('<'))
    }
}

/// Extract every cross-reference tag from a doc comment, in source order.
pub fn scan_tags(comment: &DocComment) -> Vec<DocTag> {
    let mut tags: Vec<(usize, DocTag)> = Vec::new();

    for caps in INLINE_TAG.captures_iter(&comment.text) {
        let (Some(whole), Some(kind)) = (caps.get(0), TagKind::from_inline(&caps[1])) else {
            continue;
        };
        let mut argument = caps
            .get(2)
            .map(|m| join_continuation_lines(m.as_str()))
            .unwrap_or_default();

        // A bare `{@value}` on a constant refers to that constant.
        if argument.is_empty() && kind == TagKind::Value {
            if let Some(Documented::Field(name)) = &comment.documents {
                argument = format!("#{}", name);
            }
        }

        let line = comment.line + comment.text[..whole.start()].matches('\n').count();
        tags.push((whole.start(), DocTag { kind, argument, line }));
    }

    let lines: Vec<&str> = comment.text.split_inclusive('\n').collect();
    let mut offset = 0;
    for (index, raw_line) in lines.iter().enumerate() {
        if let Some(first) = see_argument(raw_line) {
            // The argument runs on until a blank line or the next block tag.
            let continuation = lines[index + 1..]
                .iter()
                .map(|l| strip_decoration(l))
                .take_while(|body| !body.is_empty() && !body.starts_with('@'));
            let argument = std::iter::once(first.as_str())
                .chain(continuation)
                .collect::<Vec<_>>()
                .join(" ");
            tags.push((
                offset,
                DocTag {
                    kind: TagKind::See,
                    argument,
                    line: comment.line + index,
                },
            ));
        }
        offset += raw_line.len();
    }

    tags.sort_by_key(|(offset, _)| *offset);
    tags.into_iter().map(|(_, tag)| tag).collect()
}

/// Comment body of one line: without `/**`, `*/` and the leading `*`.
fn strip_decoration(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("/**").unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line.trim_start();
    line.strip_prefix('*').unwrap_or(line).trim()
}

fn see_argument(raw_line: &str) -> Option<String> {
    let body = strip_decoration(raw_line);
    let rest = body.strip_prefix("@see")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let argument = rest.trim();
    if argument.is_empty() {
        None
    } else {
        Some(argument.to_string())
    }
}

fn join_continuation_lines(argument: &str) -> String {
    argument
        .lines()
        .map(strip_decoration)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
