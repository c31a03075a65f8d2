//! Parser for the reference grammar used by `{@link}`, `{@linkplain}`,
//! `{@value}` and `@see`:
//!
//! ```text
//! reference := [type_name] ["#" member ["(" [param ("," param)*] ")"]] [label]
//! type_name := identifier ("." identifier)*
//! ```

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::model::normalize_type_text;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("malformed reference `{raw}`: {reason}")]
    MalformedReference { raw: String, reason: String },
}

impl LinkError {
    pub fn malformed(raw: &str, reason: impl Into<String>) -> Self {
        LinkError::MalformedReference {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberPart {
    pub name: String,
    /// `None` when the link has no parentheses; `Some(vec![])` for `()`.
    pub parameters: Option<Vec<String>>,
}

impl fmt::Display for MemberPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(params) = &self.parameters {
            write!(f, "({})", params.join(", "))?;
        }
        Ok(())
    }
}

/// A parsed link expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReference {
    pub raw_text: String,
    pub type_part: Option<String>,
    pub member_part: Option<MemberPart>,
    /// Free text after the reference, e.g. `{@link Foo the foo}`.
    pub label: Option<String>,
}

/// Canonical text: `Type#member(p1, p2)` without the label.
impl fmt::Display for LinkReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ty) = &self.type_part {
            write!(f, "{}", ty)?;
        }
        if let Some(member) = &self.member_part {
            write!(f, "#{}", member)?;
        }
        Ok(())
    }
}

/// Parse a raw tag argument into a [`LinkReference`].
pub fn parse(raw: &str) -> Result<LinkReference, LinkError> {
    let mut p = Cursor::new(raw);
    p.skip_ws();

    let type_part = p.dotted_name()?;
    match p.peek() {
        Some(c) if type_part.is_some() && !c.is_whitespace() && c != '#' => {
            return Err(p.malformed(format!("unexpected `{}` after type name", c)));
        }
        Some(c) if type_part.is_none() && c != '#' => {
            return Err(p.malformed(format!("expected a type name or `#`, found `{}`", c)));
        }
        _ => {}
    }
    p.skip_ws();

    let member_part = if p.peek() == Some('#') {
        p.bump();
        p.skip_ws();
        let name = p
            .identifier()
            .ok_or_else(|| p.malformed("expected a member name after `#`"))?
            .to_string();
        p.skip_ws();
        let parameters = if p.peek() == Some('(') {
            p.bump();
            Some(p.parameters()?)
        } else {
            None
        };
        match p.peek() {
            Some(')') => return Err(p.malformed("unbalanced parentheses")),
            Some(c) if !c.is_whitespace() => {
                return Err(p.malformed(format!("unexpected `{}` after member", c)));
            }
            _ => {}
        }
        Some(MemberPart { name, parameters })
    } else {
        None
    };

    if type_part.is_none() && member_part.is_none() {
        return Err(p.malformed("empty reference"));
    }

    let label = Some(p.rest().trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    Ok(LinkReference {
        raw_text: raw.to_string(),
        type_part: type_part.map(str::to_string),
        member_part,
        label,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

struct Cursor<'a> {
    raw: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(raw: &'a str) -> Self {
        Self { raw, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.raw[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> LinkError {
        LinkError::malformed(self.raw, reason)
    }

    fn identifier(&mut self) -> Option<&'a str> {
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        self.bump();
        while self.peek().is_some_and(is_ident_part) {
            self.bump();
        }
        Some(&self.raw[start..self.pos])
    }

    fn dotted_name(&mut self) -> Result<Option<&'a str>, LinkError> {
        let start = self.pos;
        if self.identifier().is_none() {
            return Ok(None);
        }
        while self.peek() == Some('.') {
            self.bump();
            if self.identifier().is_none() {
                return Err(self.malformed("expected an identifier after `.`"));
            }
        }
        Ok(Some(&self.raw[start..self.pos]))
    }

    /// Parameter list after the opening parenthesis, through the closing one.
    fn parameters(&mut self) -> Result<Vec<String>, LinkError> {
        let mut params = Vec::new();
        let mut current = String::new();
        let mut parens = 0usize;
        let mut angles = 0usize;

        loop {
            let c = self
                .bump()
                .ok_or_else(|| self.malformed("unbalanced parentheses"))?;
            match c {
                ')' if parens == 0 => break,
                ')' => parens -= 1,
                '(' => parens += 1,
                '<' => angles += 1,
                '>' if angles > 0 => angles -= 1,
                ',' if parens == 0 && angles == 0 => {
                    params.push(Self::finish_param(self, &current)?);
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(c);
        }

        if current.trim().is_empty() && params.is_empty() {
            return Ok(params);
        }
        params.push(Self::finish_param(self, &current)?);
        Ok(params)
    }

    fn finish_param(&self, text: &str) -> Result<String, LinkError> {
        let param = normalize_type_text(text);
        if param.is_empty() {
            return Err(self.malformed("empty parameter type"));
        }
        Ok(param)
    }
}
